use crate::error::Result;
use crate::events::{HookEvent, WindowInfo};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::info;

use super::r#trait::EventSourceTrait;

/// Эмуляция рантайма: поочерёдно «открывает» типичные окна
pub struct DryRunEventSource {
    period: Duration,
}

impl DryRunEventSource {
    pub fn new() -> Self {
        Self {
            period: Duration::from_secs(3),
        }
    }

    fn fake_events() -> Vec<HookEvent> {
        vec![
            HookEvent::ClientNew {
                window: WindowInfo::new("Mozilla Firefox").with_class("Navigator").with_class("firefox"),
            },
            HookEvent::ClientNew {
                window: WindowInfo::new("Save As").with_class("firefox").with_type("dialog"),
            },
            HookEvent::ClientNew {
                window: WindowInfo::new("main.rs - Code").with_class("code"),
            },
            HookEvent::ClientUrgentHintChanged {
                window: WindowInfo::new("Discord").with_class("discord"),
                on_current_group: false,
            },
            HookEvent::ClientNew {
                window: WindowInfo::new("xeyes").with_class("xeyes").with_fixed_size(true),
            },
        ]
    }
}

#[async_trait::async_trait]
impl EventSourceTrait for DryRunEventSource {
    async fn run(self: Box<Self>, events: mpsc::Sender<HookEvent>) -> Result<()> {
        info!("Dry-run режим - события окон эмулируются");

        let fake_events = Self::fake_events();
        let mut index = 0;
        let mut interval = interval(self.period);

        loop {
            interval.tick().await;

            let event = fake_events[index].clone();
            info!("Dry-run: эмулируем событие {}", event);
            if events.send(event).await.is_err() {
                return Ok(());
            }

            index = (index + 1) % fake_events.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emits_until_receiver_dropped() {
        let source = Box::new(DryRunEventSource {
            period: Duration::from_millis(1),
        });
        let (tx, mut rx) = mpsc::channel(1);
        let handle = tokio::spawn(source.run(tx));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.name(), "client_new");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.name(), "client_new");

        drop(rx);
        assert!(handle.await.unwrap().is_ok());
    }
}
