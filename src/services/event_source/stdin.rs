use crate::error::Result;
use crate::events::HookEvent;
use crate::trace_if_enabled;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::r#trait::EventSourceTrait;

/// События в виде JSON, по одному объекту на строку
pub struct StdinEventSource;

impl StdinEventSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl EventSourceTrait for StdinEventSource {
    async fn run(self: Box<Self>, events: mpsc::Sender<HookEvent>) -> Result<()> {
        info!("Чтение событий из stdin");
        read_events(BufReader::new(tokio::io::stdin()), events).await
    }
}

/// Строки, которые не разбираются как событие, пропускаются с предупреждением
pub(super) async fn read_events<R>(reader: R, events: mpsc::Sender<HookEvent>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<HookEvent>(line) {
            Ok(event) => {
                trace_if_enabled!("stdin:{}: {}", line_number, event);
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("stdin:{}: не удалось разобрать событие: {}", line_number, e),
        }
    }

    info!("Поток событий закрыт после {} строк", line_number);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowInfo;

    #[tokio::test]
    async fn test_reads_events_and_skips_garbage() {
        let input = concat!(
            "{\"event\":\"startup_once\"}\n",
            "\n",
            "not json\n",
            "{\"event\":\"client_new\",\"window\":{\"title\":\"x\",\"wm_class\":[\"firefox\"]}}\n",
            "{\"event\":\"reload\"}\n",
        );
        let (tx, mut rx) = mpsc::channel(8);

        read_events(input.as_bytes(), tx).await.unwrap();

        assert_eq!(rx.recv().await, Some(HookEvent::StartupOnce));
        assert_eq!(
            rx.recv().await,
            Some(HookEvent::ClientNew {
                window: WindowInfo::new("x").with_class("firefox")
            })
        );
        assert_eq!(rx.recv().await, Some(HookEvent::Reload));
        assert_eq!(rx.recv().await, None);
    }
}
