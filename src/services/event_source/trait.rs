use crate::error::Result;
use crate::events::HookEvent;
use tokio::sync::mpsc;

/// Источник событий рантайма
#[async_trait::async_trait]
pub trait EventSourceTrait {
    /// Передавать события в канал до исчерпания источника или закрытия канала
    async fn run(self: Box<Self>, events: mpsc::Sender<HookEvent>) -> Result<()>;
}

/// Выбор источника по флагу dry_run
pub fn create_event_source(dry_run: bool) -> Box<dyn EventSourceTrait + Send> {
    if dry_run {
        Box::new(super::dry_run::DryRunEventSource::new())
    } else {
        Box::new(super::stdin::StdinEventSource::new())
    }
}
