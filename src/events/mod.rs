pub mod command;
pub mod keyboard;
pub mod window;

pub use command::Action;
pub use keyboard::{KeyBinding, Modifier, ModifierSet};
pub use window::WindowInfo;

use serde::{Deserialize, Serialize};
use std::fmt;

/// События жизненного цикла, которые рантайм передаёт в хуки.
/// Формат на проводе: один JSON объект на строку с полем `event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HookEvent {
    StartupOnce,
    ClientNew {
        window: WindowInfo,
    },
    ClientUrgentHintChanged {
        window: WindowInfo,
        #[serde(default)]
        on_current_group: bool,
    },
    Reload,
}

impl HookEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HookEvent::StartupOnce => "startup_once",
            HookEvent::ClientNew { .. } => "client_new",
            HookEvent::ClientUrgentHintChanged { .. } => "client_urgent_hint_changed",
            HookEvent::Reload => "reload",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookEvent::ClientNew { window } | HookEvent::ClientUrgentHintChanged { window, .. } => {
                write!(f, "{}: {}", self.name(), window)
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_event_wire_format() {
        let event: HookEvent = serde_json::from_str(
            r#"{"event":"client_new","window":{"title":"Firefox","wm_class":["Navigator","firefox"]}}"#,
        )
        .unwrap();

        match &event {
            HookEvent::ClientNew { window } => assert_eq!(window.wm_class[1], "firefox"),
            other => panic!("неожиданное событие: {:?}", other),
        }
        assert_eq!(event.to_string(), "client_new: \"Firefox\" (Navigator, firefox)");
    }

    #[test]
    fn test_urgent_event_defaults_to_other_group() {
        let event: HookEvent =
            serde_json::from_str(r#"{"event":"client_urgent_hint_changed","window":{}}"#).unwrap();

        assert_eq!(
            event,
            HookEvent::ClientUrgentHintChanged {
                window: WindowInfo::default(),
                on_current_group: false,
            }
        );
    }
}
