pub mod assembly;
pub mod bar_assembler;
pub mod event_source;
pub mod floating_rules;
pub mod group_classifier;
pub mod hooks;
pub mod key_bindings;
pub mod layouts;
pub mod mouse_bindings;
pub mod params;
pub mod session;
pub mod startup;

pub use event_source::create_event_source;
pub use hooks::{HookOutcome, HookRegistry};
pub use session::Session;
pub use startup::StartupSequencer;
