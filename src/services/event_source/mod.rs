//! Источники событий для цикла `run`.
//!
//! Источник только читает или эмулирует события рантайма и передаёт их
//! в канал. Решения по событиям принимает HookRegistry.

mod dry_run;
mod stdin;
mod r#trait;

pub use self::r#trait::create_event_source;
