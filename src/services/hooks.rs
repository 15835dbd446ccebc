use crate::config::FocusActivation;
use crate::events::{HookEvent, WindowInfo};
use crate::services::assembly::WmConfig;
use crate::services::startup::{StartupReport, StartupSequencer};
use crate::debug_if_enabled;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Решение по новому окну: куда перенести и делать ли плавающим
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Placement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub floating: bool,
}

/// Реакция на запрос внимания от окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Focus,
    MarkUrgent,
    Ignore,
}

impl FocusActivation {
    pub fn decide(&self, on_current_group: bool) -> Activation {
        match self {
            FocusActivation::Focus => Activation::Focus,
            FocusActivation::Smart if on_current_group => Activation::Focus,
            FocusActivation::Smart | FocusActivation::Urgent => Activation::MarkUrgent,
            FocusActivation::Never => Activation::Ignore,
        }
    }
}

/// Результат обработки одного события, печатается в `run` как JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HookOutcome {
    StartupOnce {
        fired: bool,
    },
    ClientNew {
        window: String,
        #[serde(flatten)]
        placement: Placement,
    },
    ClientUrgentHintChanged {
        window: String,
        activation: Activation,
    },
    Reload {
        ok: bool,
        generation: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

type StartupListener = Box<dyn Fn(&WmConfig) + Send + Sync>;
type ClientNewListener = Box<dyn Fn(&WmConfig, &WindowInfo, &mut Placement) + Send + Sync>;
type UrgentListener = Box<dyn Fn(&WmConfig, &WindowInfo, bool) -> Option<Activation> + Send + Sync>;

/// Явная регистрация обработчиков событий рантайма.
///
/// `startup_once` срабатывает не более одного раза за время жизни реестра,
/// в том числе после перезагрузок конфигурации.
#[derive(Default)]
pub struct HookRegistry {
    startup_fired: AtomicBool,
    startup: Vec<StartupListener>,
    client_new: Vec<ClientNewListener>,
    urgent: Vec<UrgentListener>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Стандартные обработчики: автозапуск, распределение по группам,
    /// плавающие правила и политика активации
    pub fn with_defaults(dry_run: bool) -> Self {
        let mut registry = Self::new();

        registry.on_startup_once(move |config| {
            if dry_run {
                for command in &config.autostart.commands {
                    info!("Dry-run: автозапуск пропущен: {}", command);
                }
                return;
            }
            match StartupSequencer::from_config(&config.autostart) {
                Ok(sequencer) => {
                    let StartupReport { outcomes } = sequencer.run();
                    debug_if_enabled!("Автозапуск: {:?}", outcomes);
                }
                Err(e) => error!("Автозапуск невозможен: {}", e),
            }
        });

        registry.on_client_new(|config, window, placement| {
            if let Some(group) = config.classify(window) {
                placement.group = Some(group.name.clone());
            }
        });

        registry.on_client_new(|config, window, placement| {
            if config.should_float(window) {
                placement.floating = true;
            }
        });

        registry.on_client_urgent_hint_changed(|config, _window, on_current_group| {
            Some(config.behavior.focus_on_window_activation.decide(on_current_group))
        });

        registry
    }

    pub fn on_startup_once<F>(&mut self, listener: F)
    where
        F: Fn(&WmConfig) + Send + Sync + 'static,
    {
        self.startup.push(Box::new(listener));
    }

    pub fn on_client_new<F>(&mut self, listener: F)
    where
        F: Fn(&WmConfig, &WindowInfo, &mut Placement) + Send + Sync + 'static,
    {
        self.client_new.push(Box::new(listener));
    }

    pub fn on_client_urgent_hint_changed<F>(&mut self, listener: F)
    where
        F: Fn(&WmConfig, &WindowInfo, bool) -> Option<Activation> + Send + Sync + 'static,
    {
        self.urgent.push(Box::new(listener));
    }

    /// Возвращает false, если событие уже срабатывало
    pub fn fire_startup_once(&self, config: &WmConfig) -> bool {
        if self.startup_fired.swap(true, Ordering::SeqCst) {
            warn!("startup_once уже срабатывал, повторный вызов пропущен");
            return false;
        }

        info!("startup_once: {} обработчиков", self.startup.len());
        for listener in &self.startup {
            listener(config);
        }
        true
    }

    /// Обработчики вызываются по порядку регистрации, каждый может уточнить решение
    pub fn client_new(&self, config: &WmConfig, window: &WindowInfo) -> Placement {
        let mut placement = Placement::default();
        for listener in &self.client_new {
            listener(config, window, &mut placement);
        }

        info!(
            "Новое окно {}: группа {:?}, плавающее: {}",
            window, placement.group, placement.floating
        );
        placement
    }

    /// Первое решение среди обработчиков; без решений окно игнорируется
    pub fn urgent_hint_changed(&self, config: &WmConfig, window: &WindowInfo, on_current_group: bool) -> Activation {
        let activation = self
            .urgent
            .iter()
            .find_map(|listener| listener(config, window, on_current_group))
            .unwrap_or(Activation::Ignore);

        debug_if_enabled!("Запрос внимания от {}: {:?}", window, activation);
        activation
    }

    /// `reload` обрабатывает сессия, сюда он не доходит
    pub fn dispatch(&self, config: &WmConfig, event: &HookEvent) -> Option<HookOutcome> {
        match event {
            HookEvent::StartupOnce => Some(HookOutcome::StartupOnce {
                fired: self.fire_startup_once(config),
            }),
            HookEvent::ClientNew { window } => Some(HookOutcome::ClientNew {
                window: window.to_string(),
                placement: self.client_new(config, window),
            }),
            HookEvent::ClientUrgentHintChanged {
                window,
                on_current_group,
            } => Some(HookOutcome::ClientUrgentHintChanged {
                window: window.to_string(),
                activation: self.urgent_hint_changed(config, window, *on_current_group),
            }),
            HookEvent::Reload => None,
        }
    }
}
