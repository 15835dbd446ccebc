use crate::config::Config;
use crate::error::Result;
use crate::services::assembly::WmConfig;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info};

type Loader = Box<dyn Fn() -> anyhow::Result<Config> + Send + Sync>;

/// Текущая собранная конфигурация и способ получить её заново.
///
/// Перезагрузка заменяет `Arc` целиком; уже выданные копии остаются прежними.
pub struct Session {
    loader: Loader,
    current: RwLock<Arc<WmConfig>>,
    generation: AtomicU64,
}

impl Session {
    #[cfg(test)]
    pub fn new<F>(loader: F) -> Result<Self>
    where
        F: Fn() -> anyhow::Result<Config> + Send + Sync + 'static,
    {
        let initial = loader()?;
        Self::with_initial(&initial, loader)
    }

    /// Первая сборка из уже загруженной конфигурации, `loader` нужен для перезагрузок
    pub fn with_initial<F>(initial: &Config, loader: F) -> Result<Self>
    where
        F: Fn() -> anyhow::Result<Config> + Send + Sync + 'static,
    {
        let config = WmConfig::build(initial)?;

        Ok(Self {
            loader: Box::new(loader),
            current: RwLock::new(Arc::new(config)),
            generation: AtomicU64::new(1),
        })
    }

    pub fn current(&self) -> Arc<WmConfig> {
        self.current.read().clone()
    }

    /// Номер сборки, увеличивается при каждой успешной перезагрузке
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Перечитать и пересобрать конфигурацию; при ошибке остаётся прежняя
    pub fn reload(&self) -> Result<Arc<WmConfig>> {
        info!("Перезагрузка конфигурации...");

        let rebuilt = (self.loader)()
            .map_err(Into::into)
            .and_then(|config| WmConfig::build(&config));

        match rebuilt {
            Ok(config) => {
                let config = Arc::new(config);
                *self.current.write() = config.clone();
                let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                info!("Конфигурация перезагружена (сборка {})", generation);
                Ok(config)
            }
            Err(e) => {
                error!("Ошибка перезагрузки, остаётся прежняя конфигурация: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_reload_swaps_config() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let session = Session::new(move || {
            let terminal = if counter.fetch_add(1, Ordering::SeqCst) == 0 { "kitty" } else { "foot" };
            Config::from_toml(Preset::Default, &format!("[apps]\nterminal = \"{}\"\n", terminal))
        })
        .unwrap();

        let before = session.current();
        assert_eq!(before.terminal, "kitty");

        let after = session.reload().unwrap();
        assert_eq!(after.terminal, "foot");
        assert_eq!(session.current().terminal, "foot");
        assert_eq!(before.terminal, "kitty");
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_previous_config() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let session = Session::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Config::preset(Preset::Default)
            } else {
                Config::from_toml(Preset::Default, "[logging]\nlevel = \"loud\"\n")
            }
        })
        .unwrap();

        let before = session.current();
        assert!(session.reload().is_err());
        assert!(Arc::ptr_eq(&before, &session.current()));
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn test_build_failure_on_reload_is_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let session = Session::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Config::preset(Preset::Default)
            } else {
                Config::from_toml(
                    Preset::Default,
                    "[[keys]]\nmodifiers = [\"mod\"]\nkey = \"q\"\naction = \"explode\"\n",
                )
            }
        })
        .unwrap();

        assert!(session.reload().is_err());
        assert_eq!(session.current().keys.len(), 20 + 18);
    }
}
