use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilecfgError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Неверная привязка: {0}")]
    InvalidBinding(String),

    #[error("Неверное правило окна: {0}")]
    InvalidRule(String),

    #[error("Неверный виджет: {0}")]
    InvalidWidget(String),

    #[error("Неверный макет: {0}")]
    InvalidLayout(String),

    #[error("Домашний каталог не найден")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, TilecfgError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! tilecfg_error {
    (binding, $($arg:tt)*) => {
        $crate::error::TilecfgError::InvalidBinding(format!($($arg)*))
    };
    (rule, $($arg:tt)*) => {
        $crate::error::TilecfgError::InvalidRule(format!($($arg)*))
    };
    (widget, $($arg:tt)*) => {
        $crate::error::TilecfgError::InvalidWidget(format!($($arg)*))
    };
    (layout, $($arg:tt)*) => {
        $crate::error::TilecfgError::InvalidLayout(format!($($arg)*))
    };
}
