use crate::error::{Result, TilecfgError};
use std::path::{Path, PathBuf};

/// Домашний каталог пользователя
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(TilecfgError::HomeNotFound)
}

/// Раскрыть `~` в начале пути относительно домашнего каталога
pub fn expand_home(path: &str, home: &Path) -> String {
    if path == "~" {
        return home.display().to_string();
    }

    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest).display().to_string(),
        None => path.to_string(),
    }
}
