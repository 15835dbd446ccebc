use serde::{Deserialize, Serialize};
use std::fmt;

/// Информация о новом окне, которую рантайм передаёт в хуки
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowInfo {
    pub title: String,
    /// WM_CLASS: обычно [instance, class]
    pub wm_class: Vec<String>,
    pub wm_type: Option<String>,
    pub transient_for: Option<u32>,
    pub fixed_size: bool,
    pub fixed_ratio: bool,
    pub pid: Option<u32>,
}

impl WindowInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.wm_class.push(class.into());
        self
    }

    pub fn with_type(mut self, wm_type: impl Into<String>) -> Self {
        self.wm_type = Some(wm_type.into());
        self
    }

    pub fn with_transient_for(mut self, parent: u32) -> Self {
        self.transient_for = Some(parent);
        self
    }

    pub fn with_fixed_size(mut self, fixed: bool) -> Self {
        self.fixed_size = fixed;
        self
    }

    pub fn with_fixed_ratio(mut self, fixed: bool) -> Self {
        self.fixed_ratio = fixed;
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn is_transient(&self) -> bool {
        self.transient_for.is_some()
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wm_class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.wm_class.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_info_creation() {
        let window = WindowInfo::new("Mozilla Firefox")
            .with_class("Navigator")
            .with_class("firefox")
            .with_type("normal")
            .with_pid(1234);

        assert_eq!(window.title, "Mozilla Firefox");
        assert_eq!(window.wm_class, vec!["Navigator", "firefox"]);
        assert_eq!(window.wm_type.as_deref(), Some("normal"));
        assert_eq!(window.pid, Some(1234));
        assert!(!window.is_transient());
        assert_eq!(window.to_string(), "\"Mozilla Firefox\" (Navigator, firefox)");
    }

    #[test]
    fn test_window_info_from_partial_json() {
        let window: WindowInfo =
            serde_json::from_str(r#"{"wm_class":["ark","ark"],"transient_for":42}"#).unwrap();

        assert_eq!(window.title, "");
        assert_eq!(window.wm_class.len(), 2);
        assert!(window.is_transient());
        assert!(!window.fixed_size);
    }
}
