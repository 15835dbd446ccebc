use crate::error::Result;
use crate::events::{Action, Modifier, ModifierSet};
use crate::services::bar_assembler::MouseButton;
use crate::tilecfg_error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseGesture {
    Drag,
    Click,
}

/// Привязка мыши в конфигурации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseEntry {
    pub kind: MouseGesture,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub button: MouseButton,
    pub action: String,
    /// Начальная команда перетаскивания
    #[serde(default)]
    pub start: Option<String>,
}

/// Собранная привязка мыши
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MouseBinding {
    pub kind: MouseGesture,
    pub modifiers: ModifierSet,
    pub button: MouseButton,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Action>,
}

pub fn build_mouse_bindings(entries: &[MouseEntry], primary: Modifier) -> Result<Vec<MouseBinding>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let context = |e: String| tilecfg_error!(binding, "Привязка мыши #{}: {}", index + 1, e);

            if entry.kind == MouseGesture::Click && entry.start.is_some() {
                return Err(context("start допустим только для drag".to_string()));
            }

            Ok(MouseBinding {
                kind: entry.kind,
                modifiers: ModifierSet::parse(&entry.modifiers, primary).map_err(context)?,
                button: entry.button,
                action: entry.action.parse().map_err(context)?,
                start: entry
                    .start
                    .as_deref()
                    .map(str::parse::<Action>)
                    .transpose()
                    .map_err(context)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag() -> MouseEntry {
        MouseEntry {
            kind: MouseGesture::Drag,
            modifiers: vec!["mod".into()],
            button: MouseButton::Button1,
            action: "window.set_position_floating".into(),
            start: Some("window.get_position".into()),
        }
    }

    #[test]
    fn test_build_drag_binding() {
        let bindings = build_mouse_bindings(&[drag()], Modifier::Mod4).unwrap();

        assert_eq!(bindings[0].modifiers, ModifierSet::new().with(Modifier::Mod4));
        assert_eq!(bindings[0].action, Action::Window("set_position_floating".into()));
        assert_eq!(bindings[0].start, Some(Action::Window("get_position".into())));
    }

    #[test]
    fn test_click_with_start_rejected() {
        let mut click = drag();
        click.kind = MouseGesture::Click;
        assert!(build_mouse_bindings(&[click], Modifier::Mod4).is_err());
    }

    #[test]
    fn test_bad_modifier_rejected() {
        let mut entry = drag();
        entry.modifiers = vec!["hyper".into()];
        assert!(build_mouse_bindings(&[entry], Modifier::Mod4).is_err());
    }
}
