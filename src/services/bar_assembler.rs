use crate::error::Result;
use crate::events::Action;
use crate::services::params::{expand_params, is_hex_color, ParamValue, Params};
use crate::tilecfg_error;
use crate::utils::Variables;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Параметры, которые рантайм трактует как цвета
const COLOR_PARAMS: &[&str] = &[
    "foreground",
    "background",
    "active",
    "inactive",
    "this_current_screen_border",
    "highlight_color",
];

/// Тип виджета панели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    CurrentLayout,
    CurrentLayoutIcon,
    Spacer,
    Sep,
    GroupBox,
    Prompt,
    WindowName,
    Systray,
    Clock,
    Battery,
    BatteryIcon,
    QuickExit,
    TextBox,
    Mpd2,
    Volume,
    Cpu,
    Memory,
    Net,
}

impl WidgetKind {
    /// Виджеты, отрисовывающие текст, получают widget_defaults (шрифт, размер, отступ)
    pub fn renders_text(&self) -> bool {
        !matches!(
            self,
            WidgetKind::Spacer
                | WidgetKind::Sep
                | WidgetKind::Systray
                | WidgetKind::CurrentLayoutIcon
                | WidgetKind::BatteryIcon
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MouseButton {
    Button1,
    Button2,
    Button3,
    Button4,
    Button5,
}

/// Описание виджета в конфигурации; действия мыши ещё в текстовой форме
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    pub kind: WidgetKind,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub mouse_callbacks: BTreeMap<MouseButton, String>,
}

impl WidgetSpec {
    #[cfg(test)]
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            params: Params::new(),
            mouse_callbacks: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    #[cfg(test)]
    pub fn on_click(mut self, button: MouseButton, action: &str) -> Self {
        self.mouse_callbacks.insert(button, action.to_string());
        self
    }
}

/// Собранный виджет
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub kind: WidgetKind,
    pub params: Params,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub mouse_callbacks: BTreeMap<MouseButton, Action>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarPosition {
    #[default]
    Top,
    Bottom,
}

/// Глобальный стиль панели
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarStyle {
    #[serde(default)]
    pub position: BarPosition,
    pub size: u32,
    pub background: String,
    /// [top, right, bottom, left]
    #[serde(default)]
    pub margin: [i32; 4],
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub widget_defaults: Params,
}

fn default_opacity() -> f64 {
    1.0
}

/// Дескриптор панели для рантайма
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub position: BarPosition,
    pub size: u32,
    pub background: String,
    pub margin: [i32; 4],
    pub opacity: f64,
    pub widgets: Vec<Widget>,
}

/// Чистая функция: стиль + список описаний виджетов -> панель
pub struct BarAssembler<'a> {
    style: &'a BarStyle,
    vars: &'a Variables,
}

impl<'a> BarAssembler<'a> {
    pub fn new(style: &'a BarStyle, vars: &'a Variables) -> Self {
        Self { style, vars }
    }

    pub fn assemble(&self, specs: &[WidgetSpec]) -> Result<Bar> {
        let background = self.vars.expand(&self.style.background);
        if !is_hex_color(&background) {
            return Err(tilecfg_error!(widget, "Неверный цвет фона панели '{}'", background));
        }
        if !(0.0..=1.0).contains(&self.style.opacity) {
            return Err(tilecfg_error!(
                widget,
                "Прозрачность панели должна быть в диапазоне 0..1, получено {}",
                self.style.opacity
            ));
        }

        let widgets = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| self.assemble_widget(index, spec))
            .collect::<Result<Vec<_>>>()?;

        Ok(Bar {
            position: self.style.position,
            size: self.style.size,
            background,
            margin: self.style.margin,
            opacity: self.style.opacity,
            widgets,
        })
    }

    fn assemble_widget(&self, index: usize, spec: &WidgetSpec) -> Result<Widget> {
        let mut params = expand_params(&spec.params, self.vars);

        if spec.kind.renders_text() {
            for (name, value) in expand_params(&self.style.widget_defaults, self.vars) {
                params.entry(name).or_insert(value);
            }
        }

        for name in COLOR_PARAMS {
            if let Some(value) = params.get(*name) {
                let valid = value.as_text().is_some_and(is_hex_color);
                if !valid {
                    return Err(tilecfg_error!(
                        widget,
                        "Виджет #{} ({:?}): параметр '{}' должен быть цветом, получено {}",
                        index + 1,
                        spec.kind,
                        name,
                        value
                    ));
                }
            }
        }

        let mouse_callbacks = spec
            .mouse_callbacks
            .iter()
            .map(|(button, action)| {
                self.vars
                    .expand(action)
                    .parse::<Action>()
                    .map(|action| (*button, action))
                    .map_err(|e| tilecfg_error!(widget, "Виджет #{} ({:?}): {}", index + 1, spec.kind, e))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Widget {
            kind: spec.kind,
            params,
            mouse_callbacks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> BarStyle {
        let mut widget_defaults = Params::new();
        widget_defaults.insert("font".into(), "{font}".into());
        widget_defaults.insert("fontsize".into(), 14i64.into());

        BarStyle {
            position: BarPosition::Top,
            size: 28,
            background: "{bar_color}".into(),
            margin: [8, 8, 4, 8],
            opacity: 0.95,
            widget_defaults,
        }
    }

    fn vars() -> Variables {
        let mut vars = Variables::new();
        vars.insert("bar_color", "#0A0D09");
        vars.insert("text_color", "#667855");
        vars.insert("font", "JetBrainsMono Nerd Font");
        vars.insert("icon.power", "P");
        vars
    }

    #[test]
    fn test_assemble_keeps_order_and_style() {
        let style = style();
        let vars = vars();
        let specs = vec![
            WidgetSpec::new(WidgetKind::CurrentLayoutIcon).param("scale", 0.7),
            WidgetSpec::new(WidgetKind::Spacer).param("length", 8i64),
            WidgetSpec::new(WidgetKind::Clock)
                .param("format", "%a %d %b %H:%M")
                .param("foreground", "{text_color}"),
        ];

        let bar = BarAssembler::new(&style, &vars).assemble(&specs).unwrap();

        assert_eq!(bar.size, 28);
        assert_eq!(bar.background, "#0A0D09");
        assert_eq!(bar.margin, [8, 8, 4, 8]);
        let kinds: Vec<WidgetKind> = bar.widgets.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WidgetKind::CurrentLayoutIcon, WidgetKind::Spacer, WidgetKind::Clock]);

        let clock = &bar.widgets[2];
        assert_eq!(clock.params["foreground"].as_text(), Some("#667855"));
        assert_eq!(clock.params["format"].as_text(), Some("%a %d %b %H:%M"));
        assert_eq!(clock.params["font"].as_text(), Some("JetBrainsMono Nerd Font"));
    }

    #[test]
    fn test_widget_defaults_do_not_override_and_skip_non_text() {
        let style = style();
        let vars = vars();
        let specs = vec![
            WidgetSpec::new(WidgetKind::GroupBox).param("fontsize", 20i64),
            WidgetSpec::new(WidgetKind::Spacer),
        ];

        let bar = BarAssembler::new(&style, &vars).assemble(&specs).unwrap();

        assert_eq!(bar.widgets[0].params["fontsize"], ParamValue::Int(20));
        assert!(bar.widgets[1].params.is_empty());
    }

    #[test]
    fn test_mouse_callbacks_are_forwarded_as_actions() {
        let style = style();
        let vars = vars();
        let specs = vec![WidgetSpec::new(WidgetKind::TextBox)
            .param("text", " {icon.power} ")
            .on_click(MouseButton::Button1, "spawn powermenu")];

        let bar = BarAssembler::new(&style, &vars).assemble(&specs).unwrap();

        assert_eq!(bar.widgets[0].params["text"].as_text(), Some(" P "));
        assert_eq!(
            bar.widgets[0].mouse_callbacks.get(&MouseButton::Button1),
            Some(&Action::spawn("powermenu"))
        );
    }

    #[test]
    fn test_invalid_color_and_action_rejected() {
        let style = style();
        let vars = vars();

        let bad_color = vec![WidgetSpec::new(WidgetKind::Clock).param("foreground", "red")];
        assert!(BarAssembler::new(&style, &vars).assemble(&bad_color).is_err());

        let bad_action = vec![WidgetSpec::new(WidgetKind::TextBox).on_click(MouseButton::Button1, "explode")];
        assert!(BarAssembler::new(&style, &vars).assemble(&bad_action).is_err());
    }

    #[test]
    fn test_assemble_is_pure() {
        let style = style();
        let vars = vars();
        let specs = vec![WidgetSpec::new(WidgetKind::Prompt)];

        let first = BarAssembler::new(&style, &vars).assemble(&specs).unwrap();
        let second = BarAssembler::new(&style, &vars).assemble(&specs).unwrap();
        assert_eq!(first, second);
    }
}
