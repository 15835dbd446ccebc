use crate::events::{Modifier, ModifierSet};
use crate::mappings::KeyNameToKeysym;
use crate::matching::MatchPredicate;
use crate::services::bar_assembler::{BarStyle, WidgetSpec};
use crate::services::group_classifier::Group;
use crate::services::layouts::{LayoutSpec, LayoutTheme};
use crate::services::mouse_bindings::MouseEntry;
use crate::services::params::is_hex_color;
use crate::utils::terminal::FALLBACK_TERMINAL;
use crate::utils::{guess_terminal, Variables};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");
pub const REDROSE_CONFIG_TOML: &str = include_str!("../config/redrose.toml");

/// Встроенный набор настроек, поверх которого накладывается файл пользователя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    Redrose,
}

impl Preset {
    pub fn source(&self) -> &'static str {
        match self {
            Preset::Default => DEFAULT_CONFIG_TOML,
            Preset::Redrose => REDROSE_CONFIG_TOML,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Default => write!(f, "default"),
            Preset::Redrose => write!(f, "redrose"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub appearance: AppearanceConfig,
    pub apps: AppsConfig,
    #[serde(default)]
    pub layout: LayoutTheme,
    #[serde(default)]
    pub autostart: AutostartConfig,
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
    #[serde(default)]
    pub group_bindings: GroupBindingsConfig,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub layouts: Vec<LayoutSpec>,
    #[serde(default)]
    pub floating: FloatingConfig,
    #[serde(default)]
    pub bar: Option<BarConfig>,
    #[serde(default)]
    pub mouse: Vec<MouseEntry>,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub input_rules: BTreeMap<String, InputRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppearanceConfig {
    pub bar_color: String,
    pub text_color: String,
    pub font: String,
    pub font_size: u32,
    #[serde(default)]
    pub icons: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppsConfig {
    /// Основной модификатор, на который ссылается `mod`
    pub modifier: Modifier,
    /// `auto` - определить терминал автоматически
    pub terminal: String,
    pub launcher: String,
    pub file_manager: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AutostartConfig {
    #[serde(default)]
    pub commands: Vec<String>,
    /// Каталоги, добавляемые в PATH дочерних процессов
    #[serde(default)]
    pub extra_path: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyEntry {
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub key: String,
    pub action: String,
    #[serde(default)]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupBindingsConfig {
    pub switch_modifiers: Vec<String>,
    pub move_modifiers: Vec<String>,
    #[serde(default)]
    pub switch_on_move: bool,
}

impl Default for GroupBindingsConfig {
    fn default() -> Self {
        Self {
            switch_modifiers: vec!["mod".to_string()],
            move_modifiers: vec!["mod".to_string(), "shift".to_string()],
            switch_on_move: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FloatingConfig {
    #[serde(default = "default_true")]
    pub include_defaults: bool,
    #[serde(default)]
    pub border_width: u32,
    #[serde(default)]
    pub fullscreen_border_width: u32,
    #[serde(default)]
    pub rules: Vec<MatchPredicate>,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            border_width: 0,
            fullscreen_border_width: 0,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BarConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub style: BarStyle,
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusActivation {
    Focus,
    #[default]
    Smart,
    Urgent,
    Never,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub follow_mouse_focus: bool,
    pub bring_front_click: bool,
    pub cursor_warp: bool,
    pub auto_fullscreen: bool,
    pub reconfigure_screens: bool,
    pub auto_minimize: bool,
    pub focus_on_window_activation: FocusActivation,
    pub wmname: Option<String>,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            follow_mouse_focus: true,
            bring_front_click: false,
            cursor_warp: false,
            auto_fullscreen: true,
            reconfigure_screens: true,
            auto_minimize: true,
            focus_on_window_activation: FocusActivation::Smart,
            wmname: None,
        }
    }
}

/// Настройки устройства ввода (Wayland)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InputRule {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_scroll: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P, preset: Preset) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::string(preset.source()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("TILECFG_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;
        Ok(config)
    }

    /// Конфигурация только из встроенного пресета
    #[cfg(test)]
    pub fn preset(preset: Preset) -> Result<Self> {
        Self::from_toml(preset, "")
    }

    /// Пресет + TOML строка (без файла и переменных окружения)
    #[cfg(test)]
    pub fn from_toml(preset: Preset, overrides: &str) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Toml::string(preset.source()))
            .merge(Toml::string(overrides))
            .extract()
            .with_context(|| format!("Не удалось разобрать пресет '{}'", preset))?;

        config.validate()?;
        Ok(config)
    }

    pub fn primary_modifier(&self) -> Modifier {
        self.apps.modifier
    }

    /// Терминал с учётом автоопределения (`auto`)
    pub fn resolved_terminal(&self) -> String {
        if self.apps.terminal == "auto" {
            guess_terminal().unwrap_or_else(|| FALLBACK_TERMINAL.to_string())
        } else {
            self.apps.terminal.clone()
        }
    }

    /// Переменные для подстановки `{name}` в команды, правила и виджеты
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();
        vars.insert("terminal", self.resolved_terminal());
        vars.insert("launcher", self.apps.launcher.as_str());
        vars.insert("file_manager", self.apps.file_manager.as_str());
        vars.insert("bar_color", self.appearance.bar_color.as_str());
        vars.insert("text_color", self.appearance.text_color.as_str());
        vars.insert("font", self.appearance.font.as_str());
        vars.insert("font_size", self.appearance.font_size.to_string());

        for (name, glyph) in &self.appearance.icons {
            vars.insert(format!("icon.{}", name), glyph.as_str());
        }

        vars
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Цвета оформления
        for (name, color) in [
            ("bar_color", &self.appearance.bar_color),
            ("text_color", &self.appearance.text_color),
        ] {
            if !is_hex_color(color) {
                anyhow::bail!("appearance.{} должен быть цветом #RRGGBB, получено '{}'", name, color);
            }
        }

        if self.apps.terminal.trim().is_empty() {
            anyhow::bail!("apps.terminal не может быть пустым (используйте \"auto\")");
        }

        let primary = self.primary_modifier();

        // Валидация привязок клавиш
        for (i, entry) in self.keys.iter().enumerate() {
            if entry.key.is_empty() {
                anyhow::bail!("Пустая клавиша в привязке #{}", i + 1);
            }
            if !KeyNameToKeysym::is_known(&entry.key) {
                anyhow::bail!("Неизвестная клавиша '{}' в привязке #{}", entry.key, i + 1);
            }
            ModifierSet::parse(&entry.modifiers, primary)
                .map_err(|e| anyhow::anyhow!("{} в привязке #{}", e, i + 1))?;
            if entry.action.trim().is_empty() {
                anyhow::bail!("Пустая команда в привязке #{}", i + 1);
            }
        }

        ModifierSet::parse(&self.group_bindings.switch_modifiers, primary)
            .map_err(|e| anyhow::anyhow!("group_bindings.switch_modifiers: {}", e))?;
        ModifierSet::parse(&self.group_bindings.move_modifiers, primary)
            .map_err(|e| anyhow::anyhow!("group_bindings.move_modifiers: {}", e))?;

        // Валидация макетов
        if self.layouts.is_empty() {
            anyhow::bail!("Нужен хотя бы один макет");
        }
        let layout_names: HashSet<&str> = self.layouts.iter().map(|l| l.effective_name()).collect();

        // Валидация групп: имена уникальны и стабильны, на них ссылаются привязки
        let mut group_names = HashSet::new();
        for (i, group) in self.groups.iter().enumerate() {
            if group.name.is_empty() {
                anyhow::bail!("Пустое имя группы #{}", i + 1);
            }
            if !group_names.insert(group.name.as_str()) {
                anyhow::bail!("Повторяющееся имя группы '{}'", group.name);
            }
            if !group.scratchpad && !KeyNameToKeysym::is_known(&group.name) {
                anyhow::bail!(
                    "Имя группы '{}' не является клавишей, привязка переключения невозможна",
                    group.name
                );
            }
            if let Some(layout) = &group.layout {
                if !layout_names.contains(layout.as_str()) {
                    anyhow::bail!("Группа '{}' ссылается на неизвестный макет '{}'", group.name, layout);
                }
            }
            for (j, predicate) in group.matches.iter().enumerate() {
                if predicate.is_empty() {
                    anyhow::bail!("Пустое правило #{} в группе '{}'", j + 1, group.name);
                }
            }
        }

        for (i, rule) in self.floating.rules.iter().enumerate() {
            if rule.is_empty() {
                anyhow::bail!("Пустое плавающее правило #{}", i + 1);
            }
        }

        if let Some(bar) = &self.bar {
            if bar.enabled && bar.style.size == 0 {
                anyhow::bail!("Высота панели должна быть больше 0");
            }
        }

        for selector in self.input_rules.keys() {
            match selector.strip_prefix("type:") {
                Some("keyboard" | "touchpad" | "pointer") => {}
                Some(other) => anyhow::bail!("Неизвестный тип устройства ввода '{}'", other),
                None if selector.is_empty() => anyhow::bail!("Пустой селектор устройства ввода"),
                None => {}
            }
        }

        Ok(())
    }
}
