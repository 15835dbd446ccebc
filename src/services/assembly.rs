use crate::config::{AutostartConfig, BehaviorConfig, Config, InputRule};
use crate::error::Result;
use crate::events::{KeyBinding, Modifier, ModifierSet, WindowInfo};
use crate::services::bar_assembler::{Bar, BarAssembler, BarPosition};
use crate::services::floating_rules::FloatingRuleSet;
use crate::services::group_classifier::{Group, GroupClassifier};
use crate::services::key_bindings::{effective_bindings, warn_shadowed, GroupKeyScheme, KeyBindingBuilder};
use crate::services::layouts::{Layout, LayoutAssembler};
use crate::services::mouse_bindings::{build_mouse_bindings, MouseBinding};
use crate::tilecfg_error;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Screen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Bar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingLayout {
    pub border_width: u32,
    pub fullscreen_border_width: u32,
    pub rules: FloatingRuleSet,
}

/// Собранная конфигурация оконного менеджера.
///
/// Строится целиком из `Config` и после этого не меняется:
/// перезагрузка создаёт новый экземпляр.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmConfig {
    pub modifier: Modifier,
    pub terminal: String,
    pub keys: Vec<KeyBinding>,
    pub groups: Vec<Group>,
    pub layouts: Vec<Layout>,
    pub floating: FloatingLayout,
    pub screens: Vec<Screen>,
    pub mouse: Vec<MouseBinding>,
    pub autostart: AutostartConfig,
    pub behavior: BehaviorConfig,
    pub input_rules: BTreeMap<String, InputRule>,
}

impl WmConfig {
    pub fn build(config: &Config) -> Result<Self> {
        let vars = config.variables();
        let primary = config.primary_modifier();

        let static_keys = config
            .keys
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let modifiers = ModifierSet::parse(&entry.modifiers, primary)
                    .map_err(|e| tilecfg_error!(binding, "Привязка #{}: {}", index + 1, e))?;
                let action = vars
                    .expand(&entry.action)
                    .parse()
                    .map_err(|e| tilecfg_error!(binding, "Привязка #{}: {}", index + 1, e))?;

                let binding = KeyBinding::new(modifiers, entry.key.as_str(), action);
                Ok(match &entry.desc {
                    Some(desc) => binding.with_desc(desc.as_str()),
                    None => binding,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let groups = config
            .groups
            .iter()
            .map(|group| {
                group
                    .expand(&vars)
                    .map_err(|e| tilecfg_error!(rule, "Группа '{}': {}", group.name, e))
            })
            .collect::<Result<Vec<_>>>()?;

        let scheme = GroupKeyScheme {
            switch_modifiers: ModifierSet::parse(&config.group_bindings.switch_modifiers, primary)
                .map_err(|e| tilecfg_error!(binding, "group_bindings: {}", e))?,
            move_modifiers: ModifierSet::parse(&config.group_bindings.move_modifiers, primary)
                .map_err(|e| tilecfg_error!(binding, "group_bindings: {}", e))?,
            switch_on_move: config.group_bindings.switch_on_move,
        };
        let keys = KeyBindingBuilder::new(static_keys, &scheme).build(&groups);
        warn_shadowed(&keys);

        let layouts = LayoutAssembler::new(&config.layout, &vars).assemble(&config.layouts)?;
        for group in &groups {
            if let Some(name) = &group.layout {
                if !layouts.iter().any(|layout| &layout.name == name) {
                    return Err(tilecfg_error!(
                        layout,
                        "Группа '{}' ссылается на неизвестный макет '{}'",
                        group.name,
                        name
                    ));
                }
            }
        }

        let extra_rules = config
            .floating
            .rules
            .iter()
            .map(|rule| rule.expand(&vars))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| tilecfg_error!(rule, "Плавающее правило: {}", e))?;
        let rules = if config.floating.include_defaults {
            FloatingRuleSet::with_defaults(extra_rules)
        } else {
            FloatingRuleSet::new(extra_rules)
        };

        let mut screen = Screen::default();
        if let Some(bar_config) = config.bar.as_ref().filter(|bar| bar.enabled) {
            let bar = BarAssembler::new(&bar_config.style, &vars).assemble(&bar_config.widgets)?;
            match bar.position {
                BarPosition::Top => screen.top = Some(bar),
                BarPosition::Bottom => screen.bottom = Some(bar),
            }
        }

        let autostart = AutostartConfig {
            commands: config.autostart.commands.iter().map(|c| vars.expand(c)).collect(),
            extra_path: config.autostart.extra_path.clone(),
        };

        let wm = Self {
            modifier: primary,
            terminal: vars.get("terminal").unwrap_or_default().to_string(),
            keys,
            groups,
            layouts,
            floating: FloatingLayout {
                border_width: config.floating.border_width,
                fullscreen_border_width: config.floating.fullscreen_border_width,
                rules,
            },
            screens: vec![screen],
            mouse: build_mouse_bindings(&config.mouse, primary)?,
            autostart,
            behavior: config.behavior.clone(),
            input_rules: config.input_rules.clone(),
        };

        info!(
            "Конфигурация собрана: {} привязок, {} групп, {} макетов, {} плавающих правил",
            wm.keys.len(),
            wm.groups.len(),
            wm.layouts.len(),
            wm.floating.rules.len()
        );
        Ok(wm)
    }

    /// Группа для нового окна
    pub fn classify(&self, window: &WindowInfo) -> Option<&Group> {
        GroupClassifier::new(&self.groups).classify(window)
    }

    pub fn should_float(&self, window: &WindowInfo) -> bool {
        self.floating.rules.should_float(window)
    }

    /// Привязки без затенённых дубликатов
    pub fn effective_keys(&self) -> Vec<&KeyBinding> {
        effective_bindings(&self.keys)
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.screens
            .iter()
            .flat_map(|screen| screen.top.iter().chain(screen.bottom.iter()))
    }
}
