use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Отложенная команда рантайма оконного менеджера.
///
/// Команды не интерпретируются здесь: они лишь разбираются из текстовой
/// формы конфигурации и передаются рантайму без изменений.
///
/// Текстовая форма:
/// - `spawn <cmd>` / `spawncmd`
/// - `layout.<op>` / `window.<op>`
/// - `window.togroup <group> [switch]`
/// - `group.<name>.toscreen`
/// - `next_layout`, `prev_layout`, `reload_config`, `restart`, `shutdown`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    Spawn(String),
    SpawnCmd,
    Layout(String),
    Window(String),
    ToScreen(String),
    ToGroup { group: String, switch_group: bool },
    NextLayout,
    PrevLayout,
    ReloadConfig,
    Restart,
    Shutdown,
}

impl Action {
    pub fn spawn(cmd: impl Into<String>) -> Self {
        Action::Spawn(cmd.into())
    }

    pub fn to_screen(group: impl Into<String>) -> Self {
        Action::ToScreen(group.into())
    }

    pub fn to_group(group: impl Into<String>, switch_group: bool) -> Self {
        Action::ToGroup {
            group: group.into(),
            switch_group,
        }
    }

    /// Группа, на которую ссылается команда
    pub fn target_group(&self) -> Option<&str> {
        match self {
            Action::ToScreen(group) | Action::ToGroup { group, .. } => Some(group),
            _ => None,
        }
    }
}

fn is_op_name(op: &str) -> bool {
    !op.is_empty() && op.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s {
            "spawncmd" => return Ok(Action::SpawnCmd),
            "next_layout" => return Ok(Action::NextLayout),
            "prev_layout" => return Ok(Action::PrevLayout),
            "reload_config" => return Ok(Action::ReloadConfig),
            "restart" => return Ok(Action::Restart),
            "shutdown" => return Ok(Action::Shutdown),
            _ => {}
        }

        if let Some(cmd) = s.strip_prefix("spawn ") {
            let cmd = cmd.trim();
            if cmd.is_empty() {
                return Err("Пустая команда spawn".to_string());
            }
            return Ok(Action::Spawn(cmd.to_string()));
        }

        if let Some(rest) = s.strip_prefix("window.togroup ") {
            let mut parts = rest.split_whitespace();
            let group = parts
                .next()
                .ok_or_else(|| "window.togroup без имени группы".to_string())?;
            let switch_group = match parts.next() {
                None => false,
                Some("switch") => true,
                Some(other) => return Err(format!("Неизвестный флаг window.togroup: '{}'", other)),
            };
            if parts.next().is_some() {
                return Err(format!("Лишние аргументы в '{}'", s));
            }
            return Ok(Action::to_group(group, switch_group));
        }

        if let Some(group) = s
            .strip_prefix("group.")
            .and_then(|rest| rest.strip_suffix(".toscreen"))
        {
            if group.is_empty() {
                return Err("group.<name>.toscreen без имени группы".to_string());
            }
            return Ok(Action::to_screen(group));
        }

        if let Some(op) = s.strip_prefix("layout.") {
            if is_op_name(op) {
                return Ok(Action::Layout(op.to_string()));
            }
        }

        if let Some(op) = s.strip_prefix("window.") {
            if is_op_name(op) {
                return Ok(Action::Window(op.to_string()));
            }
        }

        Err(format!("Неизвестная команда: '{}'", s))
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Spawn(cmd) => write!(f, "spawn {}", cmd),
            Action::SpawnCmd => write!(f, "spawncmd"),
            Action::Layout(op) => write!(f, "layout.{}", op),
            Action::Window(op) => write!(f, "window.{}", op),
            Action::ToScreen(group) => write!(f, "group.{}.toscreen", group),
            Action::ToGroup { group, switch_group } => {
                write!(f, "window.togroup {}", group)?;
                if *switch_group {
                    write!(f, " switch")?;
                }
                Ok(())
            }
            Action::NextLayout => write!(f, "next_layout"),
            Action::PrevLayout => write!(f, "prev_layout"),
            Action::ReloadConfig => write!(f, "reload_config"),
            Action::Restart => write!(f, "restart"),
            Action::Shutdown => write!(f, "shutdown"),
        }
    }
}
