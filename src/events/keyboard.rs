use super::command::Action;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Модификатор клавиатуры X11
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Shift,
    Lock,
    Control,
    Mod1,
    Mod2,
    Mod3,
    Mod4,
    Mod5,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Shift => "shift",
            Modifier::Lock => "lock",
            Modifier::Control => "control",
            Modifier::Mod1 => "mod1",
            Modifier::Mod2 => "mod2",
            Modifier::Mod3 => "mod3",
            Modifier::Mod4 => "mod4",
            Modifier::Mod5 => "mod5",
        }
    }

    /// Разобрать имя модификатора без псевдонима `mod`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "shift" => Some(Modifier::Shift),
            "lock" => Some(Modifier::Lock),
            "control" | "ctrl" => Some(Modifier::Control),
            "mod1" | "alt" => Some(Modifier::Mod1),
            "mod2" => Some(Modifier::Mod2),
            "mod3" => Some(Modifier::Mod3),
            "mod4" | "super" => Some(Modifier::Mod4),
            "mod5" => Some(Modifier::Mod5),
            _ => None,
        }
    }

    /// Разобрать имя модификатора; `mod` означает основной модификатор из конфигурации
    pub fn resolve(name: &str, primary: Modifier) -> Option<Self> {
        if name.eq_ignore_ascii_case("mod") {
            Some(primary)
        } else {
            Self::from_name(name)
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Упорядоченное множество модификаторов без повторов
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ModifierSet(SmallVec<[Modifier; 4]>);

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with(mut self, modifier: Modifier) -> Self {
        self.insert(modifier);
        self
    }

    pub fn insert(&mut self, modifier: Modifier) {
        if let Err(pos) = self.0.binary_search(&modifier) {
            self.0.insert(pos, modifier);
        }
    }

    /// Построить множество из имён конфигурации
    pub fn parse(names: &[String], primary: Modifier) -> Result<Self, String> {
        let mut set = Self::new();
        for name in names {
            let modifier = Modifier::resolve(name, primary)
                .ok_or_else(|| format!("Неизвестный модификатор '{}'", name))?;
            set.insert(modifier);
        }
        Ok(set)
    }

    #[cfg(test)]
    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.binary_search(&modifier).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().map(|m| m.as_str().to_string()).collect()
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = Self::new();
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.to_vec();
        if modifiers.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", modifiers.join("+"))
        }
    }
}

/// Привязка клавиши: модификаторы + клавиша -> отложенная команда
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyBinding {
    pub modifiers: ModifierSet,
    pub key: String,
    pub action: Action,
    pub desc: String,
}

impl KeyBinding {
    pub fn new(modifiers: ModifierSet, key: impl Into<String>, action: Action) -> Self {
        Self {
            modifiers,
            key: key.into(),
            action,
            desc: String::new(),
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Уникальный идентификатор комбинации клавиш
    /// Имя клавиши приводится к нижнему регистру, как при сопоставлении keysym
    pub fn combination_id(&self) -> String {
        let key = self.key.to_lowercase();
        if self.modifiers.is_empty() {
            key
        } else {
            format!("{}+{}", self.modifiers, key)
        }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.combination_id(), self.action)?;
        if !self.desc.is_empty() {
            write!(f, " ({})", self.desc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_aliases() {
        assert_eq!(Modifier::resolve("mod", Modifier::Mod4), Some(Modifier::Mod4));
        assert_eq!(Modifier::resolve("MOD", Modifier::Mod1), Some(Modifier::Mod1));
        assert_eq!(Modifier::from_name("ctrl"), Some(Modifier::Control));
        assert_eq!(Modifier::from_name("alt"), Some(Modifier::Mod1));
        assert_eq!(Modifier::from_name("super"), Some(Modifier::Mod4));
        assert_eq!(Modifier::from_name("hyper"), None);
    }

    #[test]
    fn test_modifier_set_is_ordered_and_deduplicated() {
        let names = vec!["shift".to_string(), "mod".to_string(), "mod4".to_string()];
        let set = ModifierSet::parse(&names, Modifier::Mod4).unwrap();

        assert_eq!(set.to_vec(), vec!["shift", "mod4"]);
        assert!(set.contains(Modifier::Shift));
        assert!(!set.contains(Modifier::Control));

        let same: ModifierSet = [Modifier::Mod4, Modifier::Shift].into_iter().collect();
        assert_eq!(set, same);
    }

    #[test]
    fn test_modifier_set_rejects_unknown() {
        let names = vec!["hyper".to_string()];
        assert!(ModifierSet::parse(&names, Modifier::Mod4).is_err());
    }

    #[test]
    fn test_key_binding_combination_id() {
        let plain = KeyBinding::new(ModifierSet::new(), "XF86AudioMute", Action::Shutdown);
        let with_mods = KeyBinding::new(
            ModifierSet::new().with(Modifier::Mod4).with(Modifier::Shift),
            "H",
            Action::Shutdown,
        );

        assert_eq!(plain.combination_id(), "xf86audiomute");
        assert_eq!(with_mods.combination_id(), "shift+mod4+h");
    }
}
