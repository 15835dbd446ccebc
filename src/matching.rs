//! Предикаты сопоставления окон для групп и плавающих правил.
//!
//! Предикат задаёт до одного критерия каждого вида (класс, заголовок, тип окна,
//! transient, фиксированный размер/пропорции). Окно удовлетворяет предикату,
//! если выполнены ВСЕ указанные критерии; пустой предикат не совпадает ни с чем.

use crate::events::WindowInfo;
use crate::utils::Variables;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const REGEX_PREFIX: &str = "re:";

/// Образец значения: точная строка или регулярное выражение (`re:` префикс)
#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Regex(Regex),
}

impl Pattern {
    /// Текстовая форма из конфигурации: `re:` включает регулярное выражение
    pub fn parse(source: &str) -> Result<Self, regex::Error> {
        match source.strip_prefix(REGEX_PREFIX) {
            Some(expr) => Ok(Pattern::Regex(Regex::new(expr)?)),
            None => Ok(Pattern::Exact(source.to_string())),
        }
    }

    /// Точное сравнение без разбора префикса
    pub fn exact(value: impl Into<String>) -> Self {
        Pattern::Exact(value.into())
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(expected) => expected == value,
            Pattern::Regex(re) => re.is_match(value),
        }
    }

    /// Текстовая форма, из которой образец был разобран
    pub fn source(&self) -> String {
        match self {
            Pattern::Exact(value) => value.clone(),
            Pattern::Regex(re) => format!("{}{}", REGEX_PREFIX, re.as_str()),
        }
    }

    /// Подставить переменные конфигурации, вид образца сохраняется
    pub fn expand(&self, vars: &Variables) -> Result<Self, regex::Error> {
        match self {
            Pattern::Exact(value) => Ok(Pattern::Exact(vars.expand(value))),
            Pattern::Regex(re) => Ok(Pattern::Regex(Regex::new(&vars.expand(re.as_str()))?)),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pattern::Exact(a), Pattern::Exact(b)) => a == b,
            (Pattern::Regex(a), Pattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::parse(&source).map_err(serde::de::Error::custom)
    }
}

/// Набор образцов: значение совпадает, если совпал любой из них.
/// В конфигурации задаётся строкой или списком строк.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSet(Vec<Pattern>);

impl PatternSet {
    #[cfg(test)]
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self(patterns)
    }

    pub fn one(pattern: Pattern) -> Self {
        Self(vec![pattern])
    }

    pub fn matches_any(&self, value: &str) -> bool {
        self.0.iter().any(|pattern| pattern.matches(value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn expand(&self, vars: &Variables) -> Result<Self, regex::Error> {
        self.0
            .iter()
            .map(|pattern| pattern.expand(vars))
            .collect::<Result<Vec<_>, _>>()
            .map(PatternSet)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Pattern),
    Many(Vec<Pattern>),
}

impl<'de> Deserialize<'de> for PatternSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(pattern) => PatternSet(vec![pattern]),
            OneOrMany::Many(patterns) => PatternSet(patterns),
        })
    }
}

impl Serialize for PatternSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }
}

/// Предикат окна: конъюнкция заданных критериев.
///
/// В конфигурации: `{ wm_class = "firefox", title = "re:^Library" }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchPredicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wm_class: Option<PatternSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<PatternSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wm_type: Option<PatternSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_size: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_ratio: Option<bool>,
}

impl MatchPredicate {
    pub fn class(pattern: Pattern) -> Self {
        Self {
            wm_class: Some(PatternSet::one(pattern)),
            ..Self::default()
        }
    }

    pub fn wm_type(pattern: Pattern) -> Self {
        Self {
            wm_type: Some(PatternSet::one(pattern)),
            ..Self::default()
        }
    }

    pub fn fixed_size() -> Self {
        Self {
            fixed_size: Some(true),
            ..Self::default()
        }
    }

    pub fn fixed_ratio() -> Self {
        Self {
            fixed_ratio: Some(true),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn title(pattern: Pattern) -> Self {
        Self::default().with_title(pattern)
    }

    #[cfg(test)]
    pub fn with_title(mut self, pattern: Pattern) -> Self {
        self.title = Some(PatternSet::one(pattern));
        self
    }

    fn pattern_sets(&self) -> impl Iterator<Item = &PatternSet> {
        [&self.wm_class, &self.title, &self.wm_type].into_iter().flatten()
    }

    /// Предикат без критериев или с пустым набором образцов ничего не проверяет
    pub fn is_empty(&self) -> bool {
        let no_flags = self.transient.is_none() && self.fixed_size.is_none() && self.fixed_ratio.is_none();
        (no_flags && self.pattern_sets().next().is_none()) || self.pattern_sets().any(PatternSet::is_empty)
    }

    pub fn matches(&self, window: &WindowInfo) -> bool {
        if self.is_empty() {
            return false;
        }

        let class_ok = self
            .wm_class
            .as_ref()
            .map_or(true, |set| window.wm_class.iter().any(|class| set.matches_any(class)));
        let title_ok = self.title.as_ref().map_or(true, |set| set.matches_any(&window.title));
        let type_ok = self.wm_type.as_ref().map_or(true, |set| {
            window.wm_type.as_deref().is_some_and(|wm_type| set.matches_any(wm_type))
        });
        let transient_ok = self.transient.map_or(true, |flag| window.is_transient() == flag);
        let size_ok = self.fixed_size.map_or(true, |flag| window.fixed_size == flag);
        let ratio_ok = self.fixed_ratio.map_or(true, |flag| window.fixed_ratio == flag);

        class_ok && title_ok && type_ok && transient_ok && size_ok && ratio_ok
    }

    pub fn expand(&self, vars: &Variables) -> Result<Self, regex::Error> {
        let expand = |set: &Option<PatternSet>| set.as_ref().map(|set| set.expand(vars)).transpose();

        Ok(Self {
            wm_class: expand(&self.wm_class)?,
            title: expand(&self.title)?,
            wm_type: expand(&self.wm_type)?,
            ..self.clone()
        })
    }
}
