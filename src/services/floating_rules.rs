use crate::debug_if_enabled;
use crate::events::WindowInfo;
use crate::matching::{MatchPredicate, Pattern};
use once_cell::sync::Lazy;
use serde::Serialize;

/// Правила рантайма по умолчанию: проверяются первыми
static DEFAULT_FLOAT_RULES: Lazy<Vec<MatchPredicate>> = Lazy::new(|| {
    let mut rules: Vec<MatchPredicate> = ["utility", "notification", "toolbar", "splash", "dialog"]
        .into_iter()
        .map(|wm_type| MatchPredicate::wm_type(Pattern::exact(wm_type)))
        .collect();

    rules.extend(
        [
            "file_progress",
            "confirm",
            "dialog",
            "download",
            "error",
            "notification",
            "splash",
            "toolbar",
        ]
        .into_iter()
        .map(|class| MatchPredicate::class(Pattern::exact(class))),
    );

    rules.push(MatchPredicate::fixed_size());
    rules.push(MatchPredicate::fixed_ratio());
    rules
});

/// Упорядоченный набор правил плавающих окон
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FloatingRuleSet {
    rules: Vec<MatchPredicate>,
}

impl FloatingRuleSet {
    /// Только правила из конфигурации, без правил рантайма
    pub fn new(rules: Vec<MatchPredicate>) -> Self {
        Self { rules }
    }

    /// Правила рантайма по умолчанию, затем правила из конфигурации
    pub fn with_defaults(extra: Vec<MatchPredicate>) -> Self {
        let mut rules = Self::default_rules().to_vec();
        rules.extend(extra);
        Self { rules }
    }

    pub fn default_rules() -> &'static [MatchPredicate] {
        &DEFAULT_FLOAT_RULES
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[MatchPredicate] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Индекс первого совпавшего правила
    pub fn first_match(&self, window: &WindowInfo) -> Option<usize> {
        self.rules.iter().position(|rule| rule.matches(window))
    }

    pub fn should_float(&self, window: &WindowInfo) -> bool {
        match self.first_match(window) {
            Some(index) => {
                debug_if_enabled!("Окно {} плавающее (правило #{})", window, index + 1);
                true
            }
            None => false,
        }
    }
}
