use crate::debug_if_enabled;
use crate::events::WindowInfo;
use crate::matching::MatchPredicate;
use crate::utils::Variables;
use serde::{Deserialize, Serialize};

/// Рабочая группа (виртуальный рабочий стол)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default)]
    pub matches: Vec<MatchPredicate>,
    /// Скрытая группа: не получает привязок переключения
    #[serde(default)]
    pub scratchpad: bool,
}

impl Group {
    #[cfg(test)]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            layout: None,
            matches: Vec::new(),
            scratchpad: false,
        }
    }

    #[cfg(test)]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[cfg(test)]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    #[cfg(test)]
    pub fn with_match(mut self, predicate: MatchPredicate) -> Self {
        self.matches.push(predicate);
        self
    }

    #[cfg(test)]
    pub fn scratchpad(mut self) -> Self {
        self.scratchpad = true;
        self
    }

    /// Подпись для панели: label или имя
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn matches(&self, window: &WindowInfo) -> bool {
        self.matches.iter().any(|predicate| predicate.matches(window))
    }

    pub fn expand(&self, vars: &Variables) -> Result<Self, regex::Error> {
        let matches = self
            .matches
            .iter()
            .map(|predicate| predicate.expand(vars))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            label: self.label.as_deref().map(|label| vars.expand(label)),
            matches,
            ..self.clone()
        })
    }
}

/// Распределение новых окон по группам: первая подходящая группа в порядке объявления
pub struct GroupClassifier<'a> {
    groups: &'a [Group],
}

impl<'a> GroupClassifier<'a> {
    pub fn new(groups: &'a [Group]) -> Self {
        Self { groups }
    }

    pub fn classify(&self, window: &WindowInfo) -> Option<&'a Group> {
        let found = self.groups.iter().find(|group| group.matches(window));

        match found {
            Some(group) => debug_if_enabled!("Окно {} -> группа '{}'", window, group.name),
            None => debug_if_enabled!("Окно {} не подходит ни одной группе", window),
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Pattern;

    fn class(name: &str) -> MatchPredicate {
        MatchPredicate::class(Pattern::exact(name))
    }

    fn groups() -> Vec<Group> {
        vec![
            Group::new("1").with_match(class("alacritty")),
            Group::new("2").with_match(class("firefox")),
        ]
    }

    #[test]
    fn test_classify_by_class() {
        let groups = groups();
        let classifier = GroupClassifier::new(&groups);

        let firefox = WindowInfo::new("Firefox").with_class("firefox");
        assert_eq!(classifier.classify(&firefox).map(|g| g.name.as_str()), Some("2"));

        let unknown = WindowInfo::new("?").with_class("unknown");
        assert!(classifier.classify(&unknown).is_none());
    }

    #[test]
    fn test_first_declared_group_wins_on_overlap() {
        let groups = vec![
            Group::new("web").with_match(MatchPredicate::title(Pattern::parse("re:Firefox").unwrap())),
            Group::new("browser").with_match(class("firefox")),
        ];
        let window = WindowInfo::new("Mozilla Firefox").with_class("firefox");

        assert!(groups[0].matches(&window) && groups[1].matches(&window));
        assert_eq!(GroupClassifier::new(&groups).classify(&window).unwrap().name, "web");

        let reversed: Vec<Group> = groups.into_iter().rev().collect();
        assert_eq!(GroupClassifier::new(&reversed).classify(&window).unwrap().name, "browser");
    }

    #[test]
    fn test_any_predicate_of_group_matches() {
        let groups = vec![Group::new("dev")
            .with_match(class("code"))
            .with_match(class("jetbrains-idea"))];
        let classifier = GroupClassifier::new(&groups);

        let idea = WindowInfo::new("IDEA").with_class("jetbrains-idea");
        assert_eq!(classifier.classify(&idea).unwrap().name, "dev");
    }

    #[test]
    fn test_groups_without_matches_never_claim_windows() {
        let groups = vec![Group::new("8").with_layout("max"), Group::new("9")];
        let window = WindowInfo::new("anything").with_class("anything");

        assert!(GroupClassifier::new(&groups).classify(&window).is_none());
    }

    #[test]
    fn test_display_label_falls_back_to_name() {
        assert_eq!(Group::new("3").display_label(), "3");
        assert_eq!(Group::new("3").with_label("code").display_label(), "code");
    }
}
