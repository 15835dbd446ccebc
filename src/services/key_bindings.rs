use crate::events::{Action, KeyBinding, ModifierSet};
use crate::services::group_classifier::Group;
use std::collections::HashMap;
use tracing::{info, warn};

/// Схема привязок для групп: переключение и перенос окна
#[derive(Debug, Clone, PartialEq)]
pub struct GroupKeyScheme {
    pub switch_modifiers: ModifierSet,
    pub move_modifiers: ModifierSet,
    /// Переходить ли на группу вслед за перенесённым окном
    pub switch_on_move: bool,
}

/// Сборщик полного списка привязок: статическая таблица + по две привязки на группу
pub struct KeyBindingBuilder<'a> {
    static_keys: Vec<KeyBinding>,
    scheme: &'a GroupKeyScheme,
}

impl<'a> KeyBindingBuilder<'a> {
    pub fn new(static_keys: Vec<KeyBinding>, scheme: &'a GroupKeyScheme) -> Self {
        Self { static_keys, scheme }
    }

    pub fn build(self, groups: &[Group]) -> Vec<KeyBinding> {
        let dynamic = group_bindings(self.scheme, groups);
        info!(
            "Привязки клавиш: {} статических + {} для групп",
            self.static_keys.len(),
            dynamic.len()
        );

        let mut keys = self.static_keys;
        keys.extend(dynamic);
        keys
    }
}

/// Привязки для групп в порядке их объявления; scratchpad группы пропускаются
pub fn group_bindings(scheme: &GroupKeyScheme, groups: &[Group]) -> Vec<KeyBinding> {
    groups
        .iter()
        .filter(|group| !group.scratchpad)
        .flat_map(|group| {
            [
                KeyBinding::new(
                    scheme.switch_modifiers.clone(),
                    group.name.clone(),
                    Action::to_screen(group.name.clone()),
                )
                .with_desc(format!("Switch to group {}", group.name)),
                KeyBinding::new(
                    scheme.move_modifiers.clone(),
                    group.name.clone(),
                    Action::to_group(group.name.clone(), scheme.switch_on_move),
                )
                .with_desc(format!("Move focused window to group {}", group.name)),
            ]
        })
        .collect()
}

/// Пара затенённых привязок: (индекс затенённой, индекс затеняющей)
pub type Shadowing = (usize, usize);

/// Найти привязки с одинаковой комбинацией; более поздняя затеняет более раннюю
pub fn find_shadowed(keys: &[KeyBinding]) -> Vec<Shadowing> {
    let mut last_seen: HashMap<String, usize> = HashMap::new();
    let mut shadowed = Vec::new();

    for (index, binding) in keys.iter().enumerate() {
        if let Some(previous) = last_seen.insert(binding.combination_id(), index) {
            shadowed.push((previous, index));
        }
    }

    shadowed
}

/// Действующая раскладка: для каждой комбинации остаётся последняя привязка
/// на позиции последнего определения
pub fn effective_bindings(keys: &[KeyBinding]) -> Vec<&KeyBinding> {
    let shadowed: Vec<usize> = find_shadowed(keys).into_iter().map(|(old, _)| old).collect();

    keys.iter()
        .enumerate()
        .filter(|(index, _)| !shadowed.contains(index))
        .map(|(_, binding)| binding)
        .collect()
}

pub fn warn_shadowed(keys: &[KeyBinding]) {
    for (old, new) in find_shadowed(keys) {
        warn!(
            "Привязка '{}' ({}) затенена более поздней: {}",
            keys[old].combination_id(),
            keys[old].action,
            keys[new].action
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Modifier;

    fn scheme() -> GroupKeyScheme {
        GroupKeyScheme {
            switch_modifiers: ModifierSet::new().with(Modifier::Mod4),
            move_modifiers: ModifierSet::new().with(Modifier::Mod4).with(Modifier::Shift),
            switch_on_move: false,
        }
    }

    fn mod4() -> ModifierSet {
        ModifierSet::new().with(Modifier::Mod4)
    }

    #[test]
    fn test_two_bindings_per_switchable_group() {
        let groups = vec![
            Group::new("1"),
            Group::new("2"),
            Group::new("scratch").scratchpad(),
            Group::new("3"),
        ];
        let scheme = scheme();
        let static_keys = vec![KeyBinding::new(mod4(), "q", Action::Window("kill".into()))];

        let keys = KeyBindingBuilder::new(static_keys, &scheme).build(&groups);

        assert_eq!(keys.len(), 1 + 2 * 3);
        assert_eq!(keys[0].key, "q");

        for (pair, name) in keys[1..].chunks(2).zip(["1", "2", "3"]) {
            assert_eq!(pair[0].key, name);
            assert_eq!(pair[0].action, Action::to_screen(name));
            assert_eq!(pair[0].modifiers, scheme.switch_modifiers);
            assert_eq!(pair[1].key, name);
            assert_eq!(pair[1].action, Action::to_group(name, false));
            assert_eq!(pair[1].modifiers, scheme.move_modifiers);
        }
    }

    #[test]
    fn test_switch_on_move_is_forwarded() {
        let mut scheme = scheme();
        scheme.switch_on_move = true;

        let keys = group_bindings(&scheme, &[Group::new("5")]);
        assert_eq!(keys[1].action.to_string(), "window.togroup 5 switch");
        assert_eq!(keys[0].desc, "Switch to group 5");
    }

    #[test]
    fn test_later_duplicate_shadows_earlier() {
        let keys = vec![
            KeyBinding::new(mod4(), "h", Action::Layout("left".into())),
            KeyBinding::new(mod4(), "l", Action::Layout("right".into())),
            KeyBinding::new(mod4(), "H", Action::spawn("xclip")),
        ];

        assert_eq!(find_shadowed(&keys), vec![(0, 2)]);

        let effective = effective_bindings(&keys);
        assert_eq!(effective.len(), 2);
        assert_eq!(effective[0].key, "l");
        assert_eq!(effective[1].action, Action::spawn("xclip"));
    }

    #[test]
    fn test_same_key_with_other_modifiers_is_not_shadowed() {
        let keys = vec![
            KeyBinding::new(mod4(), "h", Action::Layout("left".into())),
            KeyBinding::new(mod4().with(Modifier::Shift), "h", Action::Layout("shuffle_left".into())),
        ];

        assert!(find_shadowed(&keys).is_empty());
        assert_eq!(effective_bindings(&keys).len(), 2);
    }

    #[test]
    fn test_build_is_deterministic() {
        let groups = vec![Group::new("1"), Group::new("2")];
        let scheme = scheme();

        let first = KeyBindingBuilder::new(vec![], &scheme).build(&groups);
        let second = KeyBindingBuilder::new(vec![], &scheme).build(&groups);
        assert_eq!(first, second);
    }
}
