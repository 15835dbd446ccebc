use std::collections::BTreeMap;

/// Переменные конфигурации для подстановки `{name}` в строки.
///
/// Неизвестные имена остаются как есть: форматы вроде `{play_status}`
/// принадлежат виджетам и должны дойти до рантайма без изменений.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn expand(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find('{') {
            result.push_str(&rest[..start]);
            let tail = &rest[start..];

            match tail.find('}') {
                Some(end) => {
                    let name = &tail[1..end];
                    // Ближе к '}' есть ещё '{': всё до неё остаётся текстом
                    if let Some(inner) = name.rfind('{') {
                        result.push_str(&tail[..=inner]);
                        rest = &tail[inner + 1..];
                        continue;
                    }
                    match self.get(name) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&tail[..=end]),
                    }
                    rest = &tail[end + 1..];
                }
                None => {
                    result.push_str(tail);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }
}
