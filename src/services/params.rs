use crate::utils::Variables;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Значение параметра виджета или макета в том виде, в каком его примет рантайм
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Подставить переменные во все строки, включая вложенные списки
    pub fn expand(&self, vars: &Variables) -> Self {
        match self {
            ParamValue::Text(text) => ParamValue::Text(vars.expand(text)),
            ParamValue::List(items) => ParamValue::List(items.iter().map(|v| v.expand(vars)).collect()),
            other => other.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(value) => write!(f, "{}", value),
            ParamValue::Int(value) => write!(f, "{}", value),
            ParamValue::Float(value) => write!(f, "{}", value),
            ParamValue::Text(value) => write!(f, "{:?}", value),
            ParamValue::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

pub type Params = BTreeMap<String, ParamValue>;

pub fn expand_params(params: &Params, vars: &Variables) -> Params {
    params
        .iter()
        .map(|(name, value)| (name.clone(), value.expand(vars)))
        .collect()
}

/// Проверить цвет вида #RGB, #RRGGBB или #RRGGBBAA
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_values_from_json() {
        let params: Params =
            serde_json::from_str(r#"{"scale": 0.7, "margin_y": 4, "text": "x", "use_mouse_wheel": true, "margin": [8, 8, 4, 8]}"#)
                .unwrap();

        assert_eq!(params["scale"], ParamValue::Float(0.7));
        assert_eq!(params["margin_y"], ParamValue::Int(4));
        assert_eq!(params["text"].as_text(), Some("x"));
        assert_eq!(params["use_mouse_wheel"], ParamValue::Bool(true));
        assert_eq!(params["margin"].to_string(), "[8, 8, 4, 8]");
    }

    #[test]
    fn test_expand_reaches_nested_lists() {
        let mut vars = Variables::new();
        vars.insert("text_color", "#667855");

        let value = ParamValue::List(vec!["{text_color}".into(), 1i64.into()]);
        assert_eq!(
            value.expand(&vars),
            ParamValue::List(vec!["#667855".into(), 1i64.into()])
        );
    }

    #[test]
    fn test_hex_colors() {
        assert!(is_hex_color("#0A0D09"));
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#100C0Fcc"));
        assert!(!is_hex_color("0A0D09"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#GGGGGG"));
    }
}
