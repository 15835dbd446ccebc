use crate::error::Result;
use crate::services::params::{expand_params, Params};
use crate::tilecfg_error;
use crate::utils::Variables;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Алгоритм раскладки рантайма (здесь только тег)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Columns,
    MonadTall,
    MonadWide,
    Matrix,
    Bsp,
    Floating,
    RatioTile,
    Max,
    Stack,
    Tile,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Columns => "columns",
            LayoutKind::MonadTall => "monadtall",
            LayoutKind::MonadWide => "monadwide",
            LayoutKind::Matrix => "matrix",
            LayoutKind::Bsp => "bsp",
            LayoutKind::Floating => "floating",
            LayoutKind::RatioTile => "ratiotile",
            LayoutKind::Max => "max",
            LayoutKind::Stack => "stack",
            LayoutKind::Tile => "tile",
        }
    }
}

/// Тема макетов: общие отступы и рамки
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTheme {
    pub margin: u32,
    pub border_width: u32,
}

/// Описание макета в конфигурации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub kind: LayoutKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub margin: Option<u32>,
    #[serde(default)]
    pub border_width: Option<u32>,
    #[serde(default, flatten)]
    pub params: Params,
}

impl LayoutSpec {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            name: None,
            margin: None,
            border_width: None,
            params: Params::new(),
        }
    }

    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }
}

/// Собранный макет для рантайма
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub name: String,
    pub kind: LayoutKind,
    pub margin: u32,
    pub border_width: u32,
    #[serde(skip_serializing_if = "Params::is_empty")]
    pub params: Params,
}

/// Применяет тему к описаниям макетов
pub struct LayoutAssembler<'a> {
    theme: &'a LayoutTheme,
    vars: &'a Variables,
}

impl<'a> LayoutAssembler<'a> {
    pub fn new(theme: &'a LayoutTheme, vars: &'a Variables) -> Self {
        Self { theme, vars }
    }

    pub fn assemble(&self, specs: &[LayoutSpec]) -> Result<Vec<Layout>> {
        if specs.is_empty() {
            return Err(tilecfg_error!(layout, "Список макетов пуст"));
        }

        let mut seen = HashSet::new();
        specs
            .iter()
            .map(|spec| {
                let name = spec.effective_name().to_string();
                if !seen.insert(name.clone()) {
                    return Err(tilecfg_error!(layout, "Повторяющееся имя макета '{}'", name));
                }

                Ok(Layout {
                    name,
                    kind: spec.kind,
                    margin: spec.margin.unwrap_or(self.theme.margin),
                    border_width: spec.border_width.unwrap_or(self.theme.border_width),
                    params: expand_params(&spec.params, self.vars),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::params::ParamValue;

    #[test]
    fn test_theme_applies_unless_overridden() {
        let theme = LayoutTheme {
            margin: 14,
            border_width: 2,
        };
        let vars = Variables::new();

        let mut tall = LayoutSpec::new(LayoutKind::MonadTall);
        tall.params.insert("ratio".into(), ParamValue::Float(0.6));
        let mut max = LayoutSpec::new(LayoutKind::Max);
        max.margin = Some(0);

        let layouts = LayoutAssembler::new(&theme, &vars).assemble(&[tall, max]).unwrap();

        assert_eq!(layouts[0].name, "monadtall");
        assert_eq!(layouts[0].margin, 14);
        assert_eq!(layouts[0].border_width, 2);
        assert_eq!(layouts[0].params["ratio"], ParamValue::Float(0.6));
        assert_eq!(layouts[1].margin, 0);
        assert_eq!(layouts[1].border_width, 2);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let theme = LayoutTheme::default();
        let vars = Variables::new();
        let specs = [LayoutSpec::new(LayoutKind::Max), LayoutSpec::new(LayoutKind::Max)];

        assert!(LayoutAssembler::new(&theme, &vars).assemble(&specs).is_err());

        let mut named = LayoutSpec::new(LayoutKind::Max);
        named.name = Some("fullscreen".into());
        let specs = [LayoutSpec::new(LayoutKind::Max), named];
        assert!(LayoutAssembler::new(&theme, &vars).assemble(&specs).is_ok());
    }

    #[test]
    fn test_spec_from_json_flattens_extra_params() {
        let spec: LayoutSpec = serde_json::from_str(r#"{"kind": "bsp", "fair": false}"#).unwrap();

        assert_eq!(spec.kind, LayoutKind::Bsp);
        assert_eq!(spec.params["fair"], ParamValue::Bool(false));
        assert_eq!(spec.effective_name(), "bsp");
    }
}
