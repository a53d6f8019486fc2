use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

/// Values of one profile, keyed by setting key. Keys need not cover the schema.
pub type ProfileValues = serde_json::Map<String, Value>;

/// Declared type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SettingType {
    Int,
    Float,
    Boolean,
    Enum,
}

/// One allowed value of a closed-choice setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingOption {
    pub value: Value,
    pub label: String,
}

impl SettingOption {
    /// The option's value as it appears in a form field.
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }
}

/// How a setting is edited and validated.
///
/// A setting that declares options is always a closed choice, whatever its
/// declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingKind {
    Int,
    Float,
    Boolean,
    Choice { options: Vec<SettingOption> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingDescriptor {
    pub category: String,
    pub key: String,
    pub label: String,
    pub description: String,
    pub setting_type: SettingType,
    pub kind: SettingKind,
    pub default: Value,
    /// Display-only annotation, never part of the value
    pub unit: Option<String>,
}

/// Options arrive either as a list of `{value, label}` or as a `value -> label` map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOptions {
    List(Vec<SettingOption>),
    Map(IndexMap<String, String>),
}

impl From<RawOptions> for Vec<SettingOption> {
    fn from(raw: RawOptions) -> Self {
        match raw {
            RawOptions::List(options) => options,
            RawOptions::Map(options) => options
                .into_iter()
                .map(|(value, label)| SettingOption {
                    value: Value::String(value),
                    label,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSettingDescriptor {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    setting_type: SettingType,
    #[serde(default)]
    default: Value,
    #[serde(default)]
    options: Option<RawOptions>,
    #[serde(default)]
    unit: Option<String>,
}

type RawSchema = IndexMap<String, IndexMap<String, RawSettingDescriptor>>;

impl SettingDescriptor {
    fn from_raw(category: &str, key: String, raw: RawSettingDescriptor) -> Self {
        let kind = match (raw.options, raw.setting_type) {
            (Some(options), _) => SettingKind::Choice {
                options: options.into(),
            },
            (None, SettingType::Int) => SettingKind::Int,
            (None, SettingType::Float) => SettingKind::Float,
            (None, SettingType::Boolean) => SettingKind::Boolean,
            (None, SettingType::Enum) => SettingKind::Choice {
                options: Vec::new(),
            },
        };

        Self {
            category: category.to_string(),
            label: raw.label.unwrap_or_else(|| key.clone()),
            key,
            description: raw.description.unwrap_or_default(),
            setting_type: raw.setting_type,
            kind,
            default: raw.default,
            unit: raw.unit.filter(|unit| !unit.is_empty()),
        }
    }
}

/// Category -> setting structure of the profile editor, in server order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawSchema")]
pub struct EditorSchema {
    categories: IndexMap<String, IndexMap<String, SettingDescriptor>>,
}

impl From<RawSchema> for EditorSchema {
    fn from(raw: RawSchema) -> Self {
        let categories = raw
            .into_iter()
            .map(|(category, settings)| {
                let settings = settings
                    .into_iter()
                    .map(|(key, raw)| {
                        let descriptor = SettingDescriptor::from_raw(&category, key.clone(), raw);
                        (key, descriptor)
                    })
                    .collect();
                (category, settings)
            })
            .collect();

        Self { categories }
    }
}

impl EditorSchema {
    /// Categories with their settings, both in insertion order.
    pub fn categories(
        &self,
    ) -> impl Iterator<Item = (&str, indexmap::map::Values<'_, String, SettingDescriptor>)> {
        self.categories
            .iter()
            .map(|(category, settings)| (category.as_str(), settings.values()))
    }

    pub fn settings(&self) -> impl Iterator<Item = &SettingDescriptor> {
        self.categories.values().flat_map(IndexMap::values)
    }

    pub fn descriptor(&self, key: &str) -> Option<&SettingDescriptor> {
        self.categories
            .values()
            .find_map(|settings| settings.get(key))
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render a JSON value the way a form input shows it.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const SCHEMA: &str = r#"{
        "support": {
            "support_type": {
                "label": "Placement",
                "type": "enum",
                "default": "everywhere",
                "options": { "everywhere": "Everywhere", "buildplate": "Touching Buildplate" }
            },
            "support_enable": { "label": "Enable Support", "type": "boolean", "default": false },
            "top_layers": {
                "type": "int",
                "default": 4,
                "options": [{ "value": 4, "label": "Four" }, { "value": 6, "label": "Six" }]
            }
        },
        "resolution": {
            "wall_line_count": { "type": "int", "default": 2 },
            "layer_height": {
                "label": "Layer Height",
                "type": "float",
                "default": 0.1,
                "unit": "mm"
            }
        }
    }"#;

    fn schema() -> EditorSchema {
        serde_json::from_str(SCHEMA).expect("schema should decode")
    }

    /// Test schema decoding in insertion order
    #[test]
    fn test_keeps_insertion_order() {
        let schema = schema();
        let order: Vec<(String, Vec<String>)> = schema
            .categories()
            .map(|(category, settings)| {
                (
                    category.to_string(),
                    settings.map(|s| s.key.clone()).collect(),
                )
            })
            .collect();

        assert_eq!(
            order,
            vec![
                (
                    "support".to_string(),
                    vec![
                        "support_type".to_string(),
                        "support_enable".to_string(),
                        "top_layers".to_string()
                    ]
                ),
                (
                    "resolution".to_string(),
                    vec!["wall_line_count".to_string(), "layer_height".to_string()]
                ),
            ]
        );
        assert_eq!(schema.len(), 5);
    }

    /// Test settings with options decoding as choices
    #[test]
    fn test_options_make_a_choice_regardless_of_type() {
        let schema = schema();
        let top_layers = schema.descriptor("top_layers").expect("top_layers");
        assert_eq!(top_layers.setting_type, SettingType::Int);
        assert!(matches!(
            &top_layers.kind,
            SettingKind::Choice { options } if options.len() == 2
        ));

        let support_type = schema.descriptor("support_type").expect("support_type");
        let SettingKind::Choice { options } = &support_type.kind else {
            panic!("support_type should be a choice");
        };
        assert_eq!(options[0].value, json!("everywhere"));
        assert_eq!(options[1].label, "Touching Buildplate");
    }

    /// Test missing setting metadata being filled in
    #[test]
    fn test_fills_missing_metadata() {
        let schema = schema();
        let walls = schema.descriptor("wall_line_count").expect("wall_line_count");
        assert_eq!(walls.label, "wall_line_count");
        assert_eq!(walls.description, "");
        assert_eq!(walls.category, "resolution");
        assert_eq!(walls.kind, SettingKind::Int);
        assert_eq!(
            schema.descriptor("layer_height").and_then(|d| d.unit.as_deref()),
            Some("mm")
        );
    }

    /// Test error handling for unknown setting types
    #[test]
    fn test_rejects_unknown_setting_types() {
        let result = serde_json::from_value::<EditorSchema>(json!({
            "misc": { "name": { "type": "string", "default": "" } }
        }));
        assert!(result.is_err());
    }
}
