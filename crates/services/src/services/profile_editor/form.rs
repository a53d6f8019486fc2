use std::collections::HashMap;

use serde_json::Value;

use super::coercion::coerce;
use super::schema::{
    EditorSchema, ProfileValues, SettingDescriptor, SettingKind, SettingOption, value_text,
};
use crate::error::{FieldError, FieldErrors, ValidationError};

/// Raw form submission: setting key -> text as entered.
///
/// Unchecked checkboxes are simply absent.
pub type RawFormValues = HashMap<String, String>;

/// Step granularity of a numeric input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStep {
    Integer,
    Any,
}

impl NumberStep {
    /// Value for an HTML `step` attribute.
    pub fn as_step_attr(self) -> &'static str {
        match self {
            NumberStep::Integer => "1",
            NumberStep::Any => "any",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Choice { options: Vec<SettingOption> },
    Checkbox,
    Number { step: NumberStep },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: String,
    pub label: String,
    pub description: String,
    pub control: Control,
    /// Effective initial value: the profile's value, else the schema default
    pub value: Value,
    pub unit: Option<String>,
}

impl FormField {
    /// Text shown in the field, or `None` for an unchecked checkbox.
    pub fn editable_value(&self) -> Option<String> {
        match self.control {
            Control::Checkbox => is_truthy(&self.value).then(|| "on".to_string()),
            Control::Choice { .. } | Control::Number { .. } => Some(value_text(&self.value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormCategory {
    pub key: String,
    pub fields: Vec<FormField>,
}

/// The rendered editor: categories and fields in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSpec {
    pub categories: Vec<FormCategory>,
}

impl FormSpec {
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.categories.iter().flat_map(|category| category.fields.iter())
    }

    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields().find(|field| field.key == key)
    }

    /// The form as a browser would submit it without any edits.
    pub fn raw_values(&self) -> RawFormValues {
        self.fields()
            .filter_map(|field| {
                field
                    .editable_value()
                    .map(|value| (field.key.clone(), value))
            })
            .collect()
    }
}

/// Renders and validates the profile editor for one schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaFormModel {
    schema: EditorSchema,
}

impl SchemaFormModel {
    pub fn new(schema: EditorSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &EditorSchema {
        &self.schema
    }

    /// Lay out every setting with its effective value.
    pub fn build(&self, current: &ProfileValues) -> FormSpec {
        let categories = self
            .schema
            .categories()
            .map(|(category, settings)| FormCategory {
                key: category.to_string(),
                fields: settings.map(|descriptor| field(descriptor, current)).collect(),
            })
            .collect();

        FormSpec { categories }
    }

    /// Coerce a submitted form into profile values.
    ///
    /// Either every value coerces or nothing is returned; the error names
    /// every offending setting.
    pub fn collect(&self, raw: &RawFormValues) -> Result<ProfileValues, ValidationError> {
        let mut values = ProfileValues::new();
        let mut errors = FieldErrors::default();

        for (key, text) in raw {
            let Some(descriptor) = self.schema.descriptor(key) else {
                errors.insert(key.clone(), FieldError::UnknownSetting);
                continue;
            };

            match coerce(descriptor, Some(text)) {
                Ok(value) => {
                    values.insert(key.clone(), value);
                }
                Err(error) => errors.insert(key.clone(), error),
            }
        }

        // unchecked boxes are not submitted
        for descriptor in self.schema.settings() {
            if descriptor.kind == SettingKind::Boolean && !raw.contains_key(&descriptor.key) {
                values.insert(descriptor.key.clone(), Value::Bool(false));
            }
        }

        if errors.is_empty() {
            Ok(values)
        } else {
            tracing::debug!("Profile form rejected: {}", errors);
            Err(ValidationError::Fields(errors))
        }
    }
}

fn field(descriptor: &SettingDescriptor, current: &ProfileValues) -> FormField {
    let control = match &descriptor.kind {
        SettingKind::Choice { options } => Control::Choice {
            options: options.clone(),
        },
        SettingKind::Boolean => Control::Checkbox,
        SettingKind::Int => Control::Number {
            step: NumberStep::Integer,
        },
        SettingKind::Float => Control::Number {
            step: NumberStep::Any,
        },
    };

    let value = current
        .get(&descriptor.key)
        .cloned()
        .unwrap_or_else(|| descriptor.default.clone());

    FormField {
        key: descriptor.key.clone(),
        label: descriptor.label.clone(),
        description: descriptor.description.clone(),
        control,
        value,
        unit: descriptor.unit.clone(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}
