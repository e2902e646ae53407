//! Option schema normalization
//!
//! Raw option definitions arrive in the loose shape authors write them in:
//! choices may be bare scalars or full records, properties may be a single
//! `property`/`unit` pair or a list. [`normalize`] turns them into canonical
//! [`OptionSpec`]s with one [`Control`] variant per control kind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::constants::schema::*;
use crate::types::Value;

/// One `(property, value, unit)` entry driven by an option
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Entries without a property name are skipped during generation
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,

    /// Fixed value overriding the option's current value
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl PropertySpec {
    pub fn new(property: &str, unit: Option<&str>) -> Self {
        Self {
            property: Some(property.to_string()),
            value: None,
            unit: unit.map(str::to_string),
        }
    }
}

/// Choice as written by the author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChoice {
    /// `"solid"` - value and label are the same
    Bare(Value),
    Full {
        value: Value,
        #[serde(default, deserialize_with = "lenient")]
        label: Option<String>,
        #[serde(default, deserialize_with = "lenient_list")]
        properties: Option<Vec<PropertySpec>>,
    },
}

/// Option definition as written by the author (camelCase JSON keys)
///
/// Fields of the wrong JSON type count as absent, so one malformed entry
/// degrades to an unsupported option instead of rejecting the schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOption {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub default: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub step: Option<f64>,
    #[serde(default, deserialize_with = "lenient_choices")]
    pub options: Vec<RawChoice>,
    #[serde(default, deserialize_with = "lenient")]
    pub property: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub properties: Option<Vec<PropertySpec>>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_class: Option<String>,
}

/// Accept any JSON for a field, keeping it only when it has the expected shape
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Array of entries with malformed elements dropped; anything else is absent
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

fn lenient_choices<'de, D>(deserializer: D) -> Result<Vec<RawChoice>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_list(deserializer)?.unwrap_or_default())
}

/// Canonical enumerable choice
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: Value,
    pub label: String,
    /// Replaces the option's own property list while this choice is selected
    pub properties: Option<Vec<PropertySpec>>,
}

/// Control kind, carrying only the fields that kind needs
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Color,
    Slider {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Select {
        choices: Vec<Choice>,
    },
    Dropdown {
        choices: Vec<Choice>,
    },
    /// Unrecognized or missing `type`: no control, no declarations
    Unsupported {
        kind: Option<String>,
    },
}

impl Control {
    /// Enumerable choices (empty for non-enumerable kinds)
    pub fn choices(&self) -> &[Choice] {
        match self {
            Control::Select { choices } | Control::Dropdown { choices } => choices,
            Control::Color | Control::Slider { .. } | Control::Unsupported { .. } => &[],
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Control::Unsupported { .. })
    }
}

/// Canonical option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub control: Control,
    /// Property list used when no selected choice carries its own
    pub properties: Vec<PropertySpec>,
    /// Class name without leading `.`
    pub target_class: Option<String>,
    /// Value the store is seeded with on initialize/reset
    pub initial: Value,
}

impl OptionSpec {
    /// Property list in effect for `value`
    pub fn properties_for(&self, value: &Value) -> &[PropertySpec] {
        self.control
            .choices()
            .iter()
            .find(|choice| &choice.value == value)
            .and_then(|choice| choice.properties.as_deref())
            .unwrap_or(self.properties.as_slice())
    }

    /// Interpret text typed by a user: a choice whose value reads the same
    /// wins, so a declared `"10"` stays text while a bare `10` stays a number
    pub fn resolve_input(&self, input: &str) -> Value {
        self.control
            .choices()
            .iter()
            .find(|choice| choice.value.to_string() == input)
            .map(|choice| choice.value.clone())
            .unwrap_or_else(|| Value::parse(input))
    }
}

/// Normalize raw definitions, keeping the first definition of each name
pub fn normalize(raw: &[RawOption]) -> Vec<OptionSpec> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(raw.len());

    for option in raw {
        if !seen.insert(option.name.as_str()) {
            warn!(option = %option.name, "Duplicate option name, keeping first definition");
            continue;
        }
        let spec = normalize_option(option);
        if let Control::Unsupported { kind } = &spec.control {
            warn!(
                option = %spec.name,
                kind = ?kind,
                "Unsupported option type, option will produce no CSS"
            );
        }
        specs.push(spec);
    }

    debug!(count = specs.len(), "Normalized option schema");
    specs
}

fn normalize_option(raw: &RawOption) -> OptionSpec {
    let control = match raw.kind.as_deref() {
        Some(KIND_COLOR) => Control::Color,
        Some(KIND_SLIDER) => Control::Slider {
            min: raw.min,
            max: raw.max,
            step: raw.step,
        },
        Some(KIND_SELECT) => Control::Select {
            choices: raw.options.iter().map(normalize_choice).collect(),
        },
        Some(KIND_DROPDOWN) => Control::Dropdown {
            choices: raw.options.iter().map(normalize_choice).collect(),
        },
        other => Control::Unsupported {
            kind: other.map(str::to_string),
        },
    };

    let properties = match &raw.properties {
        Some(list) => list.clone(),
        None => vec![PropertySpec {
            property: raw.property.clone(),
            value: None,
            unit: raw.unit.clone(),
        }],
    };

    let initial = initial_value(raw.default.as_ref(), &control);

    OptionSpec {
        name: raw.name.clone(),
        label: raw.label.clone().unwrap_or_else(|| raw.name.clone()),
        description: raw.description.clone(),
        control,
        properties,
        target_class: raw.target_class.as_deref().and_then(format_class_name),
        initial,
    }
}

fn normalize_choice(raw: &RawChoice) -> Choice {
    match raw {
        RawChoice::Bare(value) => Choice {
            value: value.clone(),
            label: value.to_string(),
            properties: None,
        },
        RawChoice::Full {
            value,
            label,
            properties,
        } => Choice {
            value: value.clone(),
            label: label
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| value.to_string()),
            properties: properties.clone(),
        },
    }
}

/// Declared default, else slider min, else first choice, else fallback color
fn initial_value(default: Option<&Value>, control: &Control) -> Value {
    if let Some(value) = default {
        return value.clone();
    }
    match control {
        Control::Slider { min: Some(min), .. } => Value::Number(*min),
        Control::Select { choices } | Control::Dropdown { choices } if !choices.is_empty() => {
            choices[0].value.clone()
        }
        _ => Value::Text(FALLBACK_COLOR.to_string()),
    }
}

/// Strip one leading `.`; blank names mean "no target class"
fn format_class_name(name: &str) -> Option<String> {
    let stripped = name.strip_prefix('.').unwrap_or(name);
    if stripped.trim().is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}
