//! Stylesheet generation
//!
//! [`generate`] is a pure function of the schema, the current values and the
//! block selectors: no counters, randomness or clock values are involved, so
//! identical inputs always give byte-identical text. [`render`] layers the
//! literal override and prefix stylesheets on top and produces both the
//! displayed and the applied text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::constants::css::*;
use crate::schema::OptionSpec;
use crate::types::Value;

/// Literal stylesheets and selectors that shape the output besides the values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    /// Selector of the block collecting `--custom` properties
    pub scope_selector: String,
    /// Class used by options without a target class
    pub element_name: String,
    /// Used verbatim instead of the generated text when non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_css: Option<String>,
    /// Prepended to the generated (or override) text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_css: Option<String>,
    /// Keep the prefix out of the displayed text (it is still applied)
    pub hide_prefix: bool,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            scope_selector: DEFAULT_SCOPE_SELECTOR.to_string(),
            element_name: DEFAULT_ELEMENT_NAME.to_string(),
            override_css: None,
            prefix_css: None,
            hide_prefix: false,
        }
    }
}

/// Output of one generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Text shown to the reader (and diffed for highlights)
    pub display: String,
    /// Text that takes visual effect; differs from `display` only by a hidden prefix
    pub applied: String,
}

/// Generate the stylesheet for the current values
///
/// Custom properties (`--x`) are collected into one block under
/// `scope_selector`; every other declaration goes to the option's target
/// class, or `element_name` when it has none. The scope block comes first,
/// then class blocks in first-seen order, separated by a blank line.
pub fn generate(
    options: &[OptionSpec],
    values: &BTreeMap<String, Value>,
    scope_selector: &str,
    element_name: &str,
) -> String {
    let mut scope_declarations: Vec<String> = Vec::new();
    let mut class_blocks: Vec<(&str, Vec<String>)> = Vec::new();

    for spec in options.iter().filter(|spec| spec.control.is_supported()) {
        let current = values.get(&spec.name).unwrap_or(&spec.initial);

        for entry in spec.properties_for(current) {
            let Some(property) = entry.property.as_deref() else {
                trace!(option = %spec.name, "Skipping property entry without a name");
                continue;
            };
            let value = entry.value.as_ref().unwrap_or(current);
            let unit = entry.unit.as_deref().unwrap_or("");
            let declaration = format!("{INDENT}{property}: {value}{unit};");

            if property.starts_with(CUSTOM_PROPERTY_PREFIX) {
                scope_declarations.push(declaration);
                continue;
            }

            let class = spec.target_class.as_deref().unwrap_or(element_name);
            match class_blocks.iter_mut().find(|(name, _)| *name == class) {
                Some((_, declarations)) => declarations.push(declaration),
                None => class_blocks.push((class, vec![declaration])),
            }
        }
    }

    let mut blocks = Vec::with_capacity(class_blocks.len() + 1);
    if !scope_declarations.is_empty() {
        blocks.push(format_block(scope_selector, &scope_declarations));
    }
    for (class, declarations) in &class_blocks {
        blocks.push(format_block(&format!(".{class}"), declarations));
    }
    blocks.join(BLOCK_SEPARATOR)
}

fn format_block(selector: &str, declarations: &[String]) -> String {
    format!("{selector} {{\n{}\n}}", declarations.join("\n"))
}

/// Produce display and applied text
pub fn render(
    options: &[OptionSpec],
    values: &BTreeMap<String, Value>,
    sources: &Sources,
) -> Rendered {
    let body = match sources.override_css.as_deref().filter(|css| !css.is_empty()) {
        Some(css) => css.to_string(),
        None => generate(options, values, &sources.scope_selector, &sources.element_name),
    };

    let prefix = sources
        .prefix_css
        .as_deref()
        .map(str::trim)
        .filter(|css| !css.is_empty());

    let applied = match prefix {
        Some(prefix) if body.is_empty() => prefix.to_string(),
        Some(prefix) => format!("{prefix}{BLOCK_SEPARATOR}{body}"),
        None => body.clone(),
    };
    let display = if sources.hide_prefix { body } else { applied.clone() };

    Rendered { display, applied }
}
