//! Option schema and stylesheet files

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::schema::RawOption;

/// Accepted top-level shapes: a bare array, or an object with an `options` array
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    List(Vec<RawOption>),
    Wrapped { options: Vec<RawOption> },
}

/// Parse option definitions from JSON text
pub fn parse_schema(contents: &str) -> Result<Vec<RawOption>> {
    let document: SchemaDocument =
        serde_json::from_str(contents).context("Failed to parse option schema JSON")?;
    Ok(match document {
        SchemaDocument::List(options) | SchemaDocument::Wrapped { options } => options,
    })
}

/// Read option definitions from a JSON file
pub fn load_schema(path: &Path) -> Result<Vec<RawOption>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read option schema from {:?}", path))?;
    let options = parse_schema(&contents)
        .with_context(|| format!("Invalid option schema in {:?}", path))?;
    info!(path = %path.display(), count = options.len(), "Loaded option schema");
    Ok(options)
}

/// Read a literal stylesheet (prefix or override)
pub fn read_stylesheet(path: &Path) -> Result<String> {
    let css = fs::read_to_string(path)
        .with_context(|| format!("Failed to read stylesheet from {:?}", path))?;
    if css.contains('\0') {
        bail!("Stylesheet {:?} contains NUL bytes", path);
    }
    Ok(css)
}
