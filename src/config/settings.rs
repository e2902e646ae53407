//! Persisted playground settings
//!
//! JSON file under the platform config directory. Every field has a serde
//! default, so partial or older files load cleanly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::{css, highlight};
use crate::generator::Sources;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Selector for the custom-property block
    #[serde(default = "default_scope_selector")]
    pub scope_selector: String,

    /// Class used by options without a target class
    #[serde(default = "default_element_name")]
    pub element_name: String,

    /// How long a changed line stays highlighted
    #[serde(default = "default_highlight_duration_ms")]
    pub highlight_duration_ms: u64,

    /// Keep the prefix stylesheet out of the displayed text
    #[serde(default)]
    pub hide_prefix: bool,
}

fn default_scope_selector() -> String {
    css::DEFAULT_SCOPE_SELECTOR.to_string()
}

fn default_element_name() -> String {
    css::DEFAULT_ELEMENT_NAME.to_string()
}

fn default_highlight_duration_ms() -> u64 {
    highlight::DEFAULT_DURATION_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scope_selector: default_scope_selector(),
            element_name: default_element_name(),
            highlight_duration_ms: default_highlight_duration_ms(),
            hide_prefix: false,
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let mut settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;

        settings.validate_and_clamp();
        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Clamp values to safe ranges after loading
    fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if self.highlight_duration_ms < MIN_HIGHLIGHT_DURATION_MS {
            warn!(
                highlight_duration_ms = self.highlight_duration_ms,
                min = MIN_HIGHLIGHT_DURATION_MS,
                "highlight_duration_ms below minimum, clamping"
            );
            self.highlight_duration_ms = MIN_HIGHLIGHT_DURATION_MS;
        } else if self.highlight_duration_ms > MAX_HIGHLIGHT_DURATION_MS {
            warn!(
                highlight_duration_ms = self.highlight_duration_ms,
                max = MAX_HIGHLIGHT_DURATION_MS,
                "highlight_duration_ms exceeds maximum, clamping"
            );
            self.highlight_duration_ms = MAX_HIGHLIGHT_DURATION_MS;
        }

        if self.scope_selector.trim().is_empty() {
            warn!(using = css::DEFAULT_SCOPE_SELECTOR, "scope_selector is blank, using default");
            self.scope_selector = default_scope_selector();
        }

        if self.element_name.trim().is_empty() {
            warn!(using = css::DEFAULT_ELEMENT_NAME, "element_name is blank, using default");
            self.element_name = default_element_name();
        }
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_duration_ms)
    }

    /// Generator flags with no override or prefix stylesheet
    pub fn sources(&self) -> Sources {
        Sources {
            scope_selector: self.scope_selector.clone(),
            element_name: self.element_name.clone(),
            override_css: None,
            prefix_css: None,
            hide_prefix: self.hide_prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("css-playground-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.scope_selector, ":root");
        assert_eq!(settings.element_name, "element");
        assert_eq!(settings.highlight_duration(), Duration::from_millis(2000));
        assert!(!settings.hide_prefix);
    }

    #[test]
    fn test_partial_json_uses_field_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"element_name":"demo"}"#).unwrap();
        assert_eq!(settings.element_name, "demo");
        assert_eq!(settings.scope_selector, ":root");
        assert_eq!(settings.highlight_duration_ms, 2000);
    }

    #[test]
    fn test_validate_and_clamp() {
        let mut settings = Settings {
            scope_selector: "  ".to_string(),
            element_name: String::new(),
            highlight_duration_ms: 5,
            hide_prefix: true,
        };
        settings.validate_and_clamp();
        assert_eq!(settings.scope_selector, ":root");
        assert_eq!(settings.element_name, "element");
        assert_eq!(settings.highlight_duration_ms, 100);

        settings.highlight_duration_ms = 3_600_000;
        settings.validate_and_clamp();
        assert_eq!(settings.highlight_duration_ms, 60_000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load_from(&temp_path("does-not-exist.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip/settings.json");
        let settings = Settings {
            scope_selector: ".playground".to_string(),
            element_name: "preview".to_string(),
            highlight_duration_ms: 1500,
            hide_prefix: true,
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt/settings.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings JSON"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_sources_from_settings() {
        let settings = Settings {
            hide_prefix: true,
            ..Settings::default()
        };
        let sources = settings.sources();
        assert_eq!(sources.scope_selector, ":root");
        assert!(sources.hide_prefix);
        assert!(sources.prefix_css.is_none());
    }
}
