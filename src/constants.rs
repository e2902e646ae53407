//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the crate, providing a single source of truth for constant values.

/// Stylesheet generation constants
pub mod css {
    /// Selector for the block collecting custom properties (`--x`)
    pub const DEFAULT_SCOPE_SELECTOR: &str = ":root";

    /// Class name used when an option declares no target class
    pub const DEFAULT_ELEMENT_NAME: &str = "element";

    /// Prefix marking a declaration as a custom property
    pub const CUSTOM_PROPERTY_PREFIX: &str = "--";

    /// Indentation for declarations inside a block
    pub const INDENT: &str = "  ";

    /// Separator between blocks (one blank line)
    pub const BLOCK_SEPARATOR: &str = "\n\n";
}

/// Option schema constants
pub mod schema {
    /// Initial value when an option has no default, min or choices
    pub const FALLBACK_COLOR: &str = "#000000";

    /// Wire names of the supported control kinds
    pub const KIND_COLOR: &str = "color";
    pub const KIND_SLIDER: &str = "slider";
    pub const KIND_SELECT: &str = "select";
    pub const KIND_DROPDOWN: &str = "dropdown";
}

/// Changed-line highlight constants
pub mod highlight {
    /// Time a flagged line stays highlighted without re-trigger
    pub const DEFAULT_DURATION_MS: u64 = 2000;
}

/// Settings validation ranges
pub mod validation {
    pub const MIN_HIGHLIGHT_DURATION_MS: u64 = 100;
    pub const MAX_HIGHLIGHT_DURATION_MS: u64 = 60_000;
}

/// Configuration file location
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "css-playground";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";
}

/// Session protocol constants
pub mod session {
    /// Maximum accepted request line (1 MB)
    pub const MAX_REQUEST_LEN: usize = 1024 * 1024;
}
