//! Configuration management for css-playground
//!
//! - **settings**: generator and highlight settings persisted as JSON
//! - **schema_file**: option schemas and literal stylesheets read from disk

pub mod schema_file;
pub mod settings;

// Re-export commonly used types
pub use schema_file::{load_schema, read_stylesheet};
pub use settings::Settings;
