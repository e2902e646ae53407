#![forbid(unsafe_code)]
//! Live CSS playground engine
//!
//! Generates stylesheet text from a schema of typed controls and their
//! current values, and tracks which output lines changed between
//! generations so a renderer can briefly highlight them.

pub mod config;
pub mod constants;
pub mod generator;
pub mod highlight;
pub mod playground;
pub mod protocol;
pub mod schema;
pub mod session;
pub mod store;
pub mod types;

pub use generator::{generate, render, Rendered, Sources};
pub use highlight::{changed_lines, Highlighter};
pub use playground::{Playground, Snapshot};
pub use schema::{normalize, Control, OptionSpec, RawOption};
pub use store::ValueStore;
pub use types::Value;
