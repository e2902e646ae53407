//! Session message types for controller ↔ renderer communication

use serde::{Deserialize, Serialize};

use crate::generator::Sources;
use crate::playground::Snapshot;
use crate::schema::RawOption;
use crate::types::Value;

/// Requests sent by the renderer (one per line)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum Request {
    /// A control changed
    SetValue { name: String, value: Value },

    /// Restore defaults for the current schema
    Reset,

    /// Replace the schema (resets every value)
    LoadSchema(Vec<RawOption>),

    /// Replace scope selector, element name, override/prefix stylesheets
    SetSources(Sources),

    /// Query current state
    Snapshot,

    /// Health check
    Ping,

    /// Stop the session
    Shutdown,
}

/// Responses and unsolicited events sent back (one per line)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Response {
    /// Current state (reply to every state-changing request and to Snapshot)
    Snapshot(Snapshot),

    /// Highlight deadlines elapsed (unsolicited)
    HighlightsExpired {
        lines: Vec<usize>,
        remaining: Vec<usize>,
    },

    /// Health check response
    Pong,

    /// Request could not be decoded
    Error(String),
}
