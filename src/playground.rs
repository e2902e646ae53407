//! Playground controller
//!
//! Owns the normalized schema, the value store, the last generated document
//! and the highlighter. Every mutation regenerates synchronously before
//! returning; only highlight expiry happens later.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::Settings;
use crate::generator::{render, Rendered, Sources};
use crate::highlight::Highlighter;
use crate::schema::{normalize, OptionSpec, RawOption};
use crate::store::ValueStore;
use crate::types::Value;

/// Serializable view of the playground state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub display: String,
    pub applied: String,
    pub highlighted: Vec<usize>,
    pub values: BTreeMap<String, Value>,
}

#[derive(Debug)]
pub struct Playground {
    options: Vec<OptionSpec>,
    store: ValueStore,
    sources: Sources,
    /// Last generated document; the next diff runs against its display text
    rendered: Rendered,
    highlighter: Highlighter,
}

impl Playground {
    pub fn new(definitions: &[RawOption], sources: Sources, highlight_duration: Duration) -> Self {
        let mut playground = Self {
            options: Vec::new(),
            store: ValueStore::new(),
            sources,
            rendered: Rendered::default(),
            highlighter: Highlighter::new(highlight_duration),
        };
        playground.initialize(definitions);
        playground
    }

    /// Build with generator flags and highlight duration taken from settings
    pub fn with_settings(definitions: &[RawOption], settings: &Settings) -> Self {
        Self::new(definitions, settings.sources(), settings.highlight_duration())
    }

    /// Replace the schema, reset every value to its default and regenerate
    /// Highlights are cleared; the new document becomes the diff baseline
    pub fn initialize(&mut self, definitions: &[RawOption]) {
        self.options = normalize(definitions);
        self.store.initialize(&self.options);
        self.highlighter.clear();
        self.rendered = self.generate();
        info!(options = self.options.len(), lines = self.line_count(), "Initialized playground");
    }

    /// Restore default values for the current schema (same as re-initializing)
    pub fn reset(&mut self) {
        self.store.reset();
        self.highlighter.clear();
        self.rendered = self.generate();
        info!("Reset playground to defaults");
    }

    /// Set one option's value and regenerate
    ///
    /// Pending highlights from earlier edits are dropped before the new diff.
    /// Unknown names leave everything untouched and return false.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> bool {
        self.set_value_at(name, value.into(), Instant::now())
    }

    pub fn set_value_at(&mut self, name: &str, value: Value, now: Instant) -> bool {
        if !self.store.set_value(name, value) {
            return false;
        }
        self.highlighter.clear();
        let changed = self.regenerate(now);
        debug!(option = %name, changed = ?changed, "Applied value change");
        true
    }

    /// Set one option from text typed by a user (see [`OptionSpec::resolve_input`])
    pub fn set_input(&mut self, name: &str, input: &str) -> bool {
        let Some(spec) = self.options.iter().find(|spec| spec.name == name) else {
            return false;
        };
        let value = spec.resolve_input(input);
        self.set_value(name, value)
    }

    /// Replace generator flags and regenerate
    /// Pending highlights are kept; newly changed lines are flagged on top
    pub fn set_sources(&mut self, sources: Sources) {
        self.sources = sources;
        let changed = self.regenerate(Instant::now());
        debug!(changed = ?changed, "Applied new generator sources");
    }

    fn regenerate(&mut self, now: Instant) -> Vec<usize> {
        let next = self.generate();
        let changed = self
            .highlighter
            .compare_at(&self.rendered.display, &next.display, now);
        self.rendered = next;
        changed
    }

    fn generate(&self) -> Rendered {
        render(&self.options, self.store.values(), &self.sources)
    }

    fn line_count(&self) -> usize {
        if self.rendered.display.is_empty() {
            0
        } else {
            self.rendered.display.split('\n').count()
        }
    }

    pub fn display_text(&self) -> &str {
        &self.rendered.display
    }

    pub fn applied_text(&self) -> &str {
        &self.rendered.applied
    }

    /// Currently highlighted display-line indices, ascending
    pub fn highlighted_lines(&self) -> Vec<usize> {
        self.highlighter.active()
    }

    pub fn highlighted_lines_at(&self, now: Instant) -> Vec<usize> {
        self.highlighter.active_at(now)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        self.store.values()
    }

    /// Normalized schema, in declaration order
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.highlighter.next_deadline()
    }

    /// Prune highlights whose deadline has passed
    pub fn expire_due(&mut self, now: Instant) -> Vec<usize> {
        self.highlighter.expire(now)
    }

    /// Sleep until the next highlight deadline, then prune; pends while idle
    pub async fn wait_for_expiry(&mut self) -> Vec<usize> {
        self.highlighter.wait_for_expiry().await
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            display: self.rendered.display.clone(),
            applied: self.rendered.applied.clone(),
            highlighted: self.highlighted_lines(),
            values: self.store.values().clone(),
        }
    }
}
