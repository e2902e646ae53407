//! Changed-line detection and expiring highlights
//!
//! The comparison is positional: line `i` of the new document is compared
//! with line `i` of the previous one, with no alignment. Inserting a block
//! therefore flags the shifted declarations below it as well.

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::constants::highlight::DEFAULT_DURATION_MS;

/// Property name of a `<property>: <value>;` line
/// Whitespace-tolerant; the property may only contain ASCII letters and `-`
pub fn parse_declaration(line: &str) -> Option<&str> {
    let (head, rest) = line.split_once(':')?;
    let property = head.trim();
    let valid = !property.is_empty()
        && property.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
    if valid && !rest.is_empty() {
        Some(property)
    } else {
        None
    }
}

/// Indices of lines in `current` that count as changed relative to `previous`
///
/// A line counts when it is a declaration, differs (ignoring surrounding
/// whitespace) from the line at the same index, and that previous line either
/// is not a declaration or declares the same property.
pub fn changed_lines(previous: &str, current: &str) -> Vec<usize> {
    let previous: Vec<&str> = if previous.is_empty() {
        Vec::new()
    } else {
        previous.split('\n').collect()
    };

    current
        .split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let property = parse_declaration(line)?;
            let before = previous.get(index).copied().unwrap_or("");
            if line.trim() == before.trim() {
                return None;
            }
            match parse_declaration(before) {
                Some(previous_property) if previous_property != property => None,
                _ => Some(index),
            }
        })
        .collect()
}

/// Set of highlighted line indices, each with its own expiry deadline
///
/// Re-flagging a line replaces its deadline. Expired lines stop being
/// reported as soon as their deadline passes; [`Highlighter::expire`] prunes
/// them from the map.
#[derive(Debug, Clone)]
pub struct Highlighter {
    duration: Duration,
    deadlines: BTreeMap<usize, Instant>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DURATION_MS))
    }
}

impl Highlighter {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadlines: BTreeMap::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Drop every pending highlight
    pub fn clear(&mut self) {
        if !self.deadlines.is_empty() {
            debug!(cleared = self.deadlines.len(), "Cleared pending highlights");
        }
        self.deadlines.clear();
    }

    /// Flag `line` until `now + duration`, replacing any earlier deadline
    pub fn flag(&mut self, line: usize, now: Instant) {
        let deadline = now + self.duration;
        if self.deadlines.insert(line, deadline).is_some() {
            trace!(line, "Restarted highlight timer");
        }
    }

    /// Diff two documents and flag the changed lines
    pub fn compare_at(&mut self, previous: &str, current: &str, now: Instant) -> Vec<usize> {
        let changed = changed_lines(previous, current);
        for &line in &changed {
            self.flag(line, now);
        }
        if !changed.is_empty() {
            debug!(lines = ?changed, "Flagged changed lines");
        }
        changed
    }

    /// Lines still highlighted at `now`, ascending
    pub fn active_at(&self, now: Instant) -> Vec<usize> {
        self.deadlines
            .iter()
            .filter(|&(_, deadline)| *deadline > now)
            .map(|(&line, _)| line)
            .collect()
    }

    pub fn active(&self) -> Vec<usize> {
        self.active_at(Instant::now())
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove lines whose deadline has passed, returning them
    pub fn expire(&mut self, now: Instant) -> Vec<usize> {
        let expired: Vec<usize> = self
            .deadlines
            .iter()
            .filter(|&(_, deadline)| *deadline <= now)
            .map(|(&line, _)| line)
            .collect();
        for line in &expired {
            self.deadlines.remove(line);
        }
        if !expired.is_empty() {
            debug!(lines = ?expired, "Highlights expired");
        }
        expired
    }

    /// Sleep until the next deadline, then prune
    /// Pends forever while nothing is highlighted. Cancel-safe: nothing is
    /// mutated before the sleep completes.
    pub async fn wait_for_expiry(&mut self) -> Vec<usize> {
        match self.next_deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.expire(Instant::now())
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX_4: &str = ".box {\n  border-radius: 4px;\n}";
    const BOX_10: &str = ".box {\n  border-radius: 10px;\n}";

    #[test]
    fn test_parse_declaration() {
        assert_eq!(parse_declaration("  border-radius: 4px;"), Some("border-radius"));
        assert_eq!(parse_declaration("--gap:1rem"), Some("--gap"));
        assert_eq!(parse_declaration("color :red;"), Some("color"));
        assert_eq!(parse_declaration(".box {"), None);
        assert_eq!(parse_declaration(":root {"), None);
        assert_eq!(parse_declaration("}"), None);
        assert_eq!(parse_declaration(""), None);
        assert_eq!(parse_declaration("color:"), None);
        assert_eq!(parse_declaration("border radius: 4px;"), None);
        assert_eq!(parse_declaration("z-index2: 1;"), None);
    }

    #[test]
    fn test_changed_lines_single_value() {
        assert_eq!(changed_lines(BOX_4, BOX_10), vec![1]);
        assert!(changed_lines(BOX_4, BOX_4).is_empty());
    }

    #[test]
    fn test_changed_lines_property_swap_not_flagged() {
        let before = ".box {\n  color: red;\n}";
        let after = ".box {\n  background: red;\n}";
        assert!(changed_lines(before, after).is_empty());
    }

    #[test]
    fn test_changed_lines_against_non_declaration() {
        let before = ".box {\n}";
        let after = ".box {\n  color: red;\n}";
        assert_eq!(changed_lines(before, after), vec![1]);
    }

    #[test]
    fn test_changed_lines_whitespace_only_difference() {
        let before = ".box {\n  color: red;\n}";
        let after = ".box {\n    color: red;  \n}";
        assert!(changed_lines(before, after).is_empty());
    }

    #[test]
    fn test_changed_lines_first_generation() {
        assert_eq!(changed_lines("", BOX_4), vec![1]);
    }

    #[test]
    fn test_changed_lines_is_positional() {
        // A new block shifts the old one down: its unchanged declaration is flagged,
        // while the new declaration at index 1 replaced a different property
        let before = ".a {\n  color: red;\n}";
        let after = ".b {\n  margin: 0;\n}\n\n.a {\n  color: red;\n}";
        assert_eq!(changed_lines(before, after), vec![5]);
    }

    #[test]
    fn test_flag_and_expire() {
        let start = Instant::now();
        let mut highlighter = Highlighter::default();

        assert_eq!(highlighter.compare_at(BOX_4, BOX_10, start), vec![1]);
        assert_eq!(highlighter.active_at(start), vec![1]);
        assert_eq!(highlighter.active_at(start + Duration::from_millis(1999)), vec![1]);
        assert!(highlighter.active_at(start + Duration::from_millis(2000)).is_empty());

        assert!(highlighter.expire(start + Duration::from_millis(1000)).is_empty());
        assert_eq!(highlighter.expire(start + Duration::from_millis(2000)), vec![1]);
        assert_eq!(highlighter.next_deadline(), None);
    }

    #[test]
    fn test_reflag_restarts_timer() {
        let start = Instant::now();
        let mut highlighter = Highlighter::default();

        highlighter.flag(3, start);
        highlighter.flag(3, start + Duration::from_millis(1500));

        assert!(highlighter.expire(start + Duration::from_millis(2000)).is_empty());
        assert_eq!(highlighter.active_at(start + Duration::from_millis(2000)), vec![3]);
        assert_eq!(highlighter.next_deadline(), Some(start + Duration::from_millis(3500)));
        assert_eq!(highlighter.expire(start + Duration::from_millis(3500)), vec![3]);
    }

    #[test]
    fn test_independent_deadlines() {
        let start = Instant::now();
        let mut highlighter = Highlighter::default();

        highlighter.flag(1, start);
        highlighter.flag(2, start + Duration::from_millis(500));

        assert_eq!(highlighter.next_deadline(), Some(start + Duration::from_millis(2000)));
        assert_eq!(highlighter.expire(start + Duration::from_millis(2000)), vec![1]);
        assert_eq!(highlighter.active_at(start + Duration::from_millis(2000)), vec![2]);
    }

    #[test]
    fn test_clear() {
        let start = Instant::now();
        let mut highlighter = Highlighter::default();
        highlighter.flag(1, start);
        highlighter.flag(4, start);

        highlighter.clear();
        assert!(highlighter.active_at(start).is_empty());
        assert_eq!(highlighter.next_deadline(), None);
    }

    #[test]
    fn test_custom_duration() {
        let start = Instant::now();
        let mut highlighter = Highlighter::new(Duration::from_millis(250));
        highlighter.flag(0, start);
        assert_eq!(highlighter.duration(), Duration::from_millis(250));
        assert!(highlighter.active_at(start + Duration::from_millis(250)).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_expiry() {
        let mut highlighter = Highlighter::default();
        highlighter.flag(1, Instant::now());
        tokio::time::advance(Duration::from_millis(800)).await;
        highlighter.flag(2, Instant::now());

        let started = Instant::now();
        assert_eq!(highlighter.wait_for_expiry().await, vec![1]);
        assert_eq!(started.elapsed(), Duration::from_millis(1200));
        assert_eq!(highlighter.wait_for_expiry().await, vec![2]);
        assert!(highlighter.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_expiry_pends_when_idle() {
        let mut highlighter = Highlighter::default();
        let waited = tokio::time::timeout(Duration::from_secs(60), highlighter.wait_for_expiry()).await;
        assert!(waited.is_err());
    }
}
