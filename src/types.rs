//! Core data types for draws and their history.
//!
//! Numbers are carried as strings in the same form they are shown and
//! persisted: zero-padded decimal with a minimum width of 4.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum width of a formatted draw number.
pub const NUMBER_WIDTH: usize = 4;

/// Format a drawn value, left-padding with zeros to `NUMBER_WIDTH`.
/// Wider values are kept whole.
#[inline]
pub fn format_number(value: u32) -> String {
    format!("{value:0width$}", width = NUMBER_WIDTH)
}

/// Parse a formatted number back to its value, accepting only the canonical
/// form `format_number` would produce.
pub fn parse_number(number: &str) -> Option<u32> {
    let value: u32 = number.parse().ok()?;
    (format_number(value) == number).then_some(value)
}

/// One completed draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    pub number: String,
    /// Milliseconds since the Unix epoch, assigned at commit time.
    pub timestamp: u64,
}

impl WinRecord {
    pub fn new(number: impl Into<String>, timestamp: u64) -> Self {
        Self {
            number: number.into(),
            timestamp,
        }
    }
}

/// Past draws, newest first.
///
/// Numbers are unique in practice because the draw only produces values not
/// already present; the type itself does not check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<WinRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new history with `entry` in front of the existing records.
    pub fn prepend(&self, entry: WinRecord) -> Self {
        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.push(entry);
        records.extend(self.records.iter().cloned());
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent draw.
    pub fn latest(&self) -> Option<&WinRecord> {
        self.records.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WinRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[WinRecord] {
        &self.records
    }

    pub fn contains(&self, number: &str) -> bool {
        self.records.iter().any(|r| r.number == number)
    }

    /// Set view of every recorded number.
    pub fn numbers(&self) -> HashSet<&str> {
        self.records.iter().map(|r| r.number.as_str()).collect()
    }
}

impl From<Vec<WinRecord>> for History {
    fn from(records: Vec<WinRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a WinRecord;
    type IntoIter = std::slice::Iter<'a, WinRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_small_values() {
        assert_eq!(format_number(0), "0000");
        assert_eq!(format_number(7), "0007");
        assert_eq!(format_number(42), "0042");
        assert_eq!(format_number(999), "0999");
        assert_eq!(format_number(4999), "4999");
    }

    #[test]
    fn test_format_keeps_wide_values() {
        assert_eq!(format_number(10_000), "10000");
        assert_eq!(format_number(123_456), "123456");
    }

    #[test]
    fn test_parse_number_canonical_only() {
        assert_eq!(parse_number("0042"), Some(42));
        assert_eq!(parse_number("10000"), Some(10_000));
        assert_eq!(parse_number("42"), None);
        assert_eq!(parse_number("00042"), None);
        assert_eq!(parse_number("abcd"), None);
    }

    #[test]
    fn test_prepend_puts_entry_first() {
        let h = History::from(vec![WinRecord::new("0001", 1), WinRecord::new("0002", 2)]);
        let next = h.prepend(WinRecord::new("0003", 3));
        assert_eq!(next.len(), 3);
        assert_eq!(next.latest().map(|r| r.number.as_str()), Some("0003"));
        assert_eq!(&next.records()[1..], h.records());
        // original untouched
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_json_shape() {
        let h = History::from(vec![WinRecord::new("0042", 1000)]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"[{"number":"0042","timestamp":1000}]"#);
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn test_numbers_set() {
        let h = History::from(vec![WinRecord::new("0001", 1), WinRecord::new("0500", 2)]);
        let set = h.numbers();
        assert!(set.contains("0001"));
        assert!(set.contains("0500"));
        assert!(!set.contains("0002"));
        assert!(h.contains("0500"));
    }
}
