// src/project/sanitize.rs
//! Character scrubbing for values headed into delimited text output.
//!
//! Built once per export call and reused for every cell of every selected
//! column. When `safety_first` is off the table is empty and [`Scrubber::apply`]
//! returns its input unchanged.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::options::ResolvedOptions;

/// Substitution table keyed by character: NUL is stripped, the sheet's field
/// delimiter and both newline variants become their configured substitutes.
#[derive(Debug, Clone, Default)]
pub struct Scrubber {
    table: HashMap<char, String>,
}

impl Scrubber {
    /// Build the table for one sheet. Empty (no-op) unless `safety_first`.
    pub fn from_options(opts: &ResolvedOptions<'_>) -> Self {
        if !opts.safety_first() {
            return Self::default();
        }

        let mut table = HashMap::new();
        table.insert('\0', String::new());
        for c in opts.delimiter().chars() {
            table.insert(c, opts.tsv_safe_tab().to_string());
        }
        table.insert('\n', opts.tsv_safe_newline().to_string());
        table.insert('\r', opts.tsv_safe_newline().to_string());
        Self { table }
    }

    pub fn is_active(&self) -> bool {
        !self.table.is_empty()
    }

    /// Substitute every mapped character; borrows when nothing changes.
    pub fn apply<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if !self.is_active() || !s.chars().any(|c| self.table.contains_key(&c)) {
            return Cow::Borrowed(s);
        }
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match self.table.get(&c) {
                Some(replacement) => out.push_str(replacement),
                None => out.push(c),
            }
        }
        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ExportOptions, SheetOptions};

    fn scrubber(safety_first: bool) -> Scrubber {
        let global = ExportOptions {
            safety_first,
            ..Default::default()
        };
        let overlay = SheetOptions::default();
        Scrubber::from_options(&overlay.resolve(&global))
    }

    #[test]
    fn inactive_when_safety_off() {
        let s = scrubber(false);
        assert!(!s.is_active());
        assert_eq!(s.apply("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn strips_nul_and_replaces_delimiter_and_newlines() {
        let s = scrubber(true);
        assert_eq!(s.apply("a\0b"), "ab");
        assert_eq!(s.apply("a\tb"), "a\\tb");
        assert_eq!(s.apply("a\nb\rc"), "a\\nb\\nc");
    }

    #[test]
    fn untouched_values_are_borrowed() {
        let s = scrubber(true);
        assert!(matches!(s.apply("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn sheet_delimiter_override_controls_table() {
        let global = ExportOptions {
            safety_first: true,
            ..Default::default()
        };
        let overlay = SheetOptions {
            delimiter: Some(",".to_string()),
            ..Default::default()
        };
        let s = Scrubber::from_options(&overlay.resolve(&global));
        assert_eq!(s.apply("a,b"), "a\\tb");
        // The global tab is no longer the active delimiter.
        assert_eq!(s.apply("a\tb"), "a\tb");
    }
}
