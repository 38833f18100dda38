// src/project/mod.rs
//! Row projection: drives the per-cell value pipeline across a sheet.
//!
//! A projector is a lazy, single-pass iterator: one record per row, exactly
//! one cell per selected column, in column order. Construct a fresh projector
//! to restart. Large sheets stream through without buffering, so callers can
//! layer their own progress reporting on top of the iteration.

mod cell;
mod sanitize;

pub use cell::{project_cell, CellOut};
pub use sanitize::Scrubber;

use crate::model::{Column, Row, Sheet};
use crate::options::ExportOptions;

/// Whether projected cells stay typed or are rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectMode {
    /// Cells keep their coerced type; absent stays absent.
    Typed,
    /// Cells become display strings; absent becomes the empty string.
    Display,
}

/// Lazy sequence of per-row records over a fixed column selection.
pub struct RowProjector<'a> {
    columns: Vec<&'a Column>,
    rows: &'a [Row],
    mode: ProjectMode,
    scrubber: Scrubber,
    safe_error: String,
    next: usize,
}

impl<'a> RowProjector<'a> {
    /// Project the sheet's currently visible columns.
    pub fn over_visible(sheet: &'a Sheet, mode: ProjectMode, global: &ExportOptions) -> Self {
        Self::over_columns(sheet, sheet.visible_columns(), mode, global)
    }

    /// Project an explicit column selection. The set is fixed before
    /// iteration begins.
    pub fn over_columns(
        sheet: &'a Sheet,
        columns: Vec<&'a Column>,
        mode: ProjectMode,
        global: &ExportOptions,
    ) -> Self {
        let resolved = sheet.options().resolve(global);
        Self {
            columns,
            rows: sheet.rows(),
            mode,
            scrubber: Scrubber::from_options(&resolved),
            safe_error: resolved.safe_error().to_string(),
            next: 0,
        }
    }

    /// The selected columns, in record order.
    pub fn columns(&self) -> &[&'a Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for RowProjector<'_> {
    /// One cell per selected column, in selection order.
    type Item = Vec<CellOut>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.next)?;
        self.next += 1;
        Some(
            self.columns
                .iter()
                .map(|col| project_cell(col, row, self.mode, &self.scrubber, &self.safe_error))
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows.len() - self.next;
        (remaining, Some(remaining))
    }
}
