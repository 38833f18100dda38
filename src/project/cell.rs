// src/project/cell.rs
//! The per-cell value pipeline: extraction → coercion → formatting →
//! scrubbing, with stage-wise fault containment.
//!
//! The central invariant of the whole export core lives here: no single
//! cell's failure may abort the export of any other cell, row, or sheet.
//! Every stage failure is caught and collapsed into text.

use crate::model::{CellError, Column, ColumnType, Row, TypedValue};

use super::sanitize::Scrubber;
use super::ProjectMode;

/// The outcome of running one cell through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOut {
    /// The getter found no value. Only produced in typed mode; display mode
    /// renders absence as an empty string.
    Absent,
    /// A typed value (typed mode only).
    Typed(TypedValue),
    /// Display text, or the textual fallback for a failed stage.
    Text(String),
    /// Sentinel for an extraction failure. Exempt from later stages by
    /// construction: it is produced after the pipeline has stopped.
    Error(String),
}

impl CellOut {
    /// The string an encoder writes for this cell in display mode.
    pub fn display(&self) -> &str {
        match self {
            Self::Absent => "",
            Self::Text(s) | Self::Error(s) => s,
            // Typed values only appear in typed-mode projections; display
            // projections always collapse to Text.
            Self::Typed(_) => "",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Sentinel text for a failed extraction: the configured `safe_error` when
/// non-empty, else the failure's own description.
fn sentinel(safe_error: &str, err: &CellError) -> String {
    if safe_error.is_empty() {
        err.to_string()
    } else {
        safe_error.to_string()
    }
}

/// Run one cell through the pipeline. Infallible: every failure is contained.
pub fn project_cell(
    column: &Column,
    row: &Row,
    mode: ProjectMode,
    scrubber: &Scrubber,
    safe_error: &str,
) -> CellOut {
    // Stage 1: extraction. Failure stops the pipeline for this cell.
    let raw = match column.get_raw(row) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            return match mode {
                ProjectMode::Display => CellOut::Text(String::new()),
                ProjectMode::Typed => CellOut::Absent,
            };
        }
        Err(e) => {
            log::debug!("cell error in column '{}': {}", column.name(), e);
            return CellOut::Error(sentinel(safe_error, &e));
        }
    };

    // Stage 2: type coercion. Failure collapses to the raw value's text.
    let typed = match column.ctype().coerce(&raw) {
        Ok(typed) => typed,
        Err(_) => return CellOut::Text(ColumnType::raw_text(&raw)),
    };

    match mode {
        ProjectMode::Typed => match typed {
            // Scrubbing applies to text; other types have nothing to scrub.
            TypedValue::Text(s) if scrubber.is_active() => {
                CellOut::Typed(TypedValue::Text(scrubber.apply(&s).into_owned()))
            }
            other => CellOut::Typed(other),
        },
        ProjectMode::Display => {
            // Stage 3: formatting. Failure collapses to the typed value's text.
            let text = match column.format(&typed) {
                Ok(text) => text,
                Err(_) => return CellOut::Text(typed.to_string()),
            };
            // Stage 4: scrubbing.
            CellOut::Text(scrubber.apply(&text).into_owned())
        }
    }
}
