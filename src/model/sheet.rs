// src/model/sheet.rs
//! Sheets and rows.
//!
//! A sheet is an ordered set of columns over an ordered snapshot of rows.
//! Rows are opaque positional records: they carry no meaning except through
//! the owning sheet's columns. The export pipeline treats both as immutable
//! for the duration of one save; the only mutation it performs is clearing
//! the `modified` flag once a save task has been launched, which goes
//! through an atomic so launched tasks and the foreground never race on a
//! plain bool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::options::SheetOptions;

use super::column::{Column, Raw};
use super::source::SheetSource;

/// An opaque positional record, interpreted only through columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Vec<Raw>);

impl Row {
    pub fn new(cells: Vec<Raw>) -> Self {
        Self(cells)
    }

    pub fn cell(&self, index: usize) -> Option<&Raw> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Raw>> for Row {
    fn from(cells: Vec<Raw>) -> Self {
        Self(cells)
    }
}

/// An in-memory table with display/save configuration.
#[derive(Debug)]
pub struct Sheet {
    name: String,
    source: SheetSource,
    /// Format this sheet was loaded as; feeds the default save name.
    filetype: Option<String>,
    /// Tag consulted by the encoder registry for sheet-type-specific
    /// encoder overrides.
    type_tag: Option<String>,
    columns: Vec<Column>,
    rows: Arc<Vec<Row>>,
    options: SheetOptions,
    modified: AtomicBool,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: SheetSource::Unset,
            filetype: None,
            type_tag: None,
            columns: Vec::new(),
            rows: Arc::new(Vec::new()),
            options: SheetOptions::default(),
            modified: AtomicBool::new(false),
        }
    }

    pub fn with_source(mut self, source: SheetSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.filetype = Some(filetype.into());
        self
    }

    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_tag = Some(tag.into());
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = Arc::new(rows);
        self
    }

    pub fn with_options(mut self, options: SheetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &SheetSource {
        &self.source
    }

    pub fn filetype(&self) -> Option<&str> {
        self.filetype.as_deref()
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The columns a default export selects, in sheet order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_visible()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SheetOptions {
        &mut self.options
    }

    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::Acquire)
    }

    pub fn mark_modified(&self) {
        self.modified.store(true, Ordering::Release);
    }

    /// Marks "save initiated". Called by the orchestrator right after a save
    /// task is launched, not when it completes.
    pub fn clear_modified(&self) {
        self.modified.store(false, Ordering::Release);
    }

    /// Derived sheet keeping only the columns at `indices`, sharing this
    /// sheet's row snapshot. Used by the save-columns command.
    pub fn with_column_subset(&self, indices: &[usize]) -> Self {
        let columns = indices
            .iter()
            .filter_map(|&i| self.columns.get(i).cloned())
            .collect();
        Self {
            name: self.name.clone(),
            source: self.source.clone(),
            filetype: self.filetype.clone(),
            type_tag: self.type_tag.clone(),
            columns,
            rows: Arc::clone(&self.rows),
            options: self.options.clone(),
            modified: AtomicBool::new(self.is_modified()),
        }
    }
}

impl Clone for Sheet {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            source: self.source.clone(),
            filetype: self.filetype.clone(),
            type_tag: self.type_tag.clone(),
            columns: self.columns.clone(),
            rows: Arc::clone(&self.rows),
            options: self.options.clone(),
            modified: AtomicBool::new(self.is_modified()),
        }
    }
}
