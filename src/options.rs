// src/options.rs
//! Export configuration: process-wide values with a per-sheet overlay.
//!
//! Options are threaded explicitly into the pipeline; there is no global
//! mutable store. A sheet carries a [`SheetOptions`] overlay; lookups resolve
//! through [`SheetOptions::resolve`], which distinguishes "explicitly
//! overridden on this sheet" from "inherited default".

/// Process-wide option values with their defaults.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Prompt for confirmation before overwriting an existing target.
    pub confirm_overwrite: bool,
    /// Sentinel text substituted for a cell whose computation failed.
    /// Empty string means "use the failure's own description".
    pub safe_error: String,
    /// Filetype used when the target path carries no extension.
    pub save_filetype: String,
    /// Field delimiter for delimited text output.
    pub delimiter: String,
    /// Row delimiter for delimited text output.
    pub row_delimiter: String,
    /// Replacement for the field delimiter when `safety_first` is on.
    pub tsv_safe_tab: String,
    /// Replacement for `\n` and `\r` when `safety_first` is on.
    pub tsv_safe_newline: String,
    /// Neutralize delimiter/newline/NUL characters inside saved values.
    pub safety_first: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            confirm_overwrite: true,
            safe_error: "#ERR".to_string(),
            save_filetype: "tsv".to_string(),
            delimiter: "\t".to_string(),
            row_delimiter: "\n".to_string(),
            tsv_safe_tab: "\\t".to_string(),
            tsv_safe_newline: "\\n".to_string(),
            safety_first: false,
        }
    }
}

/// Per-sheet overrides. `None` means "inherit the global value".
#[derive(Debug, Clone, Default)]
pub struct SheetOptions {
    pub save_filetype: Option<String>,
    pub delimiter: Option<String>,
    pub row_delimiter: Option<String>,
    pub tsv_safe_tab: Option<String>,
    pub tsv_safe_newline: Option<String>,
    pub safe_error: Option<String>,
}

impl SheetOptions {
    /// Combine this overlay with the global values into a read view.
    pub fn resolve<'a>(&'a self, global: &'a ExportOptions) -> ResolvedOptions<'a> {
        ResolvedOptions {
            overlay: self,
            global,
        }
    }
}

/// Read view over a sheet's overlay backed by the global defaults.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedOptions<'a> {
    overlay: &'a SheetOptions,
    global: &'a ExportOptions,
}

impl<'a> ResolvedOptions<'a> {
    pub fn safe_error(&self) -> &'a str {
        self.overlay
            .safe_error
            .as_deref()
            .unwrap_or(&self.global.safe_error)
    }

    pub fn save_filetype(&self) -> &'a str {
        self.overlay
            .save_filetype
            .as_deref()
            .unwrap_or(&self.global.save_filetype)
    }

    /// Whether `save_filetype` is explicitly overridden on this sheet,
    /// as opposed to inherited from the global default.
    pub fn save_filetype_is_set(&self) -> bool {
        self.overlay.save_filetype.is_some()
    }

    pub fn delimiter(&self) -> &'a str {
        self.overlay
            .delimiter
            .as_deref()
            .unwrap_or(&self.global.delimiter)
    }

    pub fn row_delimiter(&self) -> &'a str {
        self.overlay
            .row_delimiter
            .as_deref()
            .unwrap_or(&self.global.row_delimiter)
    }

    pub fn tsv_safe_tab(&self) -> &'a str {
        self.overlay
            .tsv_safe_tab
            .as_deref()
            .unwrap_or(&self.global.tsv_safe_tab)
    }

    pub fn tsv_safe_newline(&self) -> &'a str {
        self.overlay
            .tsv_safe_newline
            .as_deref()
            .unwrap_or(&self.global.tsv_safe_newline)
    }

    pub fn safety_first(&self) -> bool {
        self.global.safety_first
    }
}
