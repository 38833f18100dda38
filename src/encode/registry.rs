// src/encode/registry.rs
//! Encoder registration and dispatch.
//!
//! Encoders are plain functions sharing one signature: a target plus one or
//! more sheets. External format modules register themselves here at process
//! start; dispatch reads only. Lookup is two-tier (an override keyed by the
//! leading sheet's type tag wins over the global entry for a filetype), with
//! a documented fallback to the default filetype's global encoder.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ExportError, Result};
use crate::model::Sheet;
use crate::options::ExportOptions;
use crate::report::Reporter;
use crate::save::SaveTarget;

/// An encoder: serializes one or more sheets to a target location.
///
/// Last registered under a given key wins.
pub type EncoderFn = Arc<
    dyn Fn(&SaveTarget, &[Arc<Sheet>], &ExportOptions, &dyn Reporter) -> Result<()> + Send + Sync,
>;

/// Mapping from filetype tag to encoder, with a sheet-type override scope.
#[derive(Default)]
pub struct EncoderRegistry {
    by_sheet_type: RwLock<HashMap<(String, String), EncoderFn>>,
    global: RwLock<HashMap<String, EncoderFn>>,
}

impl EncoderRegistry {
    /// A registry with no encoders. Useful for tests and embedders that
    /// bring their own formats.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in encoders:
    /// `tsv`/`txt` (delimited text), `csv`, and `json`.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register("tsv", Arc::new(super::delimited::save_tsv));
        registry.register("txt", Arc::new(super::delimited::save_delimited));
        registry.register("csv", Arc::new(super::delimited::save_csv));
        registry.register("json", Arc::new(super::json::save_json));
        registry
    }

    /// Register the global encoder for `filetype`.
    pub fn register(&self, filetype: &str, encoder: EncoderFn) {
        self.global.write().insert(filetype.to_string(), encoder);
    }

    /// Register an encoder used only when the leading sheet carries
    /// `sheet_type` as its type tag.
    pub fn register_for_type(&self, sheet_type: &str, filetype: &str, encoder: EncoderFn) {
        self.by_sheet_type
            .write()
            .insert((sheet_type.to_string(), filetype.to_string()), encoder);
    }

    /// Resolve the encoder for one dispatch call.
    ///
    /// Order: sheet-type override for `filetype`, then the global entry for
    /// `filetype`, then (with a non-fatal warning) the global entry for the
    /// default filetype. A miss on all three is fatal: no output can be
    /// produced.
    pub fn resolve(
        &self,
        filetype: &str,
        lead_sheet_type: Option<&str>,
        options: &ExportOptions,
        reporter: &dyn Reporter,
    ) -> Result<EncoderFn> {
        if let Some(sheet_type) = lead_sheet_type {
            let key = (sheet_type.to_string(), filetype.to_string());
            if let Some(encoder) = self.by_sheet_type.read().get(&key) {
                return Ok(Arc::clone(encoder));
            }
        }

        if let Some(encoder) = self.global.read().get(filetype) {
            return Ok(Arc::clone(encoder));
        }

        let fallback = options.save_filetype.as_str();
        if let Some(encoder) = self.global.read().get(fallback) {
            reporter.warning(&format!(
                "save for {} unavailable, using {}",
                filetype, fallback
            ));
            return Ok(Arc::clone(encoder));
        }

        Err(ExportError::NoEncoder {
            filetype: filetype.to_string(),
        })
    }
}
