// src/save/engine.rs
//! The save orchestrator.
//!
//! Given a target and one or more sheets, the engine resolves an encoder,
//! confirms destructive overwrites, and launches each encoder invocation as
//! an independent background task on the tokio runtime. It never waits for
//! an encoder to finish; the only synchronous suspension point is the
//! overwrite prompt, which must be answered before any task is launched.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::encode::{EncoderFn, EncoderRegistry};
use crate::error::{ExportError, Result};
use crate::model::Sheet;
use crate::options::ExportOptions;
use crate::report::{LogReporter, Reporter};

use super::target::SaveTarget;

/// Answers the overwrite prompt. Interactive layers block on the user here;
/// the default accepts everything (suitable for non-interactive embedding).
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Accepts every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Handles for the tasks one save call launched.
///
/// Dropping this detaches the tasks; they keep running on the pool. Await
/// [`join`][Self::join] to block until they all finish (tests and the CLI
/// do; an interactive foreground would not).
#[derive(Debug)]
pub struct LaunchedSave {
    handles: Vec<JoinHandle<()>>,
}

impl LaunchedSave {
    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every launched task to finish.
    pub async fn join(self) {
        for handle in self.handles {
            // A panicked encoder task was already reported by the task body;
            // join errors carry no further information we want.
            let _ = handle.await;
        }
    }
}

/// Orchestrates save calls: encoder resolution, overwrite confirmation,
/// single-output vs fan-out, task launch.
pub struct SaveEngine {
    registry: EncoderRegistry,
    options: ExportOptions,
    reporter: Arc<dyn Reporter>,
    confirmer: Arc<dyn Confirmer>,
}

impl SaveEngine {
    /// Engine with the built-in encoders, logging reporter, and an
    /// accept-everything confirmer.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            registry: EncoderRegistry::with_builtins(),
            options,
            reporter: Arc::new(LogReporter),
            confirmer: Arc::new(AssumeYes),
        }
    }

    pub fn with_registry(mut self, registry: EncoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    /// Save all given sheets to `target`.
    ///
    /// A target without a directory marker gets exactly one task carrying
    /// every sheet. A target with a directory marker gets one task per
    /// sheet at `<dir>/<sheet-name>.<filetype>`. Each sheet's `modified`
    /// flag is cleared as soon as its task is launched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn save_sheets(&self, target: &SaveTarget, sheets: &[Arc<Sheet>]) -> Result<LaunchedSave> {
        let filetype = target
            .ext()
            .unwrap_or_else(|| self.options.save_filetype.clone());

        let lead_type = sheets.first().and_then(|s| s.type_tag());
        let encoder =
            self.registry
                .resolve(&filetype, lead_type, &self.options, self.reporter.as_ref())?;

        if target.exists() && self.options.confirm_overwrite {
            let prompt = format!("{} already exists. overwrite? ", target.given());
            if !self.confirmer.confirm(&prompt) {
                self.reporter
                    .status(&format!("save to {} cancelled", target));
                return Err(ExportError::Cancelled(target.path().to_path_buf()));
            }
        }

        self.reporter.status(&format!(
            "saving {} sheets to {} as {}",
            sheets.len(),
            target,
            filetype
        ));

        if !target.has_dir_marker() {
            let handle = self.launch(Arc::clone(&encoder), target.clone(), sheets.to_vec());
            for sheet in sheets {
                sheet.clear_modified();
            }
            return Ok(LaunchedSave {
                handles: vec![handle],
            });
        }

        // Fan-out: one file per sheet inside the target directory.
        // create_dir_all already tolerates an existing directory; any other
        // failure surfaces through the not-a-directory check below.
        let _ = fs::create_dir_all(target.path());
        if !target.is_dir() {
            return Err(ExportError::NotADirectory(target.path().to_path_buf()));
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut handles = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let count = seen.entry(sheet.name()).or_insert(0);
            let file_name = if *count == 0 {
                sheet.name().to_string()
            } else {
                let disambiguated = format!("{}_{}", sheet.name(), count);
                self.reporter.warning(&format!(
                    "duplicate sheet name '{}', saving as {}",
                    sheet.name(),
                    disambiguated
                ));
                disambiguated
            };
            *count += 1;

            let file = target.join_file(&file_name, &filetype);
            handles.push(self.launch(Arc::clone(&encoder), file, vec![Arc::clone(sheet)]));
            sheet.clear_modified();
        }

        Ok(LaunchedSave { handles })
    }

    fn launch(
        &self,
        encoder: EncoderFn,
        target: SaveTarget,
        sheets: Vec<Arc<Sheet>>,
    ) -> JoinHandle<()> {
        let options = self.options.clone();
        let reporter = Arc::clone(&self.reporter);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = encoder(&target, &sheets, &options, reporter.as_ref()) {
                reporter.error(&format!("save to {} failed: {}", target, e));
            }
        })
    }
}
