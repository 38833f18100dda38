// src/main.rs

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};

use sheetport::{
    load_delimited, save_cols, save_sheet, Confirmer, ExportOptions, SaveEngine, SaveTarget, Sheet,
};

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineInput {
    /// Delimited input file to load
    input: PathBuf,

    /// Output target; end with '/' to save one file per sheet into a directory
    output: String,

    /// Default save filetype when the target has no extension
    #[arg(long)]
    filetype: Option<String>,

    /// Field delimiter for delimited text (default: tab)
    #[arg(long)]
    delimiter: Option<String>,

    /// Row delimiter for delimited text (default: newline)
    #[arg(long)]
    row_delimiter: Option<String>,

    /// Sentinel text for cells whose computation failed
    #[arg(long)]
    safe_error: Option<String>,

    /// Neutralize delimiter/newline/NUL characters inside saved values
    #[arg(long, default_value_t = false)]
    safety_first: bool,

    /// Overwrite existing targets without asking
    #[arg(short, long, default_value_t = false)]
    force: bool,

    /// Treat the input's first line as data, not column names
    #[arg(long, default_value_t = false)]
    no_header: bool,

    /// Save only the named columns (comma-separated)
    #[arg(long)]
    columns: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl CommandLineInput {
    /// Resolve the CLI flags into the export options context.
    fn resolve_options(&self) -> ExportOptions {
        let mut options = ExportOptions {
            confirm_overwrite: !self.force,
            safety_first: self.safety_first,
            ..Default::default()
        };
        if let Some(ft) = &self.filetype {
            options.save_filetype = ft.clone();
        }
        if let Some(d) = &self.delimiter {
            options.delimiter = d.clone();
        }
        if let Some(d) = &self.row_delimiter {
            options.row_delimiter = d.clone();
        }
        if let Some(s) = &self.safe_error {
            options.safe_error = s.clone();
        }
        options
    }
}

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("sheetport.log");

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Blocks on stdin for a yes/no answer.
struct ConsoleConfirmer;

impl Confirmer for ConsoleConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{}[y/N] ", prompt);
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

/// Column names → indices, preserving the requested order.
fn column_indices(sheet: &Sheet, names: &str) -> anyhow::Result<Vec<usize>> {
    names
        .split(',')
        .map(str::trim)
        .map(|name| {
            sheet
                .columns()
                .iter()
                .position(|c| c.name() == name)
                .with_context(|| format!("no column named '{}'", name))
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();
    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("logging setup failed: {}", e))?;

    let options = cli.resolve_options();
    let sheet = load_delimited(&cli.input, &options, !cli.no_header)?;
    sheet.mark_modified();

    let engine = SaveEngine::new(options).with_confirmer(Arc::new(ConsoleConfirmer));
    let target = SaveTarget::new(&cli.output);

    let launched = if let Some(names) = &cli.columns {
        let indices = column_indices(&sheet, names)?;
        save_cols(&engine, &sheet, &indices, &target)
    } else {
        save_sheet(&engine, &Arc::new(sheet), &target)
    };

    match launched {
        Ok(launched) => {
            launched.join().await;
            Ok(())
        }
        // Declining the overwrite prompt is a deliberate abort, not a failure.
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
