use clap::Parser;
use va_core::Language;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `valan` binary.
#[derive(Debug, Parser)]
#[command(
    name = "valan",
    version,
    about = "Value Analyst - upload annual reports, run analyses, read cited results"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL (overrides backend.base_url)
    #[arg(short, long, global = true)]
    pub backend: Option<String>,

    /// Message language: en, zh (overrides general.language)
    #[arg(long, global = true)]
    pub lang: Option<Language>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            backend: self.backend.clone(),
            lang: self.lang,
        }
    }
}
