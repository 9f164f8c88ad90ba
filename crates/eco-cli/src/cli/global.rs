use std::path::PathBuf;

use clap::ValueEnum;
use eco_core::Coordinate;
use eco_core::enums::Language;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Raw,
}

/// When to colorize table cells.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub color: ColorMode,
    pub quiet: bool,
    /// Language for this invocation only; `ecosort lang` changes the saved one.
    pub lang: Option<Language>,
    /// Fixed position that replaces the configured location source.
    pub location: Option<Coordinate>,
    pub no_persist: bool,
    pub env_file: Option<PathBuf>,
}
