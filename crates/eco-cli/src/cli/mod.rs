use std::path::PathBuf;

use clap::Parser;
use eco_core::Coordinate;
use eco_core::enums::Language;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{ColorMode, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `ecosort` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ecosort",
    version,
    about = "ecosort - scan waste, learn how to dispose of it, earn tokens"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Colorize table output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer language for this invocation (en, hi)
    #[arg(long, global = true, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Latitude to report instead of the configured location
    #[arg(long, global = true, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to report instead of the configured location
    #[arg(long, global = true, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Do not read or write the saved session state
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Load environment overrides from this dotenv file
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            color: self.color,
            quiet: self.quiet,
            lang: self.lang,
            location: self
                .lat
                .zip(self.lon)
                .map(|(latitude, longitude)| Coordinate::new(latitude, longitude)),
            no_persist: self.no_persist,
            env_file: self.env_file.clone(),
        }
    }
}

pub fn parse_language(value: &str) -> Result<Language, String> {
    value.parse::<Language>().map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use eco_core::enums::Language;

    use super::{Cli, Commands, OutputFormat};
    use crate::cli::subcommands::UserCommands;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "ecosort", "--format", "json", "--lang", "hi", "--verbose", "impact",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.lang, Some(Language::Hi));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Impact));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["ecosort", "wallet", "--format", "raw", "--no-persist"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.no_persist);
        assert!(matches!(cli.command, Commands::Wallet));
    }

    #[test]
    fn invalid_format_is_rejected() {
        let result = Cli::try_parse_from(["ecosort", "--format", "xml", "impact"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_language_is_rejected() {
        let result = Cli::try_parse_from(["ecosort", "--lang", "fr", "impact"]);
        assert!(result.is_err());
    }

    #[test]
    fn latitude_requires_longitude() {
        assert!(Cli::try_parse_from(["ecosort", "--lat", "28.6", "impact"]).is_err());

        let cli = Cli::try_parse_from([
            "ecosort", "--lat", "-33.86", "--lon", "151.21", "recyclers",
        ])
        .expect("cli should parse");
        let location = cli.global_flags().location.expect("location set");
        assert!((location.latitude + 33.86).abs() < f64::EPSILON);
        assert!((location.longitude - 151.21).abs() < f64::EPSILON);
    }

    #[test]
    fn ask_joins_words() {
        let cli = Cli::try_parse_from(["ecosort", "ask", "is", "styrofoam", "recyclable?"])
            .expect("cli should parse");
        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.query(), "is styrofoam recyclable?");
    }

    #[test]
    fn user_register_requires_name_and_phone() {
        assert!(Cli::try_parse_from(["ecosort", "user", "register", "--name", "Asha"]).is_err());

        let cli = Cli::try_parse_from([
            "ecosort", "user", "register", "--name", "Asha", "--phone", "+911234567890",
        ])
        .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::User {
                action: UserCommands::Register(_)
            }
        ));
    }

    #[test]
    fn pickup_slot_must_be_offered() {
        let base = [
            "ecosort",
            "pickup",
            "--recycler",
            "rec-1",
            "--date",
            "2026-10-20",
            "--address",
            "12 Park Road",
            "--slot",
        ];
        let bad = base.iter().copied().chain(["09:00 - 11:00"]);
        assert!(Cli::try_parse_from(bad).is_err());

        let good = base.iter().copied().chain(["10:00 - 12:00"]);
        assert!(Cli::try_parse_from(good).is_ok());
    }
}
