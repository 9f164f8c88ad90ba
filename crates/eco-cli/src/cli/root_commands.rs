use std::path::PathBuf;

use clap::{Args, Subcommand};
use eco_core::entities::TIME_SLOTS;
use eco_core::enums::Language;

use crate::cli::parse_language;
use crate::cli::subcommands::UserCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Classify a photo of a waste item.
    Scan(ScanArgs),
    /// Ask a spoken question from a recorded audio file.
    Voice(VoiceArgs),
    /// Ask a typed recycling question.
    Ask(AskArgs),
    /// Show the current result and recent history.
    Result,
    /// Find recyclers near the current location.
    Recyclers(RecyclersArgs),
    /// Show environmental impact statistics.
    Impact,
    /// Show the token wallet.
    Wallet,
    /// Redeem a reward code for tokens.
    Redeem(RedeemArgs),
    /// Schedule a recycler pickup.
    Pickup(PickupArgs),
    /// User identity management.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Show or change the saved answer language.
    Lang(LangArgs),
    /// Run several commands against one session, one per line.
    Shell,
}

#[derive(Clone, Debug, Args)]
pub struct ScanArgs {
    /// Image file (jpg, png, webp, heic, gif).
    pub image: PathBuf,

    /// Review the photo before it is submitted.
    #[arg(long)]
    pub preview: bool,

    /// Also look up recyclers for the detected material.
    #[arg(long)]
    pub nearby: bool,
}

#[derive(Clone, Debug, Args)]
pub struct VoiceArgs {
    /// Recorded audio used as the microphone input (webm, ogg, wav, mp3, m4a).
    pub audio: PathBuf,

    /// Stop recording after this many seconds.
    #[arg(long)]
    pub max_secs: Option<u64>,

    /// Also look up recyclers for the detected material.
    #[arg(long)]
    pub nearby: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AskArgs {
    /// Question text.
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,
}

impl AskArgs {
    #[must_use]
    pub fn query(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Clone, Debug, Args)]
pub struct RecyclersArgs {
    /// Material to match. Defaults to the current scan's material.
    #[arg(long)]
    pub material: Option<String>,

    /// Estimated weight in kilograms.
    #[arg(long)]
    pub weight_kg: Option<f64>,

    /// Maximum number of recyclers to list.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Args)]
pub struct RedeemArgs {
    /// Reward code.
    pub code: String,
}

#[derive(Clone, Debug, Args)]
pub struct PickupArgs {
    /// Recycler id from `ecosort recyclers`.
    #[arg(long)]
    pub recycler: String,

    /// Pickup date (YYYY-MM-DD).
    #[arg(long)]
    pub date: String,

    /// Pickup window.
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(TIME_SLOTS))]
    pub slot: String,

    /// Collection address.
    #[arg(long)]
    pub address: String,

    /// Extra instructions for the recycler.
    #[arg(long)]
    pub notes: Option<String>,

    /// Scan the pickup refers to. Defaults to the current scan.
    #[arg(long)]
    pub scan_id: Option<String>,

    /// Material being collected. Defaults to the current scan's material.
    #[arg(long)]
    pub material: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct LangArgs {
    /// New language (en, hi). Omit to show the saved one.
    #[arg(value_parser = parse_language)]
    pub language: Option<Language>,
}
