use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cumulative environmental impact and token totals for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ImpactStats {
    pub total_scans: u64,
    pub tokens_earned: u64,
    pub tokens_balance: u64,
    pub total_co2_saved_kg: f64,
    pub total_water_saved_liters: f64,
    pub total_landfill_saved_kg: f64,
}

/// Token wallet as reported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Wallet {
    pub user_id: String,
    pub balance: u64,
    pub total_earned: u64,
}

/// Outcome of a successful code redemption.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Redemption {
    pub code: String,
    pub tokens_awarded: u64,
    pub message: Option<String>,
}
