//! Entity structs for backend results.
//!
//! These are the domain shapes after gateway normalization: optional wire
//! fields have already been defaulted, so presentation code never re-checks
//! them. All structs derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod impact;
mod pickup;
mod recycler;
mod scan;

pub use impact::{ImpactStats, Redemption, Wallet};
pub use pickup::{PickupConfirmation, PickupRequest, TIME_SLOTS};
pub use recycler::RecyclerCandidate;
pub use scan::{EnvironmentalImpact, KnowledgeSnippet, ScanResult};
