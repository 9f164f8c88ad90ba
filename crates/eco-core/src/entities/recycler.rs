use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

/// A ranked recycler near the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RecyclerCandidate {
    pub id: Option<String>,
    pub name: String,
    pub distance_km: f64,
    pub score: f64,
    pub materials_accepted: Vec<String>,
    /// Map position; candidates without one are listed but not plotted.
    pub location: Option<Coordinate>,
}

impl RecyclerCandidate {
    /// Case-insensitive check against the accepted materials list.
    #[must_use]
    pub fn accepts(&self, material: &str) -> bool {
        self.materials_accepted
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(material))
    }
}
