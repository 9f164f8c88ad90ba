use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Two-hour pickup windows offered by recyclers.
pub const TIME_SLOTS: [&str; 5] = [
    "08:00 - 10:00",
    "10:00 - 12:00",
    "12:00 - 14:00",
    "14:00 - 16:00",
    "16:00 - 18:00",
];

/// Request to have a recycler collect a scanned item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PickupRequest {
    pub identity_id: String,
    pub recycler_id: String,
    pub scan_id: Option<String>,
    pub material: Option<String>,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    pub time_slot: String,
    pub address: String,
    pub notes: Option<String>,
}

impl PickupRequest {
    /// Form fields in the order the backend expects; empty optionals are skipped.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("user_id", self.identity_id.clone()),
            ("recycler_id", self.recycler_id.clone()),
            ("date", self.date.clone()),
            ("time_slot", self.time_slot.clone()),
            ("address", self.address.clone()),
        ];
        let optional = [
            ("scan_id", &self.scan_id),
            ("material", &self.material),
            ("notes", &self.notes),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                fields.push((key, value.to_string()));
            }
        }
        fields
    }
}

/// Backend acknowledgement of a scheduled pickup.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PickupConfirmation {
    pub pickup_id: Option<String>,
    pub status: String,
    pub message: Option<String>,
}
