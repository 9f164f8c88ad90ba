use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::RecyclerCandidate;
use crate::enums::Provenance;

/// Resource savings attributed to recycling the scanned item.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EnvironmentalImpact {
    pub co2_saved_kg: f64,
    pub water_saved_liters: f64,
    pub landfill_saved_kg: f64,
}

/// The backend's structured answer to a capture or text query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScanResult {
    pub scan_id: Option<String>,
    pub material: String,
    /// Classifier confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Cleanliness in `0.0..=1.0`.
    pub cleanliness: f64,
    pub hazard_class: Option<String>,
    pub hazard_notes: Option<String>,
    pub disposal_instruction: String,
    pub cleaning_recommendation: Option<String>,
    pub route_summary: Option<String>,
    pub environmental_impact: Option<EnvironmentalImpact>,
    pub estimated_credits: u32,
    /// Nearby recyclers, best first.
    pub recyclers: Vec<RecyclerCandidate>,
    pub pickup_suggestions: Vec<String>,
    pub citations: Vec<String>,
    /// Speech-to-text output when the request was a voice clip.
    pub transcription: Option<String>,
}

impl ScanResult {
    #[must_use]
    pub fn is_hazardous(&self) -> bool {
        self.hazard_class
            .as_deref()
            .is_some_and(|class| class.trim().eq_ignore_ascii_case("hazardous"))
    }
}

/// A retrieved text fragment shown alongside a result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct KnowledgeSnippet {
    pub provenance: Provenance,
    pub title: Option<String>,
    pub content: String,
}

impl KnowledgeSnippet {
    /// First `max_chars` characters, with an ellipsis when truncated.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}
