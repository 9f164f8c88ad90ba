//! Backend JSON shapes and their conversion into domain entities.
//!
//! Every wire field is optional. Defaults are substituted here, once, so the
//! session and presentation layers work with fully populated entities.

use eco_core::entities::{
    EnvironmentalImpact, ImpactStats, KnowledgeSnippet, PickupConfirmation, RecyclerCandidate,
    Redemption, ScanResult, Wallet,
};
use eco_core::enums::Provenance;
use eco_core::{Coordinate, Identity};
use serde::Deserialize;
use serde_json::Value;

use crate::ScanResponse;

/// Material label used when the classifier returned none.
pub const UNKNOWN_MATERIAL: &str = "Unknown";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireScan {
    scan_id: Option<String>,
    material: Option<String>,
    confidence: Option<f64>,
    cleanliness_score: Option<f64>,
    hazard_class: Option<String>,
    hazard_notes: Option<String>,
    disposal_instruction: Option<String>,
    cleaning_recommendation: Option<String>,
    route_summary: Option<String>,
    environmental_impact: Option<WireImpact>,
    co2_saved_kg: Option<f64>,
    water_saved_liters: Option<f64>,
    landfill_saved_kg: Option<f64>,
    estimated_credits: Option<f64>,
    recycler_ranking: Option<Vec<WireRankingEntry>>,
    pickup_suggestions: Option<Vec<String>>,
    citations: Option<Vec<Value>>,
    transcription: Option<String>,
    transcribed_text: Option<String>,
    global_docs: Option<Vec<WireDoc>>,
    personal_docs: Option<Vec<WireDoc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireImpact {
    co2_saved_kg: Option<f64>,
    water_saved_liters: Option<f64>,
    landfill_saved_kg: Option<f64>,
}

/// Ranking entries are structured objects, or plain lines when the backend
/// fell back to text parsing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireRankingEntry {
    Structured(WireRecycler),
    Line(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireRecycler {
    recycler_id: Option<String>,
    id: Option<String>,
    #[serde(rename = "_id")]
    object_id: Option<String>,
    recycler_name: Option<String>,
    name: Option<String>,
    distance_km: Option<f64>,
    total_score: Option<f64>,
    score: Option<f64>,
    materials_accepted: Option<Vec<String>>,
    location_lat: Option<f64>,
    location_lon: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireDoc {
    title: Option<String>,
    content: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireNearby {
    Wrapped { recyclers: Vec<WireRankingEntry> },
    Bare(Vec<WireRankingEntry>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireImpactStats {
    total_scans: Option<f64>,
    tokens_earned: Option<f64>,
    tokens_balance: Option<f64>,
    total_co2_saved_kg: Option<f64>,
    total_water_saved_liters: Option<f64>,
    total_landfill_saved_kg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireWallet {
    user_id: Option<String>,
    balance: Option<f64>,
    tokens_balance: Option<f64>,
    total_earned: Option<f64>,
    tokens_earned: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireRedemption {
    tokens_awarded: Option<f64>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireRegistered {
    user_id: Option<String>,
    phone: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireProfile {
    #[serde(rename = "_id")]
    object_id: Option<String>,
    id: Option<String>,
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WirePickup {
    pickup_id: Option<String>,
    #[serde(rename = "_id")]
    object_id: Option<String>,
    status: Option<String>,
    message: Option<String>,
}

// ── Conversions ────────────────────────────────────────────────────

/// Normalize a score to `0.0..=1.0`, treating values above one as percentages.
fn unit_score(value: Option<f64>) -> f64 {
    let value = value.filter(|v| v.is_finite()).unwrap_or(0.0);
    let value = if value > 1.0 { value / 100.0 } else { value };
    value.clamp(0.0, 1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: Option<f64>) -> u64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v.round() as u64)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn finite(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl WireRecycler {
    fn into_domain(self) -> RecyclerCandidate {
        let latitude = self.location_lat.or(self.lat);
        let longitude = self.location_lon.or(self.lon);
        let location = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)).filter(Coordinate::is_valid),
            _ => None,
        };
        RecyclerCandidate {
            id: non_blank(self.recycler_id)
                .or_else(|| non_blank(self.id))
                .or_else(|| non_blank(self.object_id)),
            name: non_blank(self.recycler_name)
                .or_else(|| non_blank(self.name))
                .unwrap_or_else(|| "Unnamed recycler".to_string()),
            distance_km: finite(self.distance_km).max(0.0),
            score: finite(self.total_score.or(self.score)),
            materials_accepted: self.materials_accepted.unwrap_or_default(),
            location,
        }
    }
}

impl WireRankingEntry {
    pub(crate) fn into_domain(self) -> Option<RecyclerCandidate> {
        match self {
            Self::Structured(recycler) => Some(recycler.into_domain()),
            Self::Line(line) => {
                let name = line.trim().trim_start_matches(['-', '*', ' ']).trim();
                (!name.is_empty()).then(|| RecyclerCandidate {
                    name: name.to_string(),
                    ..RecyclerCandidate::default()
                })
            }
        }
    }
}

impl WireNearby {
    pub(crate) fn into_domain(self) -> Vec<RecyclerCandidate> {
        let entries = match self {
            Self::Wrapped { recyclers } | Self::Bare(recyclers) => recyclers,
        };
        entries
            .into_iter()
            .filter_map(WireRankingEntry::into_domain)
            .collect()
    }
}

fn snippets(docs: Option<Vec<WireDoc>>, provenance: Provenance) -> Vec<KnowledgeSnippet> {
    docs.unwrap_or_default()
        .into_iter()
        .filter_map(|doc| {
            let content = non_blank(doc.content).or_else(|| non_blank(doc.text))?;
            Some(KnowledgeSnippet {
                provenance,
                title: non_blank(doc.title),
                content,
            })
        })
        .collect()
}

fn citation_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => non_blank(Some(text)),
        Value::Object(map) => ["title", "source", "url", "content"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

impl WireScan {
    pub(crate) fn into_domain(self) -> ScanResponse {
        let impact = match self.environmental_impact {
            Some(nested) => Some(EnvironmentalImpact {
                co2_saved_kg: finite(nested.co2_saved_kg),
                water_saved_liters: finite(nested.water_saved_liters),
                landfill_saved_kg: finite(nested.landfill_saved_kg),
            }),
            None if self.co2_saved_kg.is_some()
                || self.water_saved_liters.is_some()
                || self.landfill_saved_kg.is_some() =>
            {
                Some(EnvironmentalImpact {
                    co2_saved_kg: finite(self.co2_saved_kg),
                    water_saved_liters: finite(self.water_saved_liters),
                    landfill_saved_kg: finite(self.landfill_saved_kg),
                })
            }
            None => None,
        };

        let credits = u32::try_from(count(self.estimated_credits)).unwrap_or(u32::MAX);

        let mut knowledge = snippets(self.global_docs, Provenance::Global);
        knowledge.extend(snippets(self.personal_docs, Provenance::Personal));

        let result = ScanResult {
            scan_id: non_blank(self.scan_id),
            material: non_blank(self.material).unwrap_or_else(|| UNKNOWN_MATERIAL.to_string()),
            confidence: unit_score(self.confidence),
            cleanliness: unit_score(self.cleanliness_score),
            hazard_class: non_blank(self.hazard_class),
            hazard_notes: non_blank(self.hazard_notes),
            disposal_instruction: non_blank(self.disposal_instruction).unwrap_or_default(),
            cleaning_recommendation: non_blank(self.cleaning_recommendation),
            route_summary: non_blank(self.route_summary),
            environmental_impact: impact,
            estimated_credits: credits,
            recyclers: self
                .recycler_ranking
                .unwrap_or_default()
                .into_iter()
                .filter_map(WireRankingEntry::into_domain)
                .collect(),
            pickup_suggestions: self
                .pickup_suggestions
                .unwrap_or_default()
                .into_iter()
                .filter_map(|s| non_blank(Some(s)))
                .collect(),
            citations: self
                .citations
                .unwrap_or_default()
                .into_iter()
                .filter_map(citation_text)
                .collect(),
            transcription: non_blank(self.transcription).or_else(|| non_blank(self.transcribed_text)),
        };

        ScanResponse {
            result,
            snippets: knowledge,
        }
    }
}

impl WireImpactStats {
    pub(crate) fn into_domain(self) -> ImpactStats {
        ImpactStats {
            total_scans: count(self.total_scans),
            tokens_earned: count(self.tokens_earned),
            tokens_balance: count(self.tokens_balance),
            total_co2_saved_kg: finite(self.total_co2_saved_kg),
            total_water_saved_liters: finite(self.total_water_saved_liters),
            total_landfill_saved_kg: finite(self.total_landfill_saved_kg),
        }
    }
}

impl WireWallet {
    pub(crate) fn into_domain(self, requested_user: &str) -> Wallet {
        Wallet {
            user_id: non_blank(self.user_id).unwrap_or_else(|| requested_user.to_string()),
            balance: count(self.balance.or(self.tokens_balance)),
            total_earned: count(self.total_earned.or(self.tokens_earned)),
        }
    }
}

impl WireRedemption {
    pub(crate) fn into_domain(self, code: &str) -> Redemption {
        Redemption {
            code: code.to_string(),
            tokens_awarded: count(self.tokens_awarded),
            message: non_blank(self.message),
        }
    }
}

impl WireRegistered {
    pub(crate) fn into_domain(self, contact: &str) -> Option<eco_core::identity::RegisteredUser> {
        Some(eco_core::identity::RegisteredUser {
            id: non_blank(self.user_id)?,
            contact: non_blank(self.phone).unwrap_or_else(|| contact.to_string()),
            message: non_blank(self.message)
                .unwrap_or_else(|| "User registered successfully".to_string()),
        })
    }
}

impl WireProfile {
    pub(crate) fn into_domain(self, requested_user: &str) -> Identity {
        Identity {
            id: non_blank(self.object_id)
                .or_else(|| non_blank(self.id))
                .unwrap_or_else(|| requested_user.to_string()),
            display_name: non_blank(self.name).unwrap_or_default(),
            contact: non_blank(self.phone)
                .or_else(|| non_blank(self.email))
                .unwrap_or_default(),
        }
    }
}

impl WirePickup {
    pub(crate) fn into_domain(self) -> PickupConfirmation {
        PickupConfirmation {
            pickup_id: non_blank(self.pickup_id).or_else(|| non_blank(self.object_id)),
            status: non_blank(self.status).unwrap_or_else(|| "scheduled".to_string()),
            message: non_blank(self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCAN_FIXTURE: &str = r#"{
        "scan_id": "scn-42",
        "material": "Plastic",
        "confidence": 0.92,
        "cleanliness_score": 80,
        "hazard_class": "hazardous",
        "hazard_notes": "Contains residue of solvent.",
        "disposal_instruction": "Seal and hand over at a collection point.",
        "environmental_impact": {
            "co2_saved_kg": 1.5,
            "water_saved_liters": 20,
            "landfill_saved_kg": 0.3
        },
        "estimated_credits": 15,
        "recycler_ranking": [
            {
                "recycler_id": "rcy-1",
                "recycler_name": "Green Loop",
                "distance_km": 1.24,
                "total_score": 8.7,
                "materials_accepted": ["Plastic", "Glass"],
                "location_lat": 28.62,
                "location_lon": 77.21
            },
            "- Kabadiwala on MG Road"
        ],
        "global_docs": [{"title": "MCD rules", "content": "Segregate dry waste."}],
        "personal_docs": [{"content": "You scanned 3 PET bottles last week."}, {"content": "  "}],
        "citations": ["MCD 2024", {"title": "SWM Rules 2016"}, 7]
    }"#;

    #[test]
    fn converts_full_scan_fixture() {
        let wire: WireScan = serde_json::from_str(SCAN_FIXTURE).unwrap();
        let response = wire.into_domain();
        let result = &response.result;

        assert_eq!(result.scan_id.as_deref(), Some("scn-42"));
        assert_eq!(result.material, "Plastic");
        assert!((result.confidence - 0.92).abs() < 1e-9);
        assert!((result.cleanliness - 0.8).abs() < 1e-9);
        assert!(result.is_hazardous());
        assert_eq!(result.estimated_credits, 15);
        assert_eq!(result.recyclers.len(), 2);
        assert_eq!(result.recyclers[0].name, "Green Loop");
        assert_eq!(result.recyclers[0].location, Some(Coordinate::new(28.62, 77.21)));
        assert_eq!(result.recyclers[1].name, "Kabadiwala on MG Road");
        assert_eq!(result.recyclers[1].location, None);
        assert_eq!(result.citations, ["MCD 2024", "SWM Rules 2016"]);

        assert_eq!(response.snippets.len(), 2);
        assert_eq!(response.snippets[0].provenance, Provenance::Global);
        assert_eq!(response.snippets[0].title.as_deref(), Some("MCD rules"));
        assert_eq!(response.snippets[1].provenance, Provenance::Personal);
    }

    #[test]
    fn empty_object_gets_defaults() {
        let wire: WireScan = serde_json::from_str("{}").unwrap();
        let response = wire.into_domain();
        assert_eq!(response.result.material, UNKNOWN_MATERIAL);
        assert_eq!(response.result.confidence, 0.0);
        assert_eq!(response.result.estimated_credits, 0);
        assert!(response.result.environmental_impact.is_none());
        assert!(response.snippets.is_empty());
    }

    #[test]
    fn nulls_are_treated_as_missing() {
        let wire: WireScan = serde_json::from_str(
            r#"{"material": null, "confidence": null, "recycler_ranking": null, "transcribed_text": "how to dispose batteries"}"#,
        )
        .unwrap();
        let response = wire.into_domain();
        assert_eq!(response.result.material, UNKNOWN_MATERIAL);
        assert!(response.result.recyclers.is_empty());
        assert_eq!(
            response.result.transcription.as_deref(),
            Some("how to dispose batteries")
        );
    }

    #[test]
    fn flat_impact_fields_are_collected() {
        let wire: WireScan =
            serde_json::from_str(r#"{"co2_saved_kg": 0.4, "landfill_saved_kg": 0.1}"#).unwrap();
        let impact = wire.into_domain().result.environmental_impact.unwrap();
        assert!((impact.co2_saved_kg - 0.4).abs() < 1e-9);
        assert_eq!(impact.water_saved_liters, 0.0);
    }

    #[test]
    fn nearby_accepts_wrapped_and_bare_lists() {
        let wrapped: WireNearby =
            serde_json::from_str(r#"{"recyclers": [{"name": "A", "score": 3}]}"#).unwrap();
        let bare: WireNearby = serde_json::from_str(r#"[{"recycler_name": "B"}]"#).unwrap();
        assert_eq!(wrapped.into_domain()[0].name, "A");
        assert_eq!(bare.into_domain()[0].name, "B");
    }

    #[test]
    fn impact_stats_round_counts() {
        let wire: WireImpactStats = serde_json::from_str(
            r#"{"total_scans": 4, "tokens_balance": 42.0, "total_co2_saved_kg": 3.5}"#,
        )
        .unwrap();
        let stats = wire.into_domain();
        assert_eq!(stats.total_scans, 4);
        assert_eq!(stats.tokens_balance, 42);
        assert_eq!(stats.tokens_earned, 0);
    }

    #[test]
    fn profile_prefers_phone_then_email() {
        let wire: WireProfile =
            serde_json::from_str(r#"{"_id": "u1", "name": "Asha", "email": "a@x.org"}"#).unwrap();
        let identity = wire.into_domain("u1");
        assert_eq!(identity.contact, "a@x.org");
        assert_eq!(identity.display_name, "Asha");
    }

    #[test]
    fn registration_without_id_is_rejected() {
        let wire: WireRegistered = serde_json::from_str(r#"{"message": "ok"}"#).unwrap();
        assert!(wire.into_domain("+91").is_none());
    }
}
