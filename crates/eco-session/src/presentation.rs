//! Read-only projections of the session store for display.
//!
//! Nothing here mutates the result slot. The only network access is the
//! secondary nearby-recycler fetch, which writes to its own slot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eco_core::Coordinate;
use eco_core::entities::{EnvironmentalImpact, RecyclerCandidate};
use eco_core::enums::{CaptureKind, Provenance};
use eco_gateway::Gateway;
use serde::Serialize;

use crate::error::SessionError;
use crate::store::{NearbyRecyclers, ScanRecord, SessionStore};

/// Recyclers shown inline on the result view.
pub const TOP_RECYCLERS: usize = 3;
/// Characters of each knowledge snippet shown in the result view.
pub const SNIPPET_PREVIEW_CHARS: usize = 100;
/// Material used for recycler lookups when no scan is current.
pub const DEFAULT_MATERIAL: &str = "Plastic";

/// Format a `0.0..=1.0` score as a whole percentage.
#[must_use]
pub fn percent(score: f64) -> String {
    format!("{:.0}%", score.clamp(0.0, 1.0) * 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecyclerLine {
    pub name: String,
    pub distance: String,
    pub score: String,
}

impl From<&RecyclerCandidate> for RecyclerLine {
    fn from(recycler: &RecyclerCandidate) -> Self {
        Self {
            name: recycler.name.clone(),
            distance: format!("{:.1} km", recycler.distance_km),
            score: format!("{:.1}", recycler.score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactLines {
    pub co2_saved_kg: String,
    pub water_saved_liters: String,
    pub landfill_saved_kg: String,
}

impl From<&EnvironmentalImpact> for ImpactLines {
    fn from(impact: &EnvironmentalImpact) -> Self {
        Self {
            co2_saved_kg: format!("{:.1}", impact.co2_saved_kg),
            water_saved_liters: format!("{:.0}", impact.water_saved_liters),
            landfill_saved_kg: format!("{:.1}", impact.landfill_saved_kg),
        }
    }
}

/// Everything the result page renders, pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub kind: CaptureKind,
    pub captured_at: DateTime<Utc>,
    pub material: String,
    pub confidence: String,
    pub cleanliness: String,
    pub hazard_class: Option<String>,
    /// Present only for hazardous results that carry notes.
    pub hazard_banner: Option<String>,
    pub disposal_instruction: String,
    pub cleaning_recommendation: Option<String>,
    pub route_summary: Option<String>,
    pub impact: Option<ImpactLines>,
    /// Present only when the scan earns tokens.
    pub tokens: Option<String>,
    pub transcription: Option<String>,
    pub recyclers: Vec<RecyclerLine>,
    pub more_recyclers: usize,
    pub global_knowledge: Vec<String>,
    pub personal_knowledge: Vec<String>,
    pub citations: Vec<String>,
    pub pickup_suggestions: Vec<String>,
}

impl ResultView {
    /// Project the current record, or `None` when no scan has completed.
    #[must_use]
    pub fn from_store(store: &SessionStore) -> Option<Self> {
        store.current_scan().map(|record| Self::from_record(&record))
    }

    #[must_use]
    pub fn from_record(record: &ScanRecord) -> Self {
        let result = &record.result;
        let previews = |provenance: Provenance| -> Vec<String> {
            record
                .snippets
                .iter()
                .filter(|snippet| snippet.provenance == provenance)
                .map(|snippet| snippet.preview(SNIPPET_PREVIEW_CHARS))
                .collect()
        };

        Self {
            kind: record.kind,
            captured_at: record.captured_at,
            material: result.material.clone(),
            confidence: percent(result.confidence),
            cleanliness: percent(result.cleanliness),
            hazard_class: result.hazard_class.clone(),
            hazard_banner: result
                .hazard_notes
                .clone()
                .filter(|_| result.is_hazardous()),
            disposal_instruction: result.disposal_instruction.clone(),
            cleaning_recommendation: result.cleaning_recommendation.clone(),
            route_summary: result.route_summary.clone(),
            impact: result.environmental_impact.as_ref().map(ImpactLines::from),
            tokens: (result.estimated_credits > 0).then(|| result.estimated_credits.to_string()),
            transcription: result.transcription.clone(),
            recyclers: result
                .recyclers
                .iter()
                .take(TOP_RECYCLERS)
                .map(RecyclerLine::from)
                .collect(),
            more_recyclers: result.recyclers.len().saturating_sub(TOP_RECYCLERS),
            global_knowledge: previews(Provenance::Global),
            personal_knowledge: previews(Provenance::Personal),
            citations: result.citations.clone(),
            pickup_suggestions: result.pickup_suggestions.clone(),
        }
    }
}

/// Fetch recyclers near the current location for the current scan's
/// material.
///
/// Holds for a pending location at most `wait`, then searches around the
/// fallback coordinate. Failure leaves the result slot untouched; only the
/// nearby slot is written, and only while the scan it was fetched for is
/// still current.
///
/// # Errors
///
/// Returns the gateway error mapped into [`SessionError`].
pub async fn load_nearby<G: Gateway>(
    gateway: &G,
    store: &SessionStore,
    material: Option<&str>,
    weight_kg: Option<f64>,
    wait: Duration,
) -> Result<Arc<NearbyRecyclers>, SessionError> {
    let record = store.current_scan();
    let ticket = record.as_ref().map_or(0, |record| record.ticket);
    let material = material
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| record.as_ref().map(|r| r.result.material.clone()))
        .filter(|m| m != eco_gateway::UNKNOWN_MATERIAL)
        .unwrap_or_else(|| DEFAULT_MATERIAL.to_string());

    let center = store.location_within(wait).await;

    tracing::debug!(%center, %material, "loading nearby recyclers");
    let recyclers = gateway
        .list_nearby_recyclers(center, Some(&material), weight_kg)
        .await
        .map_err(|error| {
            tracing::warn!(%error, "nearby recycler lookup failed");
            SessionError::from(error)
        })?;

    let nearby = NearbyRecyclers {
        ticket,
        material,
        center,
        recyclers,
    };
    if !store.set_nearby(nearby.clone()) {
        tracing::debug!(ticket, "scan changed while loading recyclers; not stored");
    }
    Ok(Arc::new(nearby))
}

// ── Map ────────────────────────────────────────────────────────────

pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const ATTRIBUTION: &str = "© OpenStreetMap contributors";
pub const DEFAULT_ZOOM: u8 = 13;
/// Recyclers listed under the map.
pub const MAP_LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub position: Coordinate,
    pub label: String,
    pub popup: String,
}

/// Map parameters handed to whatever renders tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_url_template: &'static str,
    pub attribution: &'static str,
    pub user_marker: MapMarker,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// Centre on `center` with one marker per recycler that has a location.
    #[must_use]
    pub fn new(center: Coordinate, recyclers: &[RecyclerCandidate]) -> Self {
        let markers = recyclers
            .iter()
            .filter_map(|recycler| {
                let position = recycler.location?;
                let mut popup = format!(
                    "{}\n{:.1} km away\nScore: {:.1}",
                    recycler.name, recycler.distance_km, recycler.score
                );
                if !recycler.materials_accepted.is_empty() {
                    popup.push_str("\nAccepts: ");
                    popup.push_str(&recycler.materials_accepted.join(", "));
                }
                Some(MapMarker {
                    position,
                    label: recycler.name.clone(),
                    popup,
                })
            })
            .collect();

        Self {
            center,
            zoom: DEFAULT_ZOOM,
            tile_url_template: TILE_URL_TEMPLATE,
            attribution: ATTRIBUTION,
            user_marker: MapMarker {
                position: center,
                label: "Your Location".into(),
                popup: "Your Location".into(),
            },
            markers,
        }
    }

    /// Slippy-map tile coordinates of the centre at the current zoom.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn center_tile(&self) -> (u32, u32) {
        let n = f64::from(1_u32 << self.zoom);
        let lat = self.center.latitude.to_radians();
        let x = (self.center.longitude + 180.0) / 360.0 * n;
        let y = (1.0 - lat.tan().asinh() / std::f64::consts::PI) / 2.0 * n;
        let max = n - 1.0;
        (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
    }

    /// URL of the tile under the centre.
    #[must_use]
    pub fn center_tile_url(&self) -> String {
        let (x, y) = self.center_tile();
        self.tile_url_template
            .replace("{s}", "a")
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    /// A link that opens the same view in a browser.
    #[must_use]
    pub fn browse_url(&self) -> String {
        let Coordinate {
            latitude,
            longitude,
        } = self.center;
        format!(
            "https://www.openstreetmap.org/?mlat={latitude:.5}&mlon={longitude:.5}#map={}/{latitude:.5}/{longitude:.5}",
            self.zoom
        )
    }
}
