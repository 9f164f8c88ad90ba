//! Nearby recycler listing and pickup scheduling.

use eco_core::Coordinate;
use eco_core::entities::{PickupConfirmation, PickupRequest, RecyclerCandidate};
use reqwest::multipart::Form;

use crate::wire::{WireNearby, WirePickup};
use crate::{GatewayClient, error::GatewayError, http::read_json, require_identity};

/// Query parameters for `GET /recyclers_nearby`. Absent filters are omitted.
fn nearby_query(
    coordinate: Coordinate,
    material: Option<&str>,
    weight_kg: Option<f64>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("lat", coordinate.latitude.to_string()),
        ("lon", coordinate.longitude.to_string()),
    ];
    if let Some(material) = material.map(str::trim).filter(|m| !m.is_empty()) {
        params.push(("material", material.to_string()));
    }
    if let Some(weight) = weight_kg.filter(|w| w.is_finite() && *w > 0.0) {
        params.push(("weight_kg", weight.to_string()));
    }
    params
}

fn validate_pickup(request: &PickupRequest) -> Result<(), GatewayError> {
    require_identity(&request.identity_id)?;
    let required = [
        ("recycler", &request.recycler_id),
        ("date", &request.date),
        ("time slot", &request.time_slot),
        ("address", &request.address),
    ];
    for (label, value) in required {
        if value.trim().is_empty() {
            return Err(GatewayError::Validation(format!("{label} required")));
        }
    }
    Ok(())
}

pub(crate) async fn decode_nearby(
    resp: reqwest::Response,
) -> Result<Vec<RecyclerCandidate>, GatewayError> {
    let wire: WireNearby = read_json(resp).await?;
    Ok(wire.into_domain())
}

impl GatewayClient {
    /// `GET /recyclers_nearby` scoped to `coordinate`, optionally filtered by
    /// material and weight.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for an out-of-range coordinate,
    /// otherwise the usual transport and status errors.
    pub async fn recyclers_nearby(
        &self,
        coordinate: Coordinate,
        material: Option<&str>,
        weight_kg: Option<f64>,
    ) -> Result<Vec<RecyclerCandidate>, GatewayError> {
        let coordinate = crate::require_coordinate(Some(coordinate))?;
        let params = nearby_query(coordinate, material, weight_kg);
        tracing::debug!(%coordinate, ?material, "listing nearby recyclers");
        let resp = self
            .http
            .get(self.url("recyclers_nearby"))
            .query(&params)
            .send()
            .await?;
        decode_nearby(resp).await
    }

    /// `POST /schedule_pickup` with the non-empty request fields.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when a required field is blank.
    pub async fn post_pickup(
        &self,
        request: &PickupRequest,
    ) -> Result<PickupConfirmation, GatewayError> {
        validate_pickup(request)?;
        let form = request
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));

        tracing::debug!(recycler = %request.recycler_id, date = %request.date, "scheduling pickup");
        let resp = self
            .http
            .post(self.url("schedule_pickup"))
            .multipart(form)
            .send()
            .await?;
        let wire: WirePickup = read_json(resp).await?;
        Ok(wire.into_domain())
    }
}
