//! Impact statistics, wallet, redemption, and user registration.

use eco_core::Identity;
use eco_core::entities::{ImpactStats, Redemption, Wallet};
use eco_core::identity::{RegisteredUser, Registration};
use reqwest::multipart::Form;

use crate::error::GatewayError;
use crate::http::{check_response, extract_message, read_json};
use crate::wire::{WireImpactStats, WireProfile, WireRedemption, WireRegistered, WireWallet};
use crate::{GatewayClient, require_identity};

/// Statuses the redemption endpoint uses for unknown, expired, or used codes.
const INVALID_CODE_STATUSES: [u16; 5] = [400, 404, 409, 410, 422];

/// Normalize a redemption code: trimmed, upper-cased, alphanumeric only.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] for a blank code or one containing
/// characters other than ASCII letters, digits, and `-`.
pub fn normalize_code(code: &str) -> Result<String, GatewayError> {
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(GatewayError::Validation("code is empty".into()));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(GatewayError::Validation(format!(
            "code contains invalid characters: {code}"
        )));
    }
    Ok(code)
}

pub(crate) async fn decode_redemption(
    resp: reqwest::Response,
    code: &str,
) -> Result<Redemption, GatewayError> {
    let status = resp.status().as_u16();
    if INVALID_CODE_STATUSES.contains(&status) {
        let body = resp.text().await.unwrap_or_default();
        let message = extract_message(&body).unwrap_or_else(|| format!("code {code} is not valid"));
        tracing::debug!(status, %message, "redemption rejected");
        return Err(GatewayError::InvalidCode(message));
    }
    let wire: WireRedemption = read_json(resp).await?;
    Ok(wire.into_domain(code))
}

pub(crate) async fn decode_registration(
    resp: reqwest::Response,
    contact: &str,
) -> Result<RegisteredUser, GatewayError> {
    let wire: WireRegistered = read_json(resp).await?;
    wire.into_domain(contact)
        .ok_or_else(|| GatewayError::Parse("registration response missing user_id".into()))
}

impl GatewayClient {
    /// `GET /user/stats/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on a blank identity, transport failure, or
    /// non-success status.
    pub async fn user_stats(&self, identity_id: &str) -> Result<ImpactStats, GatewayError> {
        let id = require_identity(identity_id)?;
        let url = self.url(&format!("user/stats/{}", urlencoding::encode(id)));
        let wire: WireImpactStats = read_json(self.http.get(&url).send().await?).await?;
        Ok(wire.into_domain())
    }

    /// `GET /wallet/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on a blank identity, transport failure, or
    /// non-success status.
    pub async fn wallet(&self, identity_id: &str) -> Result<Wallet, GatewayError> {
        let id = require_identity(identity_id)?;
        let url = self.url(&format!("wallet/{}", urlencoding::encode(id)));
        let wire: WireWallet = read_json(self.http.get(&url).send().await?).await?;
        Ok(wire.into_domain(id))
    }

    /// `POST /user/redeem`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidCode`] when the backend rejects the
    /// code, [`GatewayError::Validation`] for a malformed code.
    pub async fn redeem(&self, identity_id: &str, code: &str) -> Result<Redemption, GatewayError> {
        let id = require_identity(identity_id)?;
        let code = normalize_code(code)?;
        let form = Form::new()
            .text("user_id", id.to_string())
            .text("code", code.clone());

        tracing::debug!(%code, "redeeming code");
        let resp = self
            .http
            .post(self.url("user/redeem"))
            .multipart(form)
            .send()
            .await?;
        decode_redemption(resp, &code).await
    }

    /// `POST /user/register` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for a blank name or contact.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegisteredUser, GatewayError> {
        if registration.display_name.trim().is_empty() {
            return Err(GatewayError::Validation("name required".into()));
        }
        if registration.contact.trim().is_empty() {
            return Err(GatewayError::Validation("phone required".into()));
        }
        let resp = self
            .http
            .post(self.url("user/register"))
            .json(registration)
            .send()
            .await?;
        decode_registration(resp, &registration.contact).await
    }

    /// `GET /user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on a blank identity, transport failure, or
    /// non-success status.
    pub async fn user_profile(&self, identity_id: &str) -> Result<Identity, GatewayError> {
        let id = require_identity(identity_id)?;
        let url = self.url(&format!("user/{}", urlencoding::encode(id)));
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let wire: WireProfile = serde_json::from_str(&resp.text().await?)?;
        Ok(wire.into_domain(id))
    }
}
