//! # eco-gateway
//!
//! Typed HTTP gateway to the ecosort recycling backend.
//!
//! One operation per backend capability:
//! - image scan and voice query submission (multipart)
//! - text-only knowledge base queries
//! - nearby recycler listing and pickup scheduling
//! - impact statistics, wallet balance, and token redemption
//! - user registration and profile lookup
//!
//! Every operation is a single request/response mapping. Nothing is retried.

pub mod account;
pub mod recyclers;
pub mod scan;

mod error;
mod http;
mod wire;

pub use error::GatewayError;
pub use http::extract_message;
pub use wire::UNKNOWN_MATERIAL;

use std::future::Future;
use std::time::Duration;

use eco_core::entities::{
    ImpactStats, KnowledgeSnippet, PickupConfirmation, PickupRequest, RecyclerCandidate,
    Redemption, ScanResult, Wallet,
};
use eco_core::enums::Language;
use eco_core::identity::{RegisteredUser, Registration};
use eco_core::{CaptureInput, Coordinate, Identity};

// ── Types ──────────────────────────────────────────────────────────

/// A scan or query result together with the knowledge snippets the backend
/// retrieved while producing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResponse {
    pub result: ScanResult,
    pub snippets: Vec<KnowledgeSnippet>,
}

// ── Gateway trait ──────────────────────────────────────────────────

/// The backend call surface consumed by the session layer.
///
/// [`GatewayClient`] is the HTTP implementation. Tests substitute in-memory
/// fakes that count calls.
pub trait Gateway: Send + Sync {
    /// Submit a captured image for classification.
    fn submit_image_scan(
        &self,
        image: CaptureInput,
        identity_id: &str,
        coordinate: Option<Coordinate>,
        language: Language,
    ) -> impl Future<Output = Result<ScanResponse, GatewayError>> + Send;

    /// Submit a recorded voice clip. The result carries the transcription
    /// when the backend performed speech-to-text.
    fn submit_voice_query(
        &self,
        audio: CaptureInput,
        identity_id: &str,
        coordinate: Option<Coordinate>,
        language: Language,
    ) -> impl Future<Output = Result<ScanResponse, GatewayError>> + Send;

    /// Ask the knowledge base a text question.
    fn query_knowledge_base(
        &self,
        identity_id: &str,
        text: &str,
        language: Language,
    ) -> impl Future<Output = Result<ScanResponse, GatewayError>> + Send;

    fn list_nearby_recyclers(
        &self,
        coordinate: Coordinate,
        material: Option<&str>,
        weight_kg: Option<f64>,
    ) -> impl Future<Output = Result<Vec<RecyclerCandidate>, GatewayError>> + Send;

    fn schedule_pickup(
        &self,
        request: &PickupRequest,
    ) -> impl Future<Output = Result<PickupConfirmation, GatewayError>> + Send;

    fn get_impact_summary(
        &self,
        identity_id: &str,
    ) -> impl Future<Output = Result<ImpactStats, GatewayError>> + Send;

    fn get_wallet(
        &self,
        identity_id: &str,
    ) -> impl Future<Output = Result<Wallet, GatewayError>> + Send;

    /// Redeem a promotional code. Unknown or used codes fail with
    /// [`GatewayError::InvalidCode`].
    fn redeem_code(
        &self,
        identity_id: &str,
        code: &str,
    ) -> impl Future<Output = Result<Redemption, GatewayError>> + Send;

    fn register_user(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<RegisteredUser, GatewayError>> + Send;

    fn get_user_profile(
        &self,
        identity_id: &str,
    ) -> impl Future<Output = Result<Identity, GatewayError>> + Send;
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the recycling backend.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a client rooted at `base_url` (for example `http://localhost:8000/api`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for a blank base URL, or
    /// [`GatewayError::Network`] if the underlying `reqwest::Client` fails to build.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, GatewayError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(GatewayError::Validation("backend base URL is empty".into()));
        }
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Gateway for GatewayClient {
    async fn submit_image_scan(
        &self,
        image: CaptureInput,
        identity_id: &str,
        coordinate: Option<Coordinate>,
        language: Language,
    ) -> Result<ScanResponse, GatewayError> {
        self.scan_image(image, identity_id, coordinate, language).await
    }

    async fn submit_voice_query(
        &self,
        audio: CaptureInput,
        identity_id: &str,
        coordinate: Option<Coordinate>,
        language: Language,
    ) -> Result<ScanResponse, GatewayError> {
        self.voice_input(audio, identity_id, coordinate, language).await
    }

    async fn query_knowledge_base(
        &self,
        identity_id: &str,
        text: &str,
        language: Language,
    ) -> Result<ScanResponse, GatewayError> {
        self.rag_query(identity_id, text, language).await
    }

    async fn list_nearby_recyclers(
        &self,
        coordinate: Coordinate,
        material: Option<&str>,
        weight_kg: Option<f64>,
    ) -> Result<Vec<RecyclerCandidate>, GatewayError> {
        self.recyclers_nearby(coordinate, material, weight_kg).await
    }

    async fn schedule_pickup(
        &self,
        request: &PickupRequest,
    ) -> Result<PickupConfirmation, GatewayError> {
        self.post_pickup(request).await
    }

    async fn get_impact_summary(&self, identity_id: &str) -> Result<ImpactStats, GatewayError> {
        self.user_stats(identity_id).await
    }

    async fn get_wallet(&self, identity_id: &str) -> Result<Wallet, GatewayError> {
        self.wallet(identity_id).await
    }

    async fn redeem_code(&self, identity_id: &str, code: &str) -> Result<Redemption, GatewayError> {
        self.redeem(identity_id, code).await
    }

    async fn register_user(
        &self,
        registration: &Registration,
    ) -> Result<RegisteredUser, GatewayError> {
        self.register(registration).await
    }

    async fn get_user_profile(&self, identity_id: &str) -> Result<Identity, GatewayError> {
        self.user_profile(identity_id).await
    }
}

// ── Validation ─────────────────────────────────────────────────────

/// Reject a blank identity id before any I/O.
pub(crate) fn require_identity(identity_id: &str) -> Result<&str, GatewayError> {
    let trimmed = identity_id.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::Validation("identity required".into()));
    }
    Ok(trimmed)
}

/// Reject a missing or out-of-range coordinate before any I/O.
pub(crate) fn require_coordinate(coordinate: Option<Coordinate>) -> Result<Coordinate, GatewayError> {
    match coordinate {
        Some(c) if c.is_valid() => Ok(c),
        Some(c) => Err(GatewayError::Validation(format!(
            "coordinate out of range: {c}"
        ))),
        None => Err(GatewayError::Validation("location required".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client =
            GatewayClient::new("http://localhost:8000/api/", Duration::from_secs(5), "test")
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/scan_image"), "http://localhost:8000/api/scan_image");
        assert_eq!(client.url("wallet/u1"), "http://localhost:8000/api/wallet/u1");
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let err = GatewayClient::new("  ", Duration::from_secs(5), "test").unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn identity_validation() {
        assert_eq!(require_identity(" u1 ").unwrap(), "u1");
        assert!(matches!(
            require_identity(""),
            Err(GatewayError::Validation(msg)) if msg == "identity required"
        ));
    }

    #[test]
    fn coordinate_validation() {
        assert!(require_coordinate(Some(Coordinate::FALLBACK)).is_ok());
        assert!(require_coordinate(None).is_err());
        assert!(require_coordinate(Some(Coordinate::new(91.0, 0.0))).is_err());
    }
}
