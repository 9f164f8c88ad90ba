//! Scan, voice, and knowledge base submissions.

use eco_core::enums::{CaptureKind, Language};
use eco_core::{CaptureInput, Coordinate};
use reqwest::multipart::{Form, Part};

use crate::wire::WireScan;
use crate::{
    GatewayClient, ScanResponse, error::GatewayError, http::read_json, require_coordinate,
    require_identity,
};

/// Longest text query accepted by the knowledge base endpoint.
pub const MAX_QUERY_CHARS: usize = 2000;

fn media_part(input: CaptureInput, expected: CaptureKind) -> Result<Part, GatewayError> {
    if input.kind() != expected {
        return Err(GatewayError::Validation(format!(
            "expected {} capture, got {}",
            expected.as_str(),
            input.kind().as_str()
        )));
    }
    if input.is_empty() {
        return Err(GatewayError::Validation("capture is empty".into()));
    }
    let file_name = input.file_name();
    let (bytes, mime_type) = input.into_parts();
    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(&mime_type)?)
}

fn context_form(identity_id: &str, coordinate: Coordinate, language: Language) -> Form {
    Form::new()
        .text("user_id", identity_id.to_string())
        .text("latitude", coordinate.latitude.to_string())
        .text("longitude", coordinate.longitude.to_string())
        .text("language", language.as_str())
}

impl GatewayClient {
    /// `POST /scan_image` with the image and capture context.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for a blank identity, missing
    /// coordinate, or empty image, before any request is sent.
    pub async fn scan_image(
        &self,
        image: CaptureInput,
        identity_id: &str,
        coordinate: Option<Coordinate>,
        language: Language,
    ) -> Result<ScanResponse, GatewayError> {
        let identity_id = require_identity(identity_id)?;
        let coordinate = require_coordinate(coordinate)?;
        let size = image.len();
        let part = media_part(image, CaptureKind::Image)?;
        let form = context_form(identity_id, coordinate, language).part("image", part);

        tracing::debug!(bytes = size, %coordinate, language = language.as_str(), "submitting image scan");
        let resp = self
            .http
            .post(self.url("scan_image"))
            .multipart(form)
            .send()
            .await?;
        let wire: WireScan = read_json(resp).await?;
        Ok(wire.into_domain())
    }

    /// `POST /voice_input` with the recorded clip and capture context.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GatewayClient::scan_image`].
    pub async fn voice_input(
        &self,
        audio: CaptureInput,
        identity_id: &str,
        coordinate: Option<Coordinate>,
        language: Language,
    ) -> Result<ScanResponse, GatewayError> {
        let identity_id = require_identity(identity_id)?;
        let coordinate = require_coordinate(coordinate)?;
        let size = audio.len();
        let part = media_part(audio, CaptureKind::Voice)?;
        let form = context_form(identity_id, coordinate, language).part("audio", part);

        tracing::debug!(bytes = size, %coordinate, language = language.as_str(), "submitting voice query");
        let resp = self
            .http
            .post(self.url("voice_input"))
            .multipart(form)
            .send()
            .await?;
        let wire: WireScan = read_json(resp).await?;
        Ok(wire.into_domain())
    }

    /// `POST /rag_query` with a plain text question.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for a blank identity or query, or
    /// a query longer than [`MAX_QUERY_CHARS`].
    pub async fn rag_query(
        &self,
        identity_id: &str,
        text: &str,
        language: Language,
    ) -> Result<ScanResponse, GatewayError> {
        let identity_id = require_identity(identity_id)?;
        let query = validate_query(text)?;
        let form = Form::new()
            .text("user_id", identity_id.to_string())
            .text("query", query.to_string())
            .text("language", language.as_str());

        tracing::debug!(chars = query.chars().count(), "querying knowledge base");
        let resp = self
            .http
            .post(self.url("rag_query"))
            .multipart(form)
            .send()
            .await?;
        let wire: WireScan = read_json(resp).await?;
        Ok(wire.into_domain())
    }
}

fn validate_query(text: &str) -> Result<&str, GatewayError> {
    let query = text.trim();
    if query.is_empty() {
        return Err(GatewayError::Validation("query is empty".into()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(GatewayError::Validation(format!(
            "query longer than {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Points at a port nothing listens on; validation must fail before it matters.
    fn offline_client() -> GatewayClient {
        GatewayClient::new("http://127.0.0.1:9", Duration::from_millis(200), "test").unwrap()
    }

    #[tokio::test]
    async fn missing_coordinate_fails_before_io() {
        let err = offline_client()
            .scan_image(CaptureInput::image(vec![1, 2, 3], "image/png"), "u1", None, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(msg) if msg == "location required"));
    }

    #[tokio::test]
    async fn blank_identity_fails_before_io() {
        let err = offline_client()
            .voice_input(
                CaptureInput::audio(vec![0; 16], "audio/webm", None),
                " ",
                Some(Coordinate::FALLBACK),
                Language::Hi,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(msg) if msg == "identity required"));
    }

    #[tokio::test]
    async fn empty_image_is_rejected() {
        let err = offline_client()
            .scan_image(
                CaptureInput::image(Vec::new(), "image/jpeg"),
                "u1",
                Some(Coordinate::FALLBACK),
                Language::En,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn audio_sent_to_image_endpoint_is_rejected() {
        let err = offline_client()
            .scan_image(
                CaptureInput::audio(vec![1], "audio/webm", None),
                "u1",
                Some(Coordinate::FALLBACK),
                Language::En,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(msg) if msg.contains("expected image")));
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let err = offline_client()
            .scan_image(
                CaptureInput::image(vec![1, 2, 3], "image/png"),
                "u1",
                Some(Coordinate::FALLBACK),
                Language::En,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[test]
    fn query_validation() {
        assert_eq!(validate_query("  how to recycle tetrapak? ").unwrap(), "how to recycle tetrapak?");
        assert!(validate_query("   ").is_err());
        assert!(validate_query(&"a".repeat(MAX_QUERY_CHARS + 1)).is_err());
    }
}
