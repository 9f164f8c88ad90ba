//! Capture inputs produced by the camera and the voice recorder.
//!
//! A `CaptureInput` is consumed exactly once by the gateway: submission
//! methods take it by value so it cannot be reused after a request is sent.

use std::fmt;
use std::time::Duration;

use crate::enums::CaptureKind;

/// One bounded capture: a photo or a voice clip.
#[derive(Clone, PartialEq, Eq)]
pub enum CaptureInput {
    Image {
        bytes: Vec<u8>,
        mime_type: String,
    },
    AudioClip {
        bytes: Vec<u8>,
        mime_type: String,
        duration_hint: Option<Duration>,
    },
}

impl CaptureInput {
    #[must_use]
    pub fn image(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self::Image {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    #[must_use]
    pub fn audio(bytes: Vec<u8>, mime_type: impl Into<String>, duration_hint: Option<Duration>) -> Self {
        Self::AudioClip {
            bytes,
            mime_type: mime_type.into(),
            duration_hint,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CaptureKind {
        match self {
            Self::Image { .. } => CaptureKind::Image,
            Self::AudioClip { .. } => CaptureKind::Voice,
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Image { bytes, .. } | Self::AudioClip { bytes, .. } => bytes,
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Image { mime_type, .. } | Self::AudioClip { mime_type, .. } => mime_type,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// File name sent in the multipart part.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Image { mime_type, .. } => {
                let ext = match mime_type.as_str() {
                    "image/png" => "png",
                    "image/webp" => "webp",
                    "image/heic" => "heic",
                    "image/gif" => "gif",
                    _ => "jpg",
                };
                format!("capture.{ext}")
            }
            Self::AudioClip { .. } => "voice.webm".to_string(),
        }
    }

    /// Consume the capture, yielding its payload.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, String) {
        match self {
            Self::Image { bytes, mime_type } | Self::AudioClip { bytes, mime_type, .. } => {
                (bytes, mime_type)
            }
        }
    }
}

impl fmt::Debug for CaptureInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { bytes, mime_type } => f
                .debug_struct("Image")
                .field("len", &bytes.len())
                .field("mime_type", mime_type)
                .finish(),
            Self::AudioClip {
                bytes,
                mime_type,
                duration_hint,
            } => f
                .debug_struct("AudioClip")
                .field("len", &bytes.len())
                .field("mime_type", mime_type)
                .field("duration_hint", duration_hint)
                .finish(),
        }
    }
}
