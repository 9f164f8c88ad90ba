//! Camera capture with an optional preview-before-submit step.
//!
//! ```text
//! trigger --complete--> preview --confirm--> trigger (emits image)
//!                          \--retake--> trigger (discards image)
//! ```
//!
//! Without preview, `complete` emits the image directly.

use std::path::Path;

use eco_core::CaptureInput;
use eco_core::enums::CaptureKind;

use crate::error::CaptureError;

/// Largest image accepted for upload.
pub const MAX_IMAGE_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Trigger,
    Preview,
}

#[derive(Debug, Default)]
pub struct CameraCapture {
    preview: bool,
    pending: Option<CaptureInput>,
}

impl CameraCapture {
    /// A capturer that emits images as soon as they are taken.
    #[must_use]
    pub const fn direct() -> Self {
        Self {
            preview: false,
            pending: None,
        }
    }

    /// A capturer that holds each image for confirmation.
    #[must_use]
    pub const fn with_preview() -> Self {
        Self {
            preview: true,
            pending: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> CameraState {
        if self.pending.is_some() {
            CameraState::Preview
        } else {
            CameraState::Trigger
        }
    }

    /// The image awaiting confirmation.
    #[must_use]
    pub const fn pending(&self) -> Option<&CaptureInput> {
        self.pending.as_ref()
    }

    /// The user finished taking a picture.
    ///
    /// Returns the image immediately in direct mode, or `None` after moving
    /// to the preview state.
    ///
    /// # Errors
    ///
    /// Rejects audio, empty or oversized input, and a second image while one
    /// is already in preview.
    pub fn complete(&mut self, image: CaptureInput) -> Result<Option<CaptureInput>, CaptureError> {
        if self.pending.is_some() {
            return Err(invalid("preview", "preview"));
        }
        check_image(&image)?;
        if self.preview {
            self.pending = Some(image);
            Ok(None)
        } else {
            Ok(Some(image))
        }
    }

    /// Discard the pending image and return to the trigger.
    ///
    /// # Errors
    ///
    /// Fails when nothing is in preview.
    pub fn retake(&mut self) -> Result<(), CaptureError> {
        self.pending
            .take()
            .map(drop)
            .ok_or_else(|| invalid("trigger", "trigger"))
    }

    /// Emit the pending image. Each image is emitted at most once.
    ///
    /// # Errors
    ///
    /// Fails when nothing is in preview.
    pub fn confirm(&mut self) -> Result<CaptureInput, CaptureError> {
        self.pending.take().ok_or_else(|| invalid("trigger", "submit"))
    }
}

fn invalid(from: &str, to: &str) -> CaptureError {
    CaptureError::InvalidState(eco_core::CoreError::InvalidTransition {
        machine: "camera".into(),
        from: from.into(),
        to: to.into(),
    })
}

fn check_image(image: &CaptureInput) -> Result<(), CaptureError> {
    if image.kind() != CaptureKind::Image {
        return Err(CaptureError::UnsupportedMedia(image.mime_type().to_string()));
    }
    if image.is_empty() {
        return Err(CaptureError::Empty);
    }
    if image.len() > MAX_IMAGE_BYTES {
        return Err(CaptureError::TooLarge {
            size: image.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// MIME type for an image file, by extension.
#[must_use]
pub fn image_mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" | "heif" => Some("image/heic"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Read an image file as a capture, the file-picker flavour of the camera.
///
/// # Errors
///
/// Returns [`CaptureError::UnsupportedMedia`] for unknown extensions,
/// [`CaptureError::PermissionDenied`] when the file cannot be opened for
/// lack of permission, and [`CaptureError::Empty`] for empty files.
pub fn image_from_path(path: &Path) -> Result<CaptureInput, CaptureError> {
    let mime = image_mime_for(path)
        .ok_or_else(|| CaptureError::UnsupportedMedia(path.display().to_string()))?;
    let bytes = std::fs::read(path)?;
    let image = CaptureInput::image(bytes, mime);
    check_image(&image)?;
    tracing::debug!(path = %path.display(), bytes = image.len(), mime, "image captured");
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn png() -> CaptureInput {
        CaptureInput::image(vec![0x89, b'P', b'N', b'G'], "image/png")
    }

    #[test]
    fn direct_mode_emits_immediately() {
        let mut camera = CameraCapture::direct();
        assert_eq!(camera.complete(png()).unwrap(), Some(png()));
        assert_eq!(camera.state(), CameraState::Trigger);
    }

    #[test]
    fn preview_confirm_emits_exactly_once() {
        let mut camera = CameraCapture::with_preview();
        assert_eq!(camera.complete(png()).unwrap(), None);
        assert_eq!(camera.state(), CameraState::Preview);
        assert_eq!(camera.confirm().unwrap(), png());
        assert!(camera.confirm().is_err());
        assert_eq!(camera.state(), CameraState::Trigger);
    }

    #[test]
    fn retake_discards_pending() {
        let mut camera = CameraCapture::with_preview();
        camera.complete(png()).unwrap();
        camera.retake().unwrap();
        assert_eq!(camera.state(), CameraState::Trigger);
        assert!(camera.pending().is_none());
        assert!(camera.confirm().is_err());
    }

    #[test]
    fn second_image_during_preview_is_rejected() {
        let mut camera = CameraCapture::with_preview();
        camera.complete(png()).unwrap();
        assert!(matches!(
            camera.complete(png()),
            Err(CaptureError::InvalidState(_))
        ));
    }

    #[test]
    fn audio_is_not_an_image() {
        let mut camera = CameraCapture::direct();
        let clip = CaptureInput::audio(vec![1], "audio/webm", None);
        assert!(matches!(
            camera.complete(clip),
            Err(CaptureError::UnsupportedMedia(_))
        ));
    }

    #[rstest]
    #[case("photo.JPG", Some("image/jpeg"))]
    #[case("bottle.png", Some("image/png"))]
    #[case("can.heif", Some("image/heic"))]
    #[case("notes.txt", None)]
    #[case("no_extension", None)]
    fn mime_by_extension(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(image_mime_for(Path::new(name)), expected);
    }

    #[test]
    fn image_from_path_reads_file() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("bottle.png");
        std::fs::write(&path, [1, 2, 3]).unwrap();
        let image = image_from_path(&path).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn empty_file_is_rejected() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(image_from_path(&path), Err(CaptureError::Empty)));
    }

    #[test]
    fn missing_file_is_device_unavailable() {
        let err = image_from_path(Path::new("/nonexistent/dir/bottle.jpg")).unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    }
}
