//! Voice recorder: an explicit `idle → recording → idle` state machine.
//!
//! The recorder owns at most one open [`AudioTrack`]. Every path back to
//! `idle` (stop, cancel, a failed start, drop) releases it.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eco_core::CaptureInput;
use eco_core::enums::RecorderState;

use crate::error::CaptureError;

/// Default maximum recording length.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(60);

/// An open capture device streaming encoded audio.
pub trait AudioTrack: Send {
    fn mime_type(&self) -> &str;

    /// Take whatever audio has accumulated since the last call.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] when the device fails mid-recording.
    fn drain(&mut self) -> Result<Vec<u8>, CaptureError>;

    /// Whether the source has no more audio to give. Live devices never
    /// finish on their own.
    fn is_finished(&self) -> bool {
        false
    }

    /// Release the device. Called exactly once.
    fn stop(&mut self);
}

/// Something that can open an [`AudioTrack`].
pub trait Microphone: Send {
    /// # Errors
    ///
    /// Returns [`CaptureError::PermissionDenied`] when access is refused.
    fn open(&mut self) -> Result<Box<dyn AudioTrack>, CaptureError>;
}

pub struct VoiceRecorder<M> {
    microphone: M,
    state: RecorderState,
    track: Option<Box<dyn AudioTrack>>,
    buffer: Vec<u8>,
    mime_type: String,
    started: Option<Instant>,
    max_duration: Duration,
}

impl<M> std::fmt::Debug for VoiceRecorder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceRecorder")
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("max_duration", &self.max_duration)
            .finish_non_exhaustive()
    }
}

impl<M: Microphone> VoiceRecorder<M> {
    #[must_use]
    pub fn new(microphone: M) -> Self {
        Self {
            microphone,
            state: RecorderState::Idle,
            track: None,
            buffer: Vec::new(),
            mime_type: String::new(),
            started: None,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }

    #[must_use]
    pub const fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    #[must_use]
    pub const fn state(&self) -> RecorderState {
        self.state
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.map_or(Duration::ZERO, |started| started.elapsed())
    }

    #[must_use]
    pub const fn max_duration(&self) -> Duration {
        self.max_duration
    }

    fn transition(&mut self, next: RecorderState) -> Result<(), CaptureError> {
        if !self.state.can_transition_to(next) {
            return Err(eco_core::CoreError::InvalidTransition {
                machine: "voice_recorder".into(),
                from: self.state.as_str().into(),
                to: next.as_str().into(),
            }
            .into());
        }
        self.state = next;
        Ok(())
    }

    /// Open the microphone and begin recording.
    ///
    /// # Errors
    ///
    /// Fails when already recording, or when the microphone cannot be
    /// opened; the recorder stays `Idle` in that case.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_recording() {
            return Err(eco_core::CoreError::InvalidTransition {
                machine: "voice_recorder".into(),
                from: "recording".into(),
                to: "recording".into(),
            }
            .into());
        }
        let track = match self.microphone.open() {
            Ok(track) => track,
            Err(error) => {
                tracing::warn!(%error, "microphone could not be opened");
                return Err(error);
            }
        };
        self.mime_type = track.mime_type().to_string();
        self.track = Some(track);
        self.buffer.clear();
        self.started = Some(Instant::now());
        self.transition(RecorderState::Recording)?;
        tracing::debug!(max_secs = self.max_duration.as_secs(), "recording started");
        Ok(())
    }

    /// Pull buffered audio. Stops automatically once the maximum duration is
    /// reached or the track runs out, returning the finished clip.
    ///
    /// # Errors
    ///
    /// A device failure releases the track, returns to `Idle`, and discards
    /// the partial recording.
    pub fn tick(&mut self) -> Result<Option<CaptureInput>, CaptureError> {
        let Some(track) = self.track.as_mut() else {
            return Ok(None);
        };
        let finished = match track.drain() {
            Ok(chunk) => {
                self.buffer.extend_from_slice(&chunk);
                track.is_finished()
            }
            Err(error) => {
                self.cancel();
                return Err(error);
            }
        };
        if finished {
            tracing::debug!("audio source exhausted");
            return self.stop().map(Some);
        }
        if self.elapsed() >= self.max_duration {
            tracing::debug!("maximum recording duration reached");
            return self.stop().map(Some);
        }
        Ok(None)
    }

    /// Finish recording and produce exactly one clip.
    ///
    /// The recorder is `Idle` and the device released afterwards, whether or
    /// not a clip was produced.
    ///
    /// # Errors
    ///
    /// Fails when not recording, when the final drain fails, or when nothing
    /// was recorded.
    pub fn stop(&mut self) -> Result<CaptureInput, CaptureError> {
        self.transition(RecorderState::Idle)?;
        let duration = self.elapsed();
        let drained = self.track.as_mut().map(|track| track.drain());
        self.release();
        self.started = None;

        let mut bytes = std::mem::take(&mut self.buffer);
        if let Some(chunk) = drained.transpose()? {
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(CaptureError::Empty);
        }
        tracing::debug!(bytes = bytes.len(), secs = duration.as_secs_f32(), "recording stopped");
        let mime = std::mem::take(&mut self.mime_type);
        Ok(CaptureInput::audio(bytes, mime, Some(duration)))
    }

    /// Abandon the recording and release the device. No-op when idle.
    pub fn cancel(&mut self) {
        if self.is_recording() {
            tracing::debug!("recording cancelled");
        }
        self.release();
        self.buffer.clear();
        self.started = None;
        self.state = RecorderState::Idle;
    }

    fn release(&mut self) {
        if let Some(mut track) = self.track.take() {
            track.stop();
        }
    }
}

impl<M> Drop for VoiceRecorder<M> {
    fn drop(&mut self) {
        if let Some(mut track) = self.track.take() {
            track.stop();
        }
    }
}

// ── File-backed microphone ─────────────────────────────────────────

/// MIME type for an audio file, by extension.
#[must_use]
pub fn audio_mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "webm" => Some("audio/webm"),
        "ogg" | "oga" | "opus" => Some("audio/ogg"),
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "m4a" | "mp4" => Some("audio/mp4"),
        _ => None,
    }
}

/// A microphone that streams a pre-recorded file in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct FileMicrophone {
    path: PathBuf,
    chunk_size: usize,
}

impl FileMicrophone {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: 16 * 1024,
        }
    }

    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Microphone for FileMicrophone {
    fn open(&mut self) -> Result<Box<dyn AudioTrack>, CaptureError> {
        let mime = audio_mime_for(&self.path)
            .ok_or_else(|| CaptureError::UnsupportedMedia(self.path.display().to_string()))?;
        let data = std::fs::read(&self.path)?;
        Ok(Box::new(FileTrack {
            data,
            position: 0,
            chunk_size: self.chunk_size.max(1),
            mime,
        }))
    }
}

struct FileTrack {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    mime: &'static str,
}

impl AudioTrack for FileTrack {
    fn mime_type(&self) -> &str {
        self.mime
    }

    fn drain(&mut self) -> Result<Vec<u8>, CaptureError> {
        let end = (self.position + self.chunk_size).min(self.data.len());
        let chunk = self.data[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }

    fn is_finished(&self) -> bool {
        self.position >= self.data.len()
    }

    fn stop(&mut self) {
        self.data = Vec::new();
        self.position = 0;
    }
}
