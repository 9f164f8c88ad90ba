//! Media capturers: camera (image) and voice recorder (audio clip).

pub mod camera;
pub mod voice;

pub use camera::{CameraCapture, CameraState, image_from_path};
pub use voice::{AudioTrack, FileMicrophone, Microphone, VoiceRecorder};
