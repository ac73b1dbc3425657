pub mod capture;
pub mod file;
pub mod segment;

pub use capture::{AudioFrame, CaptureBackend, CaptureConfig, CaptureHandle, ChunkCapturer};
pub use file::{AudioFile, FileCaptureBackend};
pub use segment::AudioSegment;
