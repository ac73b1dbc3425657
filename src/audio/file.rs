use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::capture::{AudioFrame, CaptureBackend};
use crate::error::CaptureError;

/// A decoded WAV recording.
pub struct AudioFile {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_seconds: f64,
}

impl AudioFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = hound::WavReader::open(path.as_ref())
            .with_context(|| format!("Failed to open audio file {:?}", path.as_ref()))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to decode audio samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration_seconds,
        })
    }
}

/// Capture backend that replays a WAV file as if it were a live device.
///
/// Frames are paced at wall-clock rate so the downstream segment cadence
/// matches a real capture. Used for development and batch replay.
pub struct FileCaptureBackend {
    path: PathBuf,
    frame_duration_ms: u64,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl FileCaptureBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            frame_duration_ms: 100,
            stop_tx: None,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileCaptureBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        let audio = AudioFile::open(&self.path)
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        info!(
            "Replaying {:?}: {:.1}s at {} Hz",
            self.path, audio.duration_seconds, audio.sample_rate
        );

        let (tx, rx) = mpsc::channel(32);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let frame_duration_ms = self.frame_duration_ms;

        let task = tokio::spawn(async move {
            let samples_per_frame = (audio.sample_rate as u64
                * audio.channels as u64
                * frame_duration_ms
                / 1000) as usize;

            let mut interval = tokio::time::interval(Duration::from_millis(frame_duration_ms));
            let mut offset = 0usize;
            let mut timestamp_ms = 0u64;

            while offset < audio.samples.len() {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = stop_rx.changed() => break,
                }

                let end = (offset + samples_per_frame).min(audio.samples.len());
                let frame = AudioFrame {
                    samples: audio.samples[offset..end].to_vec(),
                    sample_rate: audio.sample_rate,
                    channels: audio.channels,
                    timestamp_ms,
                };

                tokio::select! {
                    sent = tx.send(frame) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                    _ = stop_rx.changed() => break,
                }

                offset = end;
                timestamp_ms += frame_duration_ms;
            }
        });

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("File replay task panicked: {}", e);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file-replay"
    }
}
