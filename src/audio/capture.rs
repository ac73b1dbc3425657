use crate::audio::segment::{AudioSegment, SegmentEncoder};
use crate::error::CaptureError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Raw audio from a capture backend (i16 PCM, interleaved).
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Milliseconds since capture started.
    pub timestamp_ms: u64,
}

/// Capture device abstraction.
///
/// Implementations own the host capture device: a live microphone, a file
/// replayed at wall-clock rate in development, or scripted frames in tests.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Request exclusive device access and start producing frames.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Release the device. No frames are produced after this resolves.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Configuration for segment capture.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Fixed duration of each emitted segment.
    pub segment_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            segment_duration_ms: 10_000,
        }
    }
}

/// Slices backend frames into fixed-duration segments.
///
/// Emission is push-driven: each segment is delivered to the receiver
/// returned by `start` as soon as it is finalized. The sequence is infinite
/// while capture is active and cannot be restarted after stop.
pub struct ChunkCapturer {
    config: CaptureConfig,
}

impl ChunkCapturer {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Start the backend and begin emitting segments.
    pub async fn start(
        &self,
        mut backend: Box<dyn CaptureBackend>,
    ) -> Result<(CaptureHandle, mpsc::Receiver<AudioSegment>), CaptureError> {
        let mut frames = backend.start().await?;

        info!("Audio capture started via {} backend", backend.name());

        let (seg_tx, seg_rx) = mpsc::channel(16);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            let samples_per_segment = (config.sample_rate as u64
                * config.channels as u64
                * config.segment_duration_ms
                / 1000) as usize;

            let mut sequence: u64 = 0;
            let mut encoder = SegmentEncoder::new(config.sample_rate, config.channels);
            let mut consumer_gone = false;

            'capture: loop {
                tokio::select! {
                    maybe = frames.recv() => match maybe {
                        Some(frame) => {
                            encoder.push_frame(&frame);

                            while encoder.buffered() >= samples_per_segment {
                                match encoder.cut(sequence, samples_per_segment) {
                                    Ok(segment) => {
                                        if seg_tx.send(segment).await.is_err() {
                                            consumer_gone = true;
                                            break 'capture;
                                        }
                                        sequence += 1;
                                    }
                                    Err(e) => {
                                        warn!("Failed to encode segment {}: {}", sequence, e)
                                    }
                                }
                            }
                        }
                        None => {
                            // Source ended on its own; emit what is left.
                            match encoder.flush(sequence) {
                                Ok(Some(segment)) => {
                                    let _ = seg_tx.send(segment).await;
                                    sequence += 1;
                                }
                                Ok(None) => {}
                                Err(e) => warn!("Failed to encode final segment: {}", e),
                            }
                            break 'capture;
                        }
                    },
                    _ = stop_rx.changed() => {
                        debug!("Capture stop requested, discarding partial segment");
                        break 'capture;
                    }
                }
            }

            if consumer_gone {
                debug!("Segment consumer dropped, stopping capture");
            }

            if let Err(e) = backend.stop().await {
                warn!("Failed to stop capture backend: {}", e);
            }

            info!("Audio capture stopped after {} segments", sequence);
        });

        Ok((
            CaptureHandle {
                stop_tx,
                task: Some(task),
            },
            seg_rx,
        ))
    }
}

/// Handle to an active capture.
///
/// Stopping is idempotent; no segment is emitted after `stop` returns.
#[derive(Debug)]
pub struct CaptureHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            debug!("Capture already stopped");
            return;
        };

        let _ = self.stop_tx.send(true);
        if let Err(e) = task.await {
            error!("Capture task panicked: {}", e);
        }
    }
}
