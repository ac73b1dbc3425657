use anyhow::{Context, Result};
use std::io::Cursor;

use super::capture::AudioFrame;

/// One fixed-duration unit of captured audio.
///
/// The payload is a complete WAV blob ready for the transcription
/// collaborator. Each segment is consumed exactly once; a segment whose
/// transcription fails is dropped, never replayed.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    /// Monotonically increasing, starting at 0.
    pub sequence: u64,
    /// Encoded WAV bytes.
    pub payload: Vec<u8>,
    /// Duration of the captured audio in milliseconds.
    pub duration_ms: u64,
}

/// Accumulates PCM frames and encodes fixed-size slices as WAV blobs.
pub(crate) struct SegmentEncoder {
    sample_rate: u32,
    channels: u16,
    buffer: Vec<i16>,
}

impl SegmentEncoder {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            buffer: Vec::new(),
        }
    }

    pub fn push_frame(&mut self, frame: &AudioFrame) {
        self.buffer.extend_from_slice(&frame.samples);
    }

    /// Number of buffered samples not yet cut into a segment.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Cut `count` samples off the front into a finished segment.
    ///
    /// The samples are consumed even when encoding fails, so a bad cut never
    /// stalls the stream.
    pub fn cut(&mut self, sequence: u64, count: usize) -> Result<AudioSegment> {
        let samples: Vec<i16> = self.buffer.drain(..count).collect();
        self.encode(sequence, samples)
    }

    /// Drain whatever is left into a final partial segment.
    ///
    /// Returns `None` when the buffer is empty; zero-byte segments never
    /// enter the pipeline.
    pub fn flush(&mut self, sequence: u64) -> Result<Option<AudioSegment>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let samples: Vec<i16> = self.buffer.drain(..).collect();
        self.encode(sequence, samples).map(Some)
    }

    fn encode(&self, sequence: u64, samples: Vec<i16>) -> Result<AudioSegment> {
        let duration_ms =
            samples.len() as u64 * 1000 / (self.sample_rate as u64 * self.channels as u64);

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .context("Failed to create WAV writer")?;
            for &sample in &samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
            writer.finalize().context("Failed to finalize WAV blob")?;
        }

        Ok(AudioSegment {
            sequence,
            payload: cursor.into_inner(),
            duration_ms,
        })
    }
}
