use super::config::{SessionConfig, SummaryTrigger};
use super::stats::SessionStats;
use crate::audio::{AudioSegment, CaptureBackend, CaptureConfig, CaptureHandle, ChunkCapturer};
use crate::call::{self, CallTransport};
use crate::chat::{ChannelGuard, ChannelLifecycleManager, ChatClient};
use crate::error::SessionError;
use crate::pipeline::{
    StageStatus, SummarizationBackend, SummaryAccumulator, SummaryFragment, TranscriptResult,
    TranscriptionBackend,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Lifecycle of one live session.
///
/// Stopped is terminal: a new call gets a fresh orchestrator rather than a
/// restart of this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Inactive,
    Active,
    Draining,
    Stopped,
}

/// Composes the call-state gate, channel lifecycle, segment capture, and the
/// per-segment pipeline into one live meeting session.
///
/// The pipeline runs only while the call is joined and the chat channel is
/// attached. Each captured segment is processed by its own task, so capture
/// continues while earlier segments are still in flight; summary fragments
/// land in completion order, not capture order.
pub struct SessionOrchestrator {
    config: SessionConfig,
    transport: Arc<dyn CallTransport>,
    channels: ChannelLifecycleManager,
    transcriber: Arc<dyn TranscriptionBackend>,
    summarizer: Arc<dyn SummarizationBackend>,
    accumulator: SummaryAccumulator,

    state: watch::Sender<SessionState>,

    /// Cleared at teardown so late pipeline results cannot mutate a
    /// decommissioned summary.
    accepting: AtomicBool,

    started_at: chrono::DateTime<Utc>,
    segments_captured: AtomicUsize,

    backend: Mutex<Option<Box<dyn CaptureBackend>>>,
    capture: Mutex<Option<CaptureHandle>>,
    channel_guard: Mutex<Option<ChannelGuard>>,
    transcript: Mutex<Vec<TranscriptResult>>,
    inflight: Mutex<JoinSet<()>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,

    /// Serializes activation against teardown.
    lifecycle: Mutex<()>,

    last_error: Mutex<Option<String>>,
}

impl SessionOrchestrator {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn CallTransport>,
        chat: Arc<dyn ChatClient>,
        backend: Box<dyn CaptureBackend>,
        transcriber: Arc<dyn TranscriptionBackend>,
        summarizer: Arc<dyn SummarizationBackend>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Inactive);

        Self {
            transport,
            channels: ChannelLifecycleManager::new(chat),
            transcriber,
            summarizer,
            accumulator: SummaryAccumulator::new(),
            state,
            accepting: AtomicBool::new(false),
            started_at: Utc::now(),
            segments_captured: AtomicUsize::new(0),
            backend: Mutex::new(Some(backend)),
            capture: Mutex::new(None),
            channel_guard: Mutex::new(None),
            transcript: Mutex::new(Vec::new()),
            inflight: Mutex::new(JoinSet::new()),
            supervisor: Mutex::new(None),
            dispatcher: Mutex::new(None),
            lifecycle: Mutex::new(()),
            last_error: Mutex::new(None),
            config,
        }
    }

    /// Begin supervising the call. The pipeline activates when the call
    /// reaches Joined and tears down when it leaves that state.
    pub async fn start(self: &Arc<Self>) -> Result<(), SessionError> {
        let mut supervisor = self.supervisor.lock().await;
        if supervisor.is_some() {
            return Err(SessionError::AlreadyStarted);
        }

        info!("Supervising session for call {}", self.config.call_id);

        let this = Arc::clone(self);
        *supervisor = Some(tokio::spawn(async move { this.supervise().await }));

        Ok(())
    }

    /// Explicit teardown: user leave or client unmount.
    pub async fn stop(&self) -> SessionStats {
        self.teardown().await;

        if let Some(task) = self.supervisor.lock().await.take() {
            task.abort();
        }

        self.stats().await
    }

    /// Ask the transport engine to leave the call. The resulting state
    /// change flows back through the supervisor and tears the session down.
    pub async fn leave(&self) -> anyhow::Result<()> {
        self.transport.leave().await
    }

    pub fn call_id(&self) -> &str {
        &self.config.call_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the running summary.
    pub async fn current_summary(&self) -> String {
        self.accumulator.current_summary().await
    }

    /// Accumulated per-segment transcripts.
    pub async fn transcript(&self) -> Vec<TranscriptResult> {
        self.transcript.lock().await.clone()
    }

    /// The session-start failure that prevented activation, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    pub async fn stats(&self) -> SessionStats {
        let (transcripts_ok, transcripts_failed) = {
            let transcript = self.transcript.lock().await;
            let ok = transcript
                .iter()
                .filter(|t| t.status == StageStatus::Ok)
                .count();
            (ok, transcript.len() - ok)
        };

        SessionStats {
            state: self.state(),
            started_at: self.started_at,
            duration_secs: Utc::now()
                .signed_duration_since(self.started_at)
                .num_milliseconds() as f64
                / 1000.0,
            segments_captured: self.segments_captured.load(Ordering::SeqCst),
            transcripts_ok,
            transcripts_failed,
            summary_fragments: self.accumulator.fragment_count().await,
        }
    }

    /// Summarize the accumulated transcript on demand.
    ///
    /// Available in either trigger mode; this is the path behind the UI's
    /// summarize control. The result is also merged into the running summary
    /// while the session is live.
    pub async fn summarize_now(&self) -> Result<String, SessionError> {
        let (text, last_sequence) = {
            let transcript = self.transcript.lock().await;
            let parts: Vec<&str> = transcript
                .iter()
                .filter(|t| t.is_substantive())
                .map(|t| t.text.as_str())
                .collect();
            let last_sequence = transcript
                .iter()
                .filter(|t| t.is_substantive())
                .map(|t| t.sequence)
                .max()
                .unwrap_or(0);
            (parts.join("\n"), last_sequence)
        };

        if text.trim().is_empty() {
            return Err(SessionError::EmptyTranscript);
        }

        let summary = self.summarizer.summarize(&text).await?;

        if self.accepting.load(Ordering::SeqCst) {
            let fragment = SummaryFragment::ok(last_sequence, summary.clone());
            self.accumulator.merge(&fragment).await;
        }

        Ok(summary)
    }

    async fn supervise(self: Arc<Self>) {
        let mut states = self.transport.state_changes();

        loop {
            let call_state = *states.borrow_and_update();

            match (self.state(), call::is_ready(call_state)) {
                (SessionState::Inactive, true) => {
                    if let Err(e) = self.activate().await {
                        error!("Session activation failed: {}", e);
                        *self.last_error.lock().await = Some(e.to_string());
                        self.teardown().await;
                        return;
                    }
                }
                (SessionState::Active, false) => {
                    info!(
                        "Call {} left the joined state ({:?})",
                        self.config.call_id, call_state
                    );
                    self.teardown().await;
                    return;
                }
                (SessionState::Stopped, _) => return,
                _ => {}
            }

            if states.changed().await.is_err() {
                // Transport dropped; treat it as the call ending.
                if self.state() == SessionState::Active {
                    self.teardown().await;
                }
                return;
            }
        }
    }

    async fn activate(self: &Arc<Self>) -> Result<(), SessionError> {
        let _lifecycle = self.lifecycle.lock().await;

        if self.state() != SessionState::Inactive {
            return Ok(());
        }

        info!("Call {} joined, activating session", self.config.call_id);

        // Channel first: a failed attach must leave the device untouched.
        let guard = self.channels.attach(&self.config.call_id).await?;
        *self.channel_guard.lock().await = Some(guard);

        let backend = self
            .backend
            .lock()
            .await
            .take()
            .ok_or(SessionError::AlreadyStarted)?;

        let capturer = ChunkCapturer::new(CaptureConfig {
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            segment_duration_ms: self.config.segment_duration.as_millis() as u64,
        });

        // A capture failure leaves the attached channel to the teardown that
        // follows; detach still runs exactly once.
        let (handle, segments) = capturer.start(backend).await?;
        *self.capture.lock().await = Some(handle);

        self.accepting.store(true, Ordering::SeqCst);

        let this = Arc::clone(self);
        *self.dispatcher.lock().await =
            Some(tokio::spawn(async move { this.dispatch_segments(segments).await }));

        let _ = self.state.send(SessionState::Active);
        info!("Session {} active", self.config.call_id);

        Ok(())
    }

    async fn dispatch_segments(self: Arc<Self>, mut segments: mpsc::Receiver<AudioSegment>) {
        while let Some(segment) = segments.recv().await {
            self.segments_captured.fetch_add(1, Ordering::SeqCst);
            debug!(
                "Segment {} captured ({} bytes)",
                segment.sequence,
                segment.payload.len()
            );

            let this = Arc::clone(&self);
            self.inflight
                .lock()
                .await
                .spawn(async move { this.process_segment(segment).await });
        }

        debug!("Segment stream closed");
    }

    async fn process_segment(self: Arc<Self>, segment: AudioSegment) {
        let sequence = segment.sequence;

        let result = match self.transcriber.transcribe(&segment).await {
            Ok(text) => TranscriptResult::ok(sequence, text),
            Err(e) => {
                warn!("Transcription failed for segment {}: {}", sequence, e);
                TranscriptResult::failed(sequence)
            }
        };

        if self.accepting.load(Ordering::SeqCst) {
            self.transcript.lock().await.push(result.clone());
        }

        if !result.is_substantive() {
            debug!("Segment {} produced no usable transcript", sequence);
            return;
        }

        if self.config.summary_trigger != SummaryTrigger::Continuous {
            return;
        }

        let fragment = match self.summarizer.summarize(&result.text).await {
            Ok(summary) => SummaryFragment::ok(sequence, summary),
            Err(e) => {
                warn!("Summarization failed for segment {}: {}", sequence, e);
                SummaryFragment::failed(sequence)
            }
        };

        // A result landing after teardown would mutate a decommissioned
        // summary; drop it instead.
        if !self.accepting.load(Ordering::SeqCst) {
            debug!("Discarding fragment {} after session stop", sequence);
            return;
        }

        self.accumulator.merge(&fragment).await;
    }

    /// Drain and stop. The first trigger wins; every later call is a no-op,
    /// so detach runs exactly once no matter how many teardown paths fire.
    async fn teardown(&self) {
        let _lifecycle = self.lifecycle.lock().await;

        if matches!(
            self.state(),
            SessionState::Draining | SessionState::Stopped
        ) {
            return;
        }

        let _ = self.state.send(SessionState::Draining);
        info!("Session {} draining", self.config.call_id);

        // No new segments once the capture source stops.
        if let Some(mut handle) = self.capture.lock().await.take() {
            handle.stop().await;
        }

        // The segment channel is closed now; the dispatcher runs dry.
        if let Some(task) = self.dispatcher.lock().await.take() {
            if let Err(e) = task.await {
                error!("Segment dispatcher panicked: {}", e);
            }
        }

        self.drain_inflight().await;

        // Anything still running past the grace period reports into a
        // closed session.
        self.accepting.store(false, Ordering::SeqCst);

        if let Some(mut guard) = self.channel_guard.lock().await.take() {
            guard.detach().await;
        }

        let _ = self.state.send(SessionState::Stopped);
        info!("Session {} stopped", self.config.call_id);
    }

    /// Let in-flight segment work settle, up to the grace period.
    async fn drain_inflight(&self) {
        let mut inflight = self.inflight.lock().await;
        if inflight.is_empty() {
            return;
        }

        let drained = tokio::time::timeout(self.config.drain_grace, async {
            while let Some(result) = inflight.join_next().await {
                if let Err(e) = result {
                    if e.is_panic() {
                        error!("Pipeline task panicked: {}", e);
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                "Drain grace period elapsed with {} tasks in flight, abandoning them",
                inflight.len()
            );
            inflight.detach_all();
        }
    }
}
