// Mock collaborators shared by the integration tests.
//
// Each external service from the session core's point of view (call
// transport, chat persistence, capture device, transcription, summarization)
// gets a scriptable stand-in with injectable latency and failures.
#![allow(dead_code)]

use async_trait::async_trait;
use huddle::audio::{AudioFrame, AudioSegment, CaptureBackend};
use huddle::call::{CallState, CallTransport};
use huddle::chat::{ChatClient, ChatMessage};
use huddle::error::{CaptureError, PipelineError};
use huddle::pipeline::{SummarizationBackend, TranscriptionBackend};
use huddle::session::{
    SessionConfig, SessionOrchestrator, SessionState, SummaryTrigger,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};

// ============================================================================
// Call transport
// ============================================================================

pub struct MockTransport {
    call_id: String,
    state_tx: watch::Sender<CallState>,
    leave_requests: AtomicUsize,
}

impl MockTransport {
    pub fn new(call_id: &str) -> Arc<Self> {
        let (state_tx, _) = watch::channel(CallState::Idle);
        Arc::new(Self {
            call_id: call_id.to_string(),
            state_tx,
            leave_requests: AtomicUsize::new(0),
        })
    }

    pub fn set_state(&self, state: CallState) {
        let _ = self.state_tx.send(state);
    }

    pub fn leave_requests(&self) -> usize {
        self.leave_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CallTransport for MockTransport {
    fn call_id(&self) -> &str {
        &self.call_id
    }

    fn state_changes(&self) -> watch::Receiver<CallState> {
        self.state_tx.subscribe()
    }

    async fn leave(&self) -> anyhow::Result<()> {
        self.leave_requests.fetch_add(1, Ordering::SeqCst);
        let _ = self.state_tx.send(CallState::Left);
        Ok(())
    }
}

// ============================================================================
// Chat persistence
// ============================================================================

pub struct RecordingChat {
    pub watches: Mutex<Vec<String>>,
    pub stops: Mutex<Vec<String>>,
    fail_watch: bool,
    fail_stop: bool,
}

impl RecordingChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            watches: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
            fail_watch: false,
            fail_stop: false,
        })
    }

    pub fn failing_watch() -> Arc<Self> {
        Arc::new(Self {
            watches: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
            fail_watch: true,
            fail_stop: false,
        })
    }

    pub fn failing_stop() -> Arc<Self> {
        Arc::new(Self {
            watches: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
            fail_watch: false,
            fail_stop: true,
        })
    }

    pub async fn watch_count(&self) -> usize {
        self.watches.lock().await.len()
    }

    pub async fn stop_count(&self) -> usize {
        self.stops.lock().await.len()
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn watch(&self, channel_id: &str) -> anyhow::Result<()> {
        if self.fail_watch {
            anyhow::bail!("chat service refused the watch request");
        }
        self.watches.lock().await.push(channel_id.to_string());
        Ok(())
    }

    async fn stop_watching(&self, channel_id: &str) -> anyhow::Result<()> {
        self.stops.lock().await.push(channel_id.to_string());
        if self.fail_stop {
            anyhow::bail!("chat service hung up during stop");
        }
        Ok(())
    }

    async fn messages(&self, _channel_id: &str) -> anyhow::Result<mpsc::Receiver<ChatMessage>> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send_message(
        &self,
        _channel_id: &str,
        _sender: &str,
        _text: &str,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Capture device
// ============================================================================

#[derive(Clone)]
pub struct BackendProbe {
    pub started: Arc<AtomicBool>,
    pub stopped: Arc<AtomicBool>,
}

impl BackendProbe {
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Backend whose frames are pushed in by the test.
pub struct ScriptedBackend {
    rx: Option<mpsc::Receiver<AudioFrame>>,
    fail_start: bool,
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl ScriptedBackend {
    pub fn new() -> (Self, mpsc::Sender<AudioFrame>, BackendProbe) {
        let (tx, rx) = mpsc::channel(64);
        let started = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));
        let probe = BackendProbe {
            started: Arc::clone(&started),
            stopped: Arc::clone(&stopped),
        };
        (
            Self {
                rx: Some(rx),
                fail_start: false,
                started,
                stopped,
            },
            tx,
            probe,
        )
    }

    pub fn unavailable() -> (Self, BackendProbe) {
        let started = Arc::new(AtomicBool::new(false));
        let stopped = Arc::new(AtomicBool::new(false));
        let probe = BackendProbe {
            started: Arc::clone(&started),
            stopped: Arc::clone(&stopped),
        };
        (
            Self {
                rx: None,
                fail_start: true,
                started,
                stopped,
            },
            probe,
        )
    }
}

#[async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if self.fail_start {
            return Err(CaptureError::DeviceUnavailable(
                "microphone access denied".to_string(),
            ));
        }
        self.started.store(true, Ordering::SeqCst);
        self.rx
            .take()
            .ok_or_else(|| CaptureError::Backend("already started".to_string()))
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Transcription
// ============================================================================

pub struct StubTranscriber {
    responses: Mutex<HashMap<u64, (Duration, Result<String, PipelineError>)>>,
    calls: AtomicUsize,
}

impl StubTranscriber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Script the response for one segment sequence number.
    pub async fn script(
        &self,
        sequence: u64,
        delay: Duration,
        result: Result<String, PipelineError>,
    ) {
        self.responses
            .lock()
            .await
            .insert(sequence, (delay, result));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionBackend for StubTranscriber {
    async fn transcribe(&self, segment: &AudioSegment) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.responses.lock().await.remove(&segment.sequence);
        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            // Unscripted segments transcribe as silence.
            None => Ok(String::new()),
        }
    }
}

// ============================================================================
// Summarization
// ============================================================================

enum SummarizerMode {
    /// Answers `sum(<input>)` so tests can see exactly what was summarized.
    Echo,
    Scripted(VecDeque<Result<String, PipelineError>>),
}

pub struct StubSummarizer {
    mode: Mutex<SummarizerMode>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubSummarizer {
    pub fn echo() -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(SummarizerMode::Echo),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn echo_with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(SummarizerMode::Echo),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn scripted(responses: Vec<Result<String, PipelineError>>) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(SummarizerMode::Scripted(responses.into())),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummarizationBackend for StubSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut mode = self.mode.lock().await;
        match &mut *mode {
            SummarizerMode::Echo => Ok(format!("sum({})", text)),
            SummarizerMode::Scripted(responses) => responses
                .pop_front()
                .unwrap_or_else(|| Ok("(no summary)".to_string())),
        }
    }
}

// ============================================================================
// Session wiring and helpers
// ============================================================================

pub struct TestSession {
    pub orchestrator: Arc<SessionOrchestrator>,
    pub transport: Arc<MockTransport>,
    pub chat: Arc<RecordingChat>,
    pub frames: mpsc::Sender<AudioFrame>,
    pub probe: BackendProbe,
    pub transcriber: Arc<StubTranscriber>,
    pub summarizer: Arc<StubSummarizer>,
}

/// One-second segments at 16kHz mono, so a 16000-sample frame is exactly one
/// segment.
pub fn test_session(
    call_id: &str,
    trigger: SummaryTrigger,
    summarizer: Arc<StubSummarizer>,
    drain_grace: Duration,
) -> TestSession {
    test_session_with_chat(call_id, trigger, summarizer, drain_grace, RecordingChat::new())
}

pub fn test_session_with_chat(
    call_id: &str,
    trigger: SummaryTrigger,
    summarizer: Arc<StubSummarizer>,
    drain_grace: Duration,
    chat: Arc<RecordingChat>,
) -> TestSession {
    let transport = MockTransport::new(call_id);
    let (backend, frames, probe) = ScriptedBackend::new();
    let transcriber = StubTranscriber::new();

    let config = SessionConfig {
        call_id: call_id.to_string(),
        segment_duration: Duration::from_secs(1),
        sample_rate: 16_000,
        channels: 1,
        summary_trigger: trigger,
        drain_grace,
    };

    let orchestrator = Arc::new(SessionOrchestrator::new(
        config,
        transport.clone() as Arc<dyn CallTransport>,
        chat.clone() as Arc<dyn ChatClient>,
        Box::new(backend),
        transcriber.clone() as Arc<dyn TranscriptionBackend>,
        summarizer.clone() as Arc<dyn SummarizationBackend>,
    ));

    TestSession {
        orchestrator,
        transport,
        chat,
        frames,
        probe,
        transcriber,
        summarizer,
    }
}

pub fn audio_frame(samples: Vec<i16>) -> AudioFrame {
    AudioFrame {
        samples,
        sample_rate: 16_000,
        channels: 1,
        timestamp_ms: 0,
    }
}

/// Exactly one segment's worth of audio for the test session config.
pub fn one_segment_of_audio(value: i16) -> AudioFrame {
    audio_frame(vec![value; 16_000])
}

pub async fn wait_for_state(orchestrator: &SessionOrchestrator, target: SessionState) {
    let mut states = orchestrator.state_changes();
    let reached = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            if *states.borrow_and_update() == target {
                break;
            }
            if states.changed().await.is_err() {
                break;
            }
        }
    })
    .await;

    assert!(
        reached.is_ok(),
        "session never reached {:?}, still {:?}",
        target,
        orchestrator.state()
    );
}

pub async fn wait_for_transcripts(orchestrator: &SessionOrchestrator, count: usize) {
    for _ in 0..300 {
        if orchestrator.transcript().await.len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {} transcripts, got {}",
        count,
        orchestrator.transcript().await.len()
    );
}

pub async fn wait_for_fragments(orchestrator: &SessionOrchestrator, count: usize) {
    for _ in 0..300 {
        if orchestrator.stats().await.summary_fragments >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {} summary fragments, got {}",
        count,
        orchestrator.stats().await.summary_fragments
    );
}
