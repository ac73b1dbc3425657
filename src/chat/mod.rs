//! Chat-persistence collaborator contract and channel lifecycle
//!
//! This module provides:
//! - The `ChatClient` trait the external chat service is consumed through
//! - `ChannelLifecycleManager`, which binds a chat channel to the active call
//!   and hands out a release guard so detach runs on every teardown path
//!
//! Incoming messages are consumed by the UI layer; the audio pipeline never
//! reads them.

mod channel;

pub use channel::{ChannelBinding, ChannelGuard, ChannelLifecycleManager};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A single chat message delivered by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel_id: String,
    pub sender: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Chat-persistence collaborator.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Begin watching a channel. Incoming messages flow to `messages`
    /// subscribers once this resolves.
    async fn watch(&self, channel_id: &str) -> Result<()>;

    /// Stop watching. Must be safe to call for a channel that is not
    /// currently watched.
    async fn stop_watching(&self, channel_id: &str) -> Result<()>;

    /// Subscribe to incoming messages for a watched channel.
    async fn messages(&self, channel_id: &str) -> Result<mpsc::Receiver<ChatMessage>>;

    /// Send a message into the channel.
    async fn send_message(&self, channel_id: &str, sender: &str, text: &str) -> Result<()>;
}
