use super::messages::{CallStateMessage, ChatMessageEnvelope};
use crate::call::{CallState, CallTransport};
use crate::chat::{ChatClient, ChatMessage};
use anyhow::{Context, Result};
use async_nats::Client;
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// NATS-backed adapter for the call-transport and chat collaborators.
///
/// One client serves one call: it tracks `call.state.<call_id>` events and
/// relays `chat.message.<channel_id>` traffic for watched channels.
pub struct NatsClient {
    client: Client,
    call_id: String,
    call_state: watch::Receiver<CallState>,
    watches: Mutex<HashMap<String, WatchEntry>>,
}

struct WatchEntry {
    task: JoinHandle<()>,
    subscribers: Arc<Mutex<Vec<mpsc::Sender<ChatMessage>>>>,
}

impl NatsClient {
    /// Connect to NATS and begin tracking call state for `call_id`.
    pub async fn connect(url: &str, call_id: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        let (state_tx, state_rx) = watch::channel(CallState::Idle);
        let subject = format!("call.state.{}", call_id);
        let mut subscriber = client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to call state")?;

        let expected = call_id.clone();
        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<CallStateMessage>(&msg.payload) {
                    Ok(event) if event.call_id == expected => {
                        if state_tx.send(event.state).is_err() {
                            break;
                        }
                    }
                    Ok(event) => {
                        debug!("Ignoring state event for call {}", event.call_id);
                    }
                    Err(e) => warn!("Failed to parse call state message: {}", e),
                }
            }
        });

        info!("Connected to NATS, tracking call {}", call_id);

        Ok(Self {
            client,
            call_id,
            call_state: state_rx,
            watches: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait::async_trait]
impl CallTransport for NatsClient {
    fn call_id(&self) -> &str {
        &self.call_id
    }

    fn state_changes(&self) -> watch::Receiver<CallState> {
        self.call_state.clone()
    }

    async fn leave(&self) -> Result<()> {
        let subject = format!("call.control.{}.leave", self.call_id);
        self.client
            .publish(subject, "{}".into())
            .await
            .context("Failed to publish leave request")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatClient for NatsClient {
    async fn watch(&self, channel_id: &str) -> Result<()> {
        let mut watches = self.watches.lock().await;
        if watches.contains_key(channel_id) {
            debug!("Channel {} already watched", channel_id);
            return Ok(());
        }

        let subject = format!("chat.message.{}", channel_id);
        let mut subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .with_context(|| format!("Failed to watch {}", subject))?;

        let subscribers: Arc<Mutex<Vec<mpsc::Sender<ChatMessage>>>> =
            Arc::new(Mutex::new(Vec::new()));
        let fanout = Arc::clone(&subscribers);

        let task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let envelope = match serde_json::from_slice::<ChatMessageEnvelope>(&msg.payload) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!("Failed to parse chat message: {}", e);
                        continue;
                    }
                };

                let message = ChatMessage {
                    channel_id: envelope.channel_id,
                    sender: envelope.sender,
                    text: envelope.text,
                    sent_at: DateTime::parse_from_rfc3339(&envelope.timestamp)
                        .map(|t| t.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                };

                // Slow or dropped UI subscribers are pruned rather than
                // allowed to stall delivery.
                let mut subs = fanout.lock().await;
                subs.retain(|tx| tx.try_send(message.clone()).is_ok());
            }
        });

        watches.insert(channel_id.to_string(), WatchEntry { task, subscribers });

        info!("Watching chat channel {}", channel_id);
        Ok(())
    }

    async fn stop_watching(&self, channel_id: &str) -> Result<()> {
        let mut watches = self.watches.lock().await;
        match watches.remove(channel_id) {
            Some(entry) => {
                entry.task.abort();
                info!("Stopped watching chat channel {}", channel_id);
            }
            None => debug!("Channel {} was not watched", channel_id),
        }
        Ok(())
    }

    async fn messages(&self, channel_id: &str) -> Result<mpsc::Receiver<ChatMessage>> {
        let watches = self.watches.lock().await;
        let entry = watches
            .get(channel_id)
            .with_context(|| format!("Channel {} is not watched", channel_id))?;

        let (tx, rx) = mpsc::channel(64);
        entry.subscribers.lock().await.push(tx);
        Ok(rx)
    }

    async fn send_message(&self, channel_id: &str, sender: &str, text: &str) -> Result<()> {
        let subject = format!("chat.message.{}", channel_id);

        let envelope = ChatMessageEnvelope {
            channel_id: channel_id.to_string(),
            sender: sender.to_string(),
            text: text.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&envelope)?;

        self.client
            .publish(subject, payload.into())
            .await
            .context("Failed to publish chat message")?;

        Ok(())
    }
}
