use super::ChatClient;
use crate::error::ChannelError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Binding of a chat channel to the active call.
#[derive(Debug, Clone)]
pub struct ChannelBinding {
    pub call_id: String,
    pub channel_id: String,
    pub attached: bool,
}

/// The channel id for a call. The mapping is 1:1.
fn channel_id_for(call_id: &str) -> String {
    call_id.to_string()
}

/// Owns attach/detach of the chat channel for a session.
///
/// At most one binding is attached per session; the guard returned by
/// `attach` must be released on every teardown path.
pub struct ChannelLifecycleManager {
    chat: Arc<dyn ChatClient>,
}

impl ChannelLifecycleManager {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }

    /// Attach the chat channel for `call_id`.
    pub async fn attach(&self, call_id: &str) -> Result<ChannelGuard, ChannelError> {
        if call_id.trim().is_empty() {
            return Err(ChannelError::InvalidCallId);
        }

        let channel_id = channel_id_for(call_id);

        self.chat
            .watch(&channel_id)
            .await
            .map_err(|e| ChannelError::Watch {
                channel_id: channel_id.clone(),
                message: e.to_string(),
            })?;

        info!("Attached chat channel {}", channel_id);

        Ok(ChannelGuard {
            chat: Arc::clone(&self.chat),
            binding: ChannelBinding {
                call_id: call_id.to_string(),
                channel_id,
                attached: true,
            },
        })
    }
}

/// Release handle returned by a successful attach.
///
/// `detach` is idempotent and never propagates collaborator errors; it runs
/// during cleanup where there is nobody left to handle them.
pub struct ChannelGuard {
    chat: Arc<dyn ChatClient>,
    binding: ChannelBinding,
}

impl std::fmt::Debug for ChannelGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelGuard")
            .field("binding", &self.binding)
            .finish()
    }
}

impl ChannelGuard {
    pub fn binding(&self) -> &ChannelBinding {
        &self.binding
    }

    /// Stop watching the channel. Safe to call more than once.
    pub async fn detach(&mut self) {
        if !self.binding.attached {
            debug!("Channel {} already detached", self.binding.channel_id);
            return;
        }
        self.binding.attached = false;

        match self.chat.stop_watching(&self.binding.channel_id).await {
            Ok(()) => info!("Detached chat channel {}", self.binding.channel_id),
            Err(e) => warn!(
                "Failed to stop watching channel {}: {}",
                self.binding.channel_id, e
            ),
        }
    }
}
