use crate::call::CallState;
use serde::{Deserialize, Serialize};

/// Call lifecycle event published by the transport engine.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallStateMessage {
    pub call_id: String,
    pub state: CallState,
    pub timestamp: String, // RFC3339 timestamp
}

/// Chat message envelope on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageEnvelope {
    pub channel_id: String,
    pub sender: String,
    pub text: String,
    pub timestamp: String, // RFC3339 timestamp
}
