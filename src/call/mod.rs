//! Call-transport collaborator contract and the call-state gate.
//!
//! The transport engine owns the call lifecycle; the core only reads its
//! state. Everything downstream of the gate stays inert until the call is
//! joined.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Lifecycle states reported by the external call-transport engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Idle,
    Joining,
    Joined,
    Reconnecting,
    Left,
    Failed,
}

/// True iff the call is in a state where pipeline work is permitted.
pub fn is_ready(state: CallState) -> bool {
    state == CallState::Joined
}

/// Handle to the external call-transport engine for one call.
#[async_trait::async_trait]
pub trait CallTransport: Send + Sync {
    /// Call identifier assigned when the call was created.
    fn call_id(&self) -> &str;

    /// Current state plus change notifications.
    fn state_changes(&self) -> watch::Receiver<CallState>;

    /// Ask the engine to leave the call. The resulting state change arrives
    /// through `state_changes`.
    async fn leave(&self) -> anyhow::Result<()>;
}
