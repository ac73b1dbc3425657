use super::{StageStatus, SummaryFragment};
use tokio::sync::Mutex;
use tracing::debug;

/// Append-only running summary exposed to the UI.
///
/// Fragments are appended in completion order: when round trips for
/// different segments finish out of order, the later-finishing fragment
/// lands later regardless of capture order. Merges are serialized; reads are
/// point-in-time snapshots that never observe a half-written append.
#[derive(Default)]
pub struct SummaryAccumulator {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    text: String,
    fragments: usize,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment. Failed or empty fragments are ignored.
    pub async fn merge(&self, fragment: &SummaryFragment) {
        if fragment.status == StageStatus::Failed || fragment.text.trim().is_empty() {
            debug!("Skipping fragment {} (failed or empty)", fragment.sequence);
            return;
        }

        let mut inner = self.inner.lock().await;
        inner.text.push('\n');
        inner.text.push_str(&fragment.text);
        inner.fragments += 1;
    }

    /// Snapshot of the running summary.
    pub async fn current_summary(&self) -> String {
        self.inner.lock().await.text.clone()
    }

    /// Number of fragments merged so far.
    pub async fn fragment_count(&self) -> usize {
        self.inner.lock().await.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn merges_in_arrival_order() {
        let accumulator = SummaryAccumulator::new();

        accumulator
            .merge(&SummaryFragment::ok(2, "second finished first".to_string()))
            .await;
        accumulator
            .merge(&SummaryFragment::ok(1, "first finished later".to_string()))
            .await;

        assert_eq!(
            accumulator.current_summary().await,
            "\nsecond finished first\nfirst finished later"
        );
        assert_eq!(accumulator.fragment_count().await, 2);
    }

    #[tokio::test]
    async fn failed_and_empty_fragments_are_ignored() {
        let accumulator = SummaryAccumulator::new();

        accumulator.merge(&SummaryFragment::failed(0)).await;
        accumulator
            .merge(&SummaryFragment::ok(1, "   ".to_string()))
            .await;

        assert_eq!(accumulator.current_summary().await, "");
        assert_eq!(accumulator.fragment_count().await, 0);
    }

    #[tokio::test]
    async fn summary_is_append_only() {
        let accumulator = SummaryAccumulator::new();

        accumulator
            .merge(&SummaryFragment::ok(0, "alpha".to_string()))
            .await;
        let snapshot = accumulator.current_summary().await;

        accumulator
            .merge(&SummaryFragment::ok(1, "beta".to_string()))
            .await;
        let later = accumulator.current_summary().await;

        assert!(later.starts_with(&snapshot));
    }
}
