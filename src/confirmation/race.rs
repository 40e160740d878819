use crate::provider::SnapshotProvider;
use crate::types::{Snapshot, SnapshotSource};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use log::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub snapshot: Snapshot,
    pub source: SnapshotSource,
}

/// Races one remote fetch against a fallback timer. Whichever settles first
/// is returned; the loser is dropped. Both legs are side-effect-free reads,
/// so dropping needs no cleanup.
pub async fn fetch_with_fallback<P: SnapshotProvider>(provider: &P, timeout: Duration) -> FetchOutcome {
    match select(provider.fetch(), Timer::after(timeout)).await {
        Either::First(snapshot) => {
            info!(
                "Remote snapshot received: {}%, {}h left",
                snapshot.brightness, snapshot.time_left
            );
            FetchOutcome {
                snapshot,
                source: SnapshotSource::Remote,
            }
        }
        Either::Second(()) => {
            warn!(
                "No snapshot within {}ms, falling back to powered-down state",
                timeout.as_millis()
            );
            FetchOutcome {
                snapshot: Snapshot::powered_down(),
                source: SnapshotSource::Fallback,
            }
        }
    }
}
