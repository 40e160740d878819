//! Remote snapshot providers.
//!
//! The widgets only need a single asynchronous read of the backend state.
//! Latency and failure behaviour belong to the provider; callers race it
//! against a fallback timer instead of handling errors.

use crate::types::{Snapshot, SIMULATED_LATENCY_MS};
use embassy_time::{Duration, Timer};
use log::debug;

/// Source of authoritative widget state. Takes no input; may be slower than
/// any timeout the caller applies.
pub trait SnapshotProvider {
    async fn fetch(&self) -> Snapshot;
}

/// Answers with a fixed snapshot after a fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    latency: Duration,
    snapshot: Snapshot,
}

impl SimulatedProvider {
    pub fn new(latency: Duration, snapshot: Snapshot) -> Self {
        Self { latency, snapshot }
    }

    /// Canned backend state: 20% brightness, 12 hours left, dusk-till-dawn on.
    pub fn backend_default() -> Snapshot {
        Snapshot {
            brightness: 20,
            time_left: 12.0,
            night_vision: false,
            dusk_till_dawn: true,
            flashing: false,
        }
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(SIMULATED_LATENCY_MS),
            Self::backend_default(),
        )
    }
}

impl SnapshotProvider for SimulatedProvider {
    async fn fetch(&self) -> Snapshot {
        debug!("Simulated fetch, answering in {}ms", self.latency.as_millis());
        Timer::after(self.latency).await;
        self.snapshot.clone()
    }
}

/// Backend that never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl SnapshotProvider for OfflineProvider {
    async fn fetch(&self) -> Snapshot {
        core::future::pending().await
    }
}

/// Provider picked at startup from configuration.
#[derive(Debug, Clone)]
pub enum PanelProvider {
    Simulated(SimulatedProvider),
    Offline(OfflineProvider),
}

impl SnapshotProvider for PanelProvider {
    async fn fetch(&self) -> Snapshot {
        match self {
            PanelProvider::Simulated(provider) => provider.fetch().await,
            PanelProvider::Offline(provider) => provider.fetch().await,
        }
    }
}
