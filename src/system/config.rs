//! Panel configuration, loaded once at startup

use crate::provider::{OfflineProvider, PanelProvider, SimulatedProvider};
use crate::types::{WidgetId, FETCH_TIMEOUT_MS, GUARD_TIMEOUT_MS, MAX_WIDGETS, SIMULATED_LATENCY_MS};
use anyhow::{bail, Context};
use embassy_time::Duration;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Simulated,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub latency_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Simulated,
            latency_ms: SIMULATED_LATENCY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub widget_ids: Vec<WidgetId>,
    pub fetch_timeout_ms: u64,
    pub guard_timeout_ms: u64,
    pub provider: ProviderConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            widget_ids: (1..=MAX_WIDGETS)
                .map(|n| WidgetId::new(format!("widget-{}", n)))
                .collect(),
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
            guard_timeout_ms: GUARD_TIMEOUT_MS,
            provider: ProviderConfig::default(),
        }
    }
}

impl PanelConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("loading config {}", path.display()))?;
        info!("Loaded config from {} ({} widgets)", path.display(), config.widget_ids.len());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let config: PanelConfig = serde_json::from_str(raw).context("parsing panel config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.widget_ids.is_empty() {
            bail!("at least one widget id is required");
        }
        if self.widget_ids.len() > MAX_WIDGETS {
            bail!(
                "{} widgets configured, at most {} supported",
                self.widget_ids.len(),
                MAX_WIDGETS
            );
        }

        let mut seen = HashSet::new();
        for id in &self.widget_ids {
            if id.as_str().trim().is_empty() {
                bail!("widget ids must not be empty");
            }
            if !seen.insert(id) {
                bail!("duplicate widget id '{}'", id);
            }
        }

        if self.fetch_timeout_ms == 0 || self.guard_timeout_ms == 0 {
            bail!("timeouts must be greater than zero");
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn guard_timeout(&self) -> Duration {
        Duration::from_millis(self.guard_timeout_ms)
    }

    pub fn build_provider(&self) -> PanelProvider {
        match self.provider.kind {
            ProviderKind::Simulated => PanelProvider::Simulated(SimulatedProvider::new(
                Duration::from_millis(self.provider.latency_ms),
                SimulatedProvider::backend_default(),
            )),
            ProviderKind::Offline => PanelProvider::Offline(OfflineProvider),
        }
    }
}
