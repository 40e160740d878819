use crate::types::{Mode, ModeSet, WidgetId, WidgetRecord, MAX_INTENSITY};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

pub type WidgetMap = HashMap<WidgetId, WidgetRecord>;

/// Authoritative id -> record mapping. Cloning shares the same map; every
/// controller is handed a clone instead of reaching for ambient state.
/// An id with no entry reads as the default record.
#[derive(Clone)]
pub struct WidgetStore {
    widgets: Arc<Mutex<CriticalSectionRawMutex, WidgetMap>>,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self {
            widgets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn set_intensity(&self, id: &WidgetId, intensity: u8) {
        let intensity = intensity.min(MAX_INTENSITY);
        let mut widgets = self.widgets.lock().await;
        let record = widgets.entry(id.clone()).or_default();
        if record.intensity != intensity {
            debug!("{}: intensity {} -> {}", id, record.intensity, intensity);
        }
        record.intensity = intensity;
    }

    /// Clears every flag, then turns `mode` on unless it was already on.
    pub async fn toggle_mode(&self, id: &WidgetId, mode: Mode) {
        let mut widgets = self.widgets.lock().await;
        let record = widgets.entry(id.clone()).or_default();
        let was_active = record.modes.get(mode);

        record.modes = ModeSet::default();
        record.modes.set(mode, !was_active);

        info!(
            "{}: {} {}",
            id,
            mode.display_name(),
            if was_active { "OFF" } else { "ON" }
        );
    }

    pub async fn set_mode_state(&self, id: &WidgetId, modes: ModeSet) {
        let mut widgets = self.widgets.lock().await;
        widgets.entry(id.clone()).or_default().modes = modes;
    }

    /// Does not create a record for an unknown id.
    pub async fn reset_modes(&self, id: &WidgetId) {
        let mut widgets = self.widgets.lock().await;
        if let Some(record) = widgets.get_mut(id) {
            if record.modes.any_active() {
                debug!("{}: modes reset", id);
            }
            record.modes = ModeSet::default();
        }
    }

    pub async fn get(&self, id: &WidgetId) -> WidgetRecord {
        let widgets = self.widgets.lock().await;
        widgets.get(id).copied().unwrap_or_default()
    }

    pub async fn get_intensity(&self, id: &WidgetId) -> u8 {
        self.get(id).await.intensity
    }

    pub async fn get_modes(&self, id: &WidgetId) -> ModeSet {
        self.get(id).await.modes
    }

    pub async fn contains(&self, id: &WidgetId) -> bool {
        let widgets = self.widgets.lock().await;
        widgets.contains_key(id)
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}
