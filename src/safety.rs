use crate::state::WidgetStore;
use crate::types::{Mode, ModeSet, WidgetId, WidgetRecord};
use log::warn;

pub const FAIL_SAFE_INTENSITY: u8 = 0;
pub const FAIL_SAFE_MODE: Mode = Mode::Flashing;

pub fn fail_safe_record() -> WidgetRecord {
    WidgetRecord {
        intensity: FAIL_SAFE_INTENSITY,
        modes: ModeSet::only(FAIL_SAFE_MODE),
    }
}

/// Writes the hardware fallback state straight into the store. Goes around
/// the controller so the zero-intensity mode reset does not clear the
/// flashing indicator.
pub async fn force_fail_safe(store: &WidgetStore, id: &WidgetId) {
    warn!("SAFETY: {} unconfirmed - forcing {} at {}%", id, FAIL_SAFE_MODE.display_name(), FAIL_SAFE_INTENSITY);

    let record = fail_safe_record();
    store.set_intensity(id, record.intensity).await;
    store.set_mode_state(id, record.modes).await;
}
