use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque widget identifier. Supplied by configuration, never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    NightVision,
    DuskTillDawn,
    Flashing,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::NightVision, Mode::DuskTillDawn, Mode::Flashing];

    /// Human readable label shown next to the mode switch.
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::NightVision => "Night Vision",
            Mode::DuskTillDawn => "Dusk Till Dawn",
            Mode::Flashing => "Flashing",
        }
    }
}

/// The three operating overlays. At most one flag is set at a time; the
/// toggle operation keeps it that way, construction does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeSet {
    pub night_vision: bool,
    pub dusk_till_dawn: bool,
    pub flashing: bool,
}

impl ModeSet {
    pub fn only(mode: Mode) -> Self {
        let mut modes = Self::default();
        modes.set(mode, true);
        modes
    }

    pub fn get(&self, mode: Mode) -> bool {
        match mode {
            Mode::NightVision => self.night_vision,
            Mode::DuskTillDawn => self.dusk_till_dawn,
            Mode::Flashing => self.flashing,
        }
    }

    pub fn set(&mut self, mode: Mode, enabled: bool) {
        match mode {
            Mode::NightVision => self.night_vision = enabled,
            Mode::DuskTillDawn => self.dusk_till_dawn = enabled,
            Mode::Flashing => self.flashing = enabled,
        }
    }

    pub fn any_active(&self) -> bool {
        self.night_vision || self.dusk_till_dawn || self.flashing
    }

    pub fn active_count(&self) -> usize {
        Mode::ALL.iter().filter(|mode| self.get(**mode)).count()
    }

    /// The active mode, if exactly one is set.
    pub fn active(&self) -> Option<Mode> {
        if self.active_count() == 1 {
            Mode::ALL.into_iter().find(|mode| self.get(*mode))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub intensity: u8,
    pub modes: ModeSet,
}

/// Authoritative widget state as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub brightness: u8,
    /// Hours of battery left
    pub time_left: f32,
    pub night_vision: bool,
    pub dusk_till_dawn: bool,
    pub flashing: bool,
}

impl Snapshot {
    /// Adopted when the backend does not answer before the fetch timeout.
    pub fn powered_down() -> Self {
        Self {
            brightness: 0,
            time_left: 24.0,
            night_vision: false,
            dusk_till_dawn: false,
            flashing: false,
        }
    }

    pub fn modes(&self) -> ModeSet {
        ModeSet {
            night_vision: self.night_vision,
            dusk_till_dawn: self.dusk_till_dawn,
            flashing: self.flashing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotSource {
    Remote,
    Fallback,
}

pub const MAX_INTENSITY: u8 = 100;
pub const MAX_WIDGETS: usize = 8;
pub const FETCH_TIMEOUT_MS: u64 = 5000;
pub const GUARD_TIMEOUT_MS: u64 = 5000;
pub const SIMULATED_LATENCY_MS: u64 = 2000;
pub const NIGHT_VISION_OPACITY_BOOST: f32 = 0.25;
pub const MODE_POWER_SURCHARGE: f32 = 10.0;
