//! Read-only projection of a widget for the rendering layer.

use crate::confirmation::ConfirmationPhase;
use crate::levels::{is_active, LEVEL_TABLE, LEVEL_COUNT};
use crate::metrics::{power_consumption, power_label};
use crate::types::{ModeSet, WidgetId, WidgetRecord, NIGHT_VISION_OPACITY_BOOST};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentTint {
    Navy,
    White,
}

impl SegmentTint {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            SegmentTint::Navy => (1, 1, 128),
            SegmentTint::White => (255, 255, 255),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentView {
    pub level: u8,
    pub active: bool,
    pub opacity: f32,
    pub tint: SegmentTint,
    pub dusk_till_dawn: bool,
    pub flashing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub id: WidgetId,
    pub intensity: u8,
    pub modes: ModeSet,
    pub remaining_time_label: String,
    pub power_consumption_percent: f32,
    pub power_label: String,
    pub phase: ConfirmationPhase,
    pub segments: [SegmentView; LEVEL_COUNT],
}

impl WidgetView {
    pub fn new(
        id: WidgetId,
        record: WidgetRecord,
        remaining_time_label: String,
        phase: ConfirmationPhase,
    ) -> Self {
        let power = power_consumption(f32::from(record.intensity), record.modes.any_active());

        Self {
            id,
            intensity: record.intensity,
            modes: record.modes,
            remaining_time_label,
            power_consumption_percent: power,
            power_label: power_label(power),
            phase,
            segments: segments(record.intensity, record.modes),
        }
    }

    pub fn active_segments(&self) -> usize {
        self.segments.iter().filter(|segment| segment.active).count()
    }
}

pub fn segments(intensity: u8, modes: ModeSet) -> [SegmentView; LEVEL_COUNT] {
    LEVEL_TABLE.map(|level| {
        let active = is_active(intensity, level.threshold);
        let base = if active { level.opacity } else { 0.0 };
        let opacity = if modes.night_vision && intensity != 0 {
            base + NIGHT_VISION_OPACITY_BOOST
        } else {
            base
        };

        SegmentView {
            level: level.threshold,
            active,
            opacity,
            tint: if modes.night_vision {
                SegmentTint::White
            } else {
                SegmentTint::Navy
            },
            dusk_till_dawn: modes.dusk_till_dawn,
            flashing: modes.flashing,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    #[test]
    fn test_dark_widget_has_no_active_segments() {
        let view = WidgetView::new(
            WidgetId::from("hall"),
            WidgetRecord::default(),
            "24 hours".to_string(),
            ConfirmationPhase::Idle,
        );
        assert_eq!(view.active_segments(), 0);
        assert!(view.segments.iter().all(|s| s.opacity == 0.0));
        assert_eq!(view.power_consumption_percent, 0.0);
        assert_eq!(view.power_label, "No Power Consumption");
    }

    #[test]
    fn test_night_vision_boosts_opacity() {
        let record = WidgetRecord {
            intensity: 1,
            modes: ModeSet::only(Mode::NightVision),
        };
        let segments = segments(record.intensity, record.modes);

        assert!(segments[0].active);
        assert!((segments[0].opacity - 0.45).abs() < 1e-6);
        assert_eq!(segments[0].tint, SegmentTint::White);
        assert_eq!(segments[0].tint.rgb(), (255, 255, 255));
        assert!(!segments[1].active);
        assert!((segments[1].opacity - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_mode_decorations() {
        let segments = segments(30, ModeSet::only(Mode::DuskTillDawn));
        assert_eq!(segments.iter().filter(|s| s.active).count(), 4);
        assert!(segments.iter().all(|s| s.dusk_till_dawn && !s.flashing));
        assert_eq!(segments[3].tint, SegmentTint::Navy);
    }

    #[test]
    fn test_power_includes_mode_surcharge() {
        let view = WidgetView::new(
            WidgetId::from("hall"),
            WidgetRecord {
                intensity: 30,
                modes: ModeSet::only(Mode::Flashing),
            },
            "12 hours".to_string(),
            ConfirmationPhase::Confirmed,
        );
        assert_eq!(view.power_consumption_percent, 40.0);
        assert_eq!(view.power_label, "Power Consumption: 40%");
    }
}
