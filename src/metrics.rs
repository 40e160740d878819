//! Derived presentation values: remaining-time estimates and power draw.

use crate::types::MODE_POWER_SURCHARGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingTime {
    UnderOneHour,
    TwelveHours,
    TwentyFourHours,
}

impl RemainingTime {
    pub fn label(&self) -> &'static str {
        match self {
            RemainingTime::UnderOneHour => "<1 hour",
            RemainingTime::TwelveHours => "12 hours",
            RemainingTime::TwentyFourHours => "24 hours",
        }
    }
}

/// Coarse three-bucket estimate. This is the one wired to the widgets.
pub fn remaining_time(intensity: u8) -> RemainingTime {
    if intensity == 100 {
        RemainingTime::UnderOneHour
    } else if intensity >= 30 {
        RemainingTime::TwelveHours
    } else {
        RemainingTime::TwentyFourHours
    }
}

const BASE_BATTERY_HOURS: f32 = 24.0;

// (intensity, divisor of the base battery life)
const BATTERY_ANCHORS: [(f32, f32); 7] = [
    (1.0, 1.0),
    (3.0, 1.5),
    (10.0, 2.5),
    (20.0, 3.0),
    (30.0, 4.0),
    (50.0, 6.0),
    (100.0, 24.0),
];

/// Finer estimate interpolated between battery anchors, floored to whole
/// hours. Not used by the widgets; kept for callers that want more detail.
pub fn interpolated_time_left(intensity: f32) -> String {
    let hours_at = |divisor: f32| BASE_BATTERY_HOURS / divisor;

    if let Some((_, divisor)) = BATTERY_ANCHORS.iter().find(|(level, _)| *level == intensity) {
        return format!("{} hours", hours_at(*divisor).floor());
    }

    let lower = BATTERY_ANCHORS.iter().rev().find(|(level, _)| *level < intensity);
    let higher = BATTERY_ANCHORS.iter().find(|(level, _)| *level > intensity);

    match (lower, higher) {
        (Some((low_level, low_div)), Some((high_level, high_div))) => {
            let low_time = hours_at(*low_div);
            let high_time = hours_at(*high_div);
            let time = low_time
                + (high_time - low_time) * (intensity - low_level) / (high_level - low_level);
            format!("{} hours", time.floor())
        }
        (Some((_, low_div)), None) => format!("{} hours", hours_at(*low_div).floor()),
        _ => "N/A".to_string(),
    }
}

/// Stepped power draw in percent. Buckets are open below and closed above,
/// except the first which is exactly zero. Any active mode adds a flat 10.
pub fn power_consumption(intensity: f32, any_mode_active: bool) -> f32 {
    let base = if intensity <= 0.0 {
        0.0
    } else if intensity <= 1.0 {
        5.0
    } else if intensity <= 3.0 {
        10.0
    } else if intensity <= 10.0 {
        12.5
    } else if intensity <= 20.0 {
        20.0
    } else if intensity <= 30.0 {
        30.0
    } else if intensity <= 60.0 {
        55.0
    } else if intensity <= 80.0 {
        75.0
    } else if intensity <= 90.0 {
        85.0
    } else {
        90.0
    };

    if any_mode_active {
        base + MODE_POWER_SURCHARGE
    } else {
        base
    }
}

pub fn power_label(percent: f32) -> String {
    if percent > 0.0 {
        format!("Power Consumption: {}%", percent)
    } else {
        "No Power Consumption".to_string()
    }
}
