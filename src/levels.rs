//! Fixed intensity breakpoints and the segment weights derived from them.

use crate::types::MAX_INTENSITY;
use heapless::Vec;

pub const LEVEL_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub threshold: u8,
    pub opacity: f32,
}

pub const LEVEL_TABLE: [Level; LEVEL_COUNT] = [
    Level { threshold: 1, opacity: 0.2 },
    Level { threshold: 3, opacity: 0.3 },
    Level { threshold: 10, opacity: 0.4 },
    Level { threshold: 30, opacity: 0.5 },
    Level { threshold: 100, opacity: 1.0 },
];

/// A segment at breakpoint `level` is lit iff `intensity >= level`.
pub fn is_active(intensity: u8, threshold: u8) -> bool {
    intensity >= threshold
}

/// Breakpoints lit at `intensity`, in ascending order.
pub fn active_levels(intensity: u8) -> Vec<u8, LEVEL_COUNT> {
    LEVEL_TABLE
        .iter()
        .map(|level| level.threshold)
        .filter(|threshold| is_active(intensity, *threshold))
        .collect()
}

pub fn opacity_for(threshold: u8) -> Option<f32> {
    LEVEL_TABLE
        .iter()
        .find(|level| level.threshold == threshold)
        .map(|level| level.opacity)
}

/// Smallest breakpoint strictly above `intensity`, saturating at 100.
pub fn step_up(intensity: u8) -> u8 {
    LEVEL_TABLE
        .iter()
        .map(|level| level.threshold)
        .find(|threshold| *threshold > intensity)
        .unwrap_or(MAX_INTENSITY)
}

/// Largest breakpoint strictly below `intensity`, saturating at 0.
pub fn step_down(intensity: u8) -> u8 {
    LEVEL_TABLE
        .iter()
        .rev()
        .map(|level| level.threshold)
        .find(|threshold| *threshold < intensity)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_levels() {
        assert!(active_levels(0).is_empty());
        assert_eq!(active_levels(1).as_slice(), &[1]);
        assert_eq!(active_levels(29).as_slice(), &[1, 3, 10]);
        assert_eq!(active_levels(100).as_slice(), &[1, 3, 10, 30, 100]);
    }

    #[test]
    fn test_step_up() {
        assert_eq!(step_up(0), 1);
        assert_eq!(step_up(1), 3);
        assert_eq!(step_up(20), 30);
        assert_eq!(step_up(99), 100);
        assert_eq!(step_up(100), 100);
    }

    #[test]
    fn test_step_down() {
        assert_eq!(step_down(0), 0);
        assert_eq!(step_down(1), 0);
        assert_eq!(step_down(3), 1);
        assert_eq!(step_down(20), 10);
        assert_eq!(step_down(100), 30);
    }

    #[test]
    fn test_step_up_then_down_stays_at_or_below() {
        for start in 0..=100u8 {
            let up = step_up(start);
            let down = step_down(up);
            assert!(down <= up);
            assert!(up >= start);
        }
    }

    #[test]
    fn test_opacity_lookup() {
        assert_eq!(opacity_for(30), Some(0.5));
        assert_eq!(opacity_for(100), Some(1.0));
        assert_eq!(opacity_for(50), None);
    }
}
