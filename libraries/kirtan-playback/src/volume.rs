//! Volume and mute handling
//!
//! The slider works in percent (0-100), the media resource in a linear
//! `[0, 1]` level. Mute is a separate flag: muting snapshots the current
//! level so unmuting can restore it exactly.

use crate::types::PlayerState;
use serde::{Deserialize, Serialize};

/// Levels at or below this show the low-volume icon
const LOW_VOLUME_THRESHOLD: f32 = 0.5;

/// Convert a slider percentage to a linear level
///
/// Out-of-range and non-finite input is clamped.
pub fn percent_to_level(percent: f32) -> f32 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0) / 100.0
}

/// Icon tier shown on the mute button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTier {
    /// Muted or level at zero
    Off,
    Low,
    High,
}

impl PlayerState {
    /// Apply a new user level
    ///
    /// While muted the resource stays silent and the level becomes the one
    /// restored on unmute.
    pub(crate) fn set_volume_level(&mut self, level: f32) {
        self.volume = level;
        if self.is_muted {
            self.previous_volume = level;
        }
    }

    /// Mute, remembering the level to restore
    pub(crate) fn mute(&mut self) {
        if self.is_muted {
            return;
        }
        self.previous_volume = self.volume;
        self.is_muted = true;
    }

    /// Unmute, restoring the level captured by [`PlayerState::mute`]
    pub(crate) fn unmute(&mut self) {
        if !self.is_muted {
            return;
        }
        self.volume = self.previous_volume;
        self.is_muted = false;
    }

    /// Icon tier for the current volume
    pub fn volume_tier(&self) -> VolumeTier {
        let level = self.effective_volume();
        if level <= 0.0 {
            VolumeTier::Off
        } else if level <= LOW_VOLUME_THRESHOLD {
            VolumeTier::Low
        } else {
            VolumeTier::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerConfig;

    fn state() -> PlayerState {
        PlayerState::new(&PlayerConfig::default())
    }

    #[test]
    fn percent_conversion_clamps() {
        assert_eq!(percent_to_level(50.0), 0.5);
        assert_eq!(percent_to_level(150.0), 1.0);
        assert_eq!(percent_to_level(-5.0), 0.0);
        assert_eq!(percent_to_level(f32::NAN), 0.0);
    }

    #[test]
    fn mute_unmute_restores_level() {
        let mut state = state();
        state.set_volume_level(0.35);

        state.mute();
        assert!(state.is_muted);
        assert_eq!(state.effective_volume(), 0.0);
        assert_eq!(state.previous_volume, 0.35);

        state.unmute();
        assert!(!state.is_muted);
        assert_eq!(state.volume, 0.35);
    }

    #[test]
    fn zero_volume_round_trips_through_mute() {
        let mut state = state();
        state.set_volume_level(0.0);
        state.mute();
        state.unmute();
        assert_eq!(state.volume, 0.0);
    }

    #[test]
    fn volume_change_while_muted_is_restored_later() {
        let mut state = state();
        state.mute();
        state.set_volume_level(0.6);

        assert!(state.is_muted);
        assert_eq!(state.effective_volume(), 0.0);

        state.unmute();
        assert_eq!(state.volume, 0.6);
    }

    #[test]
    fn double_mute_keeps_first_snapshot() {
        let mut state = state();
        state.set_volume_level(0.8);
        state.mute();
        state.mute();
        state.unmute();
        assert_eq!(state.volume, 0.8);
    }

    #[test]
    fn volume_tiers() {
        let mut state = state();
        assert_eq!(state.volume_tier(), VolumeTier::High);

        state.set_volume_level(0.3);
        assert_eq!(state.volume_tier(), VolumeTier::Low);

        state.set_volume_level(0.0);
        assert_eq!(state.volume_tier(), VolumeTier::Off);

        state.set_volume_level(0.9);
        state.mute();
        assert_eq!(state.volume_tier(), VolumeTier::Off);
    }
}
