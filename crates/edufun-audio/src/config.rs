/// Audio preferences kept on the device. Maps to the three stored
/// preference keys (music volume, sound volume, music enabled).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioPreference {
    /// Background music volume (0.0–1.0).
    pub music_volume: f64,
    /// Sound effects volume (0.0–1.0).
    pub sound_volume: f64,
    /// Whether background music may play at all.
    pub music_enabled: bool,
}

impl Default for AudioPreference {
    fn default() -> Self {
        Self {
            music_volume: DEFAULT_VOLUME,
            sound_volume: DEFAULT_VOLUME,
            music_enabled: true,
        }
    }
}

/// Volume used for both channels when nothing is stored yet.
pub const DEFAULT_VOLUME: f64 = 0.5;

impl AudioPreference {
    /// Whether these preferences call for music to be audible.
    pub fn wants_playback(&self) -> bool {
        self.music_enabled && self.music_volume > 0.0
    }

    /// Copy with both volumes forced into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            music_volume: clamp_volume(self.music_volume),
            sound_volume: clamp_volume(self.sound_volume),
            music_enabled: self.music_enabled,
        }
    }
}

/// Clamp a volume into `[0, 1]`. NaN is treated as silence.
pub fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
