use tracing::{debug, warn};

use crate::config::{clamp_volume, AudioPreference};
use crate::music::MusicOutput;
use crate::unlock::{AutoplayGate, Interaction};

/// Owns the single background music output and keeps its play/pause state
/// consistent with the volume and enabled flag.
///
/// After every settings change `is_playing() == (volume > 0 && enabled)`,
/// unless the output rejected playback, in which case the next change retries.
pub struct AudioController<M: MusicOutput> {
    output: M,
    volume: f64,
    enabled: bool,
    playing: bool,
    gate: AutoplayGate,
}

impl<M: MusicOutput> AudioController<M> {
    /// Set up the controller from stored preferences without starting playback.
    /// Playback waits for the first user interaction; nothing is armed when
    /// music is disabled.
    pub fn initialize(mut output: M, pref: AudioPreference) -> Self {
        let pref = pref.clamped();
        output.set_volume(pref.music_volume);

        let gate = if pref.music_enabled {
            AutoplayGate::armed()
        } else {
            debug!("Background music disabled by settings");
            AutoplayGate::disarmed()
        };

        Self {
            output,
            volume: pref.music_volume,
            enabled: pref.music_enabled,
            playing: false,
            gate,
        }
    }

    /// Forward a user interaction. Returns `true` if it unlocked playback.
    pub fn notify_interaction(&mut self, interaction: Interaction) -> bool {
        if !self.gate.fire(interaction) {
            return false;
        }
        debug!("Autoplay unlocked by {:?}", interaction);
        if self.volume > 0.0 && self.enabled && !self.playing {
            self.start();
        }
        true
    }

    /// Change the music volume. Zero pauses without rewinding; a positive
    /// volume resumes if music is enabled.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = clamp_volume(volume);
        self.volume = volume;
        self.output.set_volume(volume);

        if volume > 0.0 && self.enabled && !self.playing {
            self.start();
        } else if volume == 0.0 {
            self.pause();
        }
    }

    /// Enable or disable background music.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pause();
        } else if self.volume > 0.0 && !self.playing {
            self.start();
        }
    }

    /// Apply a whole preference at once, as after a save.
    pub fn apply(&mut self, pref: AudioPreference) {
        let pref = pref.clamped();
        self.enabled = pref.music_enabled;
        self.set_volume(pref.music_volume);
        if !self.enabled {
            self.pause();
        }
    }

    /// Pause and rewind to the beginning of the track.
    pub fn stop(&mut self) {
        self.gate.disarm();
        self.output.pause();
        self.output.rewind();
        self.playing = false;
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether playback is still waiting for a first interaction.
    pub fn awaiting_interaction(&self) -> bool {
        self.gate.is_armed()
    }

    pub fn output(&self) -> &M {
        &self.output
    }

    fn start(&mut self) {
        // A settings change counts as the unlocking interaction.
        self.gate.disarm();
        match self.output.play() {
            Ok(()) => self.playing = true,
            Err(e) => {
                warn!("Background music could not start: {}", e);
                self.playing = false;
            }
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.output.pause();
        }
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;

    #[derive(Debug, Default)]
    struct RecordingOutput {
        plays: u32,
        pauses: u32,
        rewinds: u32,
        volume: f64,
        reject: bool,
    }

    impl MusicOutput for RecordingOutput {
        fn play(&mut self) -> Result<(), AudioError> {
            if self.reject {
                return Err(AudioError::PlaybackRejected("not allowed".into()));
            }
            self.plays += 1;
            Ok(())
        }

        fn pause(&mut self) {
            self.pauses += 1;
        }

        fn rewind(&mut self) {
            self.rewinds += 1;
        }

        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
    }

    fn controller(pref: AudioPreference) -> AudioController<RecordingOutput> {
        AudioController::initialize(RecordingOutput::default(), pref)
    }

    #[test]
    fn initialize_defers_playback() {
        let c = controller(AudioPreference::default());
        assert!(!c.is_playing());
        assert!(c.awaiting_interaction());
        assert_eq!(c.output().plays, 0);
        assert_eq!(c.output().volume, 0.5);
    }

    #[test]
    fn first_interaction_starts_music_once() {
        let mut c = controller(AudioPreference::default());
        assert!(c.notify_interaction(Interaction::Touch));
        assert!(c.is_playing());
        assert!(!c.notify_interaction(Interaction::Click));
        assert!(!c.notify_interaction(Interaction::Key));
        assert_eq!(c.output().plays, 1);
    }

    #[test]
    fn disabled_music_never_arms_the_gate() {
        let mut c = controller(AudioPreference {
            music_enabled: false,
            ..Default::default()
        });
        assert!(!c.awaiting_interaction());
        assert!(!c.notify_interaction(Interaction::Click));
        assert!(!c.is_playing());
    }

    #[test]
    fn interaction_with_zero_volume_consumes_gate_without_playing() {
        let mut c = controller(AudioPreference {
            music_volume: 0.0,
            ..Default::default()
        });
        assert!(c.notify_interaction(Interaction::Click));
        assert!(!c.is_playing());
        assert!(!c.awaiting_interaction());
    }

    #[test]
    fn playing_follows_volume_and_enabled() {
        for enabled in [true, false] {
            for step in 0..=10 {
                let v = step as f64 / 10.0;
                let mut c = controller(AudioPreference {
                    music_enabled: enabled,
                    ..Default::default()
                });
                c.set_volume(v);
                assert_eq!(c.is_playing(), v > 0.0 && enabled, "v={v} enabled={enabled}");
                assert_eq!(c.volume(), v);
                assert_eq!(c.output().volume, v);
            }
        }
    }

    #[test]
    fn zero_volume_pauses_without_rewind() {
        let mut c = controller(AudioPreference::default());
        c.set_volume(0.8);
        assert!(c.is_playing());
        c.set_volume(0.0);
        assert!(!c.is_playing());
        assert_eq!(c.output().pauses, 1);
        assert_eq!(c.output().rewinds, 0);

        c.set_volume(0.3);
        assert!(c.is_playing());
        assert_eq!(c.output().plays, 2);
    }

    #[test]
    fn toggling_enabled() {
        let mut c = controller(AudioPreference::default());
        c.set_volume(0.6);
        c.set_enabled(false);
        assert!(!c.is_playing());
        c.set_enabled(true);
        assert!(c.is_playing());

        c.set_volume(0.0);
        c.set_enabled(true);
        assert!(!c.is_playing());
    }

    #[test]
    fn apply_whole_preference() {
        let mut c = controller(AudioPreference::default());
        c.apply(AudioPreference {
            music_volume: 0.4,
            sound_volume: 0.1,
            music_enabled: true,
        });
        assert!(c.is_playing());
        assert_eq!(c.volume(), 0.4);

        c.apply(AudioPreference {
            music_volume: 0.4,
            sound_volume: 0.1,
            music_enabled: false,
        });
        assert!(!c.is_playing());
        assert!(!c.is_enabled());
    }

    #[test]
    fn stop_rewinds() {
        let mut c = controller(AudioPreference::default());
        c.set_volume(0.7);
        c.stop();
        assert!(!c.is_playing());
        assert_eq!(c.output().rewinds, 1);
        assert!(!c.notify_interaction(Interaction::Click));
    }

    #[test]
    fn rejected_playback_is_not_fatal() {
        let output = RecordingOutput {
            reject: true,
            ..Default::default()
        };
        let mut c = AudioController::initialize(output, AudioPreference::default());
        c.set_volume(0.9);
        assert!(!c.is_playing());
        assert_eq!(c.volume(), 0.9);

        c.set_enabled(false);
        assert!(!c.is_enabled());
    }

    #[test]
    fn out_of_range_volume_is_clamped() {
        let mut c = controller(AudioPreference::default());
        c.set_volume(4.0);
        assert_eq!(c.volume(), 1.0);
        c.set_volume(-1.0);
        assert_eq!(c.volume(), 0.0);
        assert!(!c.is_playing());
    }
}
