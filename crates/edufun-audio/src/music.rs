use std::path::Path;

use kira::manager::backend::DefaultBackend;
use kira::manager::{AudioManager, AudioManagerSettings};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings};
use kira::sound::PlaybackState;
use kira::tween::Tween;
use tracing::info;

use crate::error::AudioError;

/// A single looping music track that can be started, paused and rewound.
pub trait MusicOutput {
    /// Start or resume playback from the current position.
    fn play(&mut self) -> Result<(), AudioError>;

    /// Pause playback, keeping the current position.
    fn pause(&mut self);

    /// Move the playback position back to the start of the track.
    fn rewind(&mut self);

    /// Change the live output volume (0.0–1.0).
    fn set_volume(&mut self, volume: f64);
}

impl<T: MusicOutput + ?Sized> MusicOutput for Box<T> {
    fn play(&mut self) -> Result<(), AudioError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn rewind(&mut self) {
        (**self).rewind()
    }

    fn set_volume(&mut self, volume: f64) {
        (**self).set_volume(volume)
    }
}

/// Background music backed by kira. The whole track loops.
pub struct KiraMusic {
    manager: AudioManager<DefaultBackend>,
    data: StaticSoundData,
    current: Option<StaticSoundHandle>,
    volume: f64,
}

impl KiraMusic {
    /// Open the default audio device and decode the track at `path`.
    pub fn load(path: &Path, volume: f64) -> Result<Self, AudioError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::InitFailed(e.to_string()))?;
        let data = StaticSoundData::from_file(path)
            .map_err(|e| AudioError::LoadFailed(path.to_path_buf(), e.to_string()))?;

        info!("Loaded background music from {:?}", path);

        Ok(Self {
            manager,
            data,
            current: None,
            volume,
        })
    }
}

impl MusicOutput for KiraMusic {
    fn play(&mut self) -> Result<(), AudioError> {
        if let Some(ref mut handle) = self.current {
            if handle.state() != PlaybackState::Stopped {
                handle.resume(Tween::default());
                return Ok(());
            }
        }

        let settings = StaticSoundSettings::new()
            .volume(self.volume)
            .loop_region(..);
        let handle = self
            .manager
            .play(self.data.with_settings(settings))
            .map_err(|e| AudioError::PlaybackRejected(e.to_string()))?;

        self.current = Some(handle);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(ref mut handle) = self.current {
            handle.pause(Tween::default());
        }
    }

    fn rewind(&mut self) {
        if let Some(ref mut handle) = self.current {
            handle.seek_to(0.0);
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        if let Some(ref mut handle) = self.current {
            handle.set_volume(volume, Tween::default());
        }
    }
}

/// Output that produces no sound. Used when no audio device or track is
/// available so the rest of the settings flow keeps working.
#[derive(Debug, Default)]
pub struct SilentOutput {
    volume: f64,
}

impl SilentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl MusicOutput for SilentOutput {
    fn play(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn rewind(&mut self) {}

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
}
