//! Background music service
//!
//! Owns the audio controller together with the preference store so every
//! change is persisted before it is applied.

use edufun_audio::{AudioController, AudioPreference, Interaction, MusicOutput};
use tracing::info;

use crate::bus::SettingsEvent;
use crate::preferences::{
    load_audio_preference, save_audio_preference, PreferenceStore, MUSIC_ENABLED_KEY,
    MUSIC_VOLUME_KEY,
};

pub struct BackgroundMusic<M: MusicOutput, S: PreferenceStore> {
    controller: AudioController<M>,
    store: S,
}

impl<M: MusicOutput, S: PreferenceStore> BackgroundMusic<M, S> {
    /// Load preferences and prepare the controller. Playback waits for the
    /// first interaction.
    pub fn initialize(output: M, mut store: S) -> Self {
        let pref = load_audio_preference(&mut store);
        info!(
            "Background music ready (volume {:.2}, enabled {})",
            pref.music_volume, pref.music_enabled
        );
        Self {
            controller: AudioController::initialize(output, pref),
            store,
        }
    }

    pub fn notify_interaction(&mut self, interaction: Interaction) -> bool {
        self.controller.notify_interaction(interaction)
    }

    /// Slider change: persist, then apply.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = edufun_audio::clamp_volume(volume);
        self.store.set(MUSIC_VOLUME_KEY, &volume.to_string());
        self.controller.set_volume(volume);
    }

    /// Toggle change: persist, then apply.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.store.set(MUSIC_ENABLED_KEY, &enabled.to_string());
        self.controller.set_enabled(enabled);
    }

    /// Persist a whole preference and re-derive playback from it.
    pub fn apply_preference(&mut self, pref: &AudioPreference) {
        save_audio_preference(&mut self.store, pref);
        self.controller.apply(*pref);
    }

    /// Mirror an event published by another surface. The store is shared
    /// with the publisher, so nothing is written here.
    pub fn handle_event(&mut self, event: &SettingsEvent) {
        match event {
            SettingsEvent::AudioChanged(pref) => self.controller.apply(*pref),
            SettingsEvent::SignedOut => self.controller.stop(),
        }
    }

    /// Current preference as stored.
    pub fn preference(&mut self) -> AudioPreference {
        load_audio_preference(&mut self.store)
    }

    /// Stop playback and rewind; used on logout.
    pub fn teardown(&mut self) {
        self.controller.stop();
        info!("Background music stopped");
    }

    pub fn controller(&self) -> &AudioController<M> {
        &self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
