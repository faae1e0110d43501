//! The settings screen session
//!
//! Loads the profile once, keeps the merged settings, and runs every save
//! and account action against the profile repository, the auth service and
//! the background music.

use chrono::Utc;
use edufun_audio::{Interaction, MusicOutput};
use edufun_integration::{AuthService, IntegrationError, ProfileRepository, ProfileUpdate, UserInfo};
use tracing::{info, warn};

use crate::bus::{SettingsBus, SettingsEvent};
use crate::error::SettingsError;
use crate::music::BackgroundMusic;
use crate::preferences::PreferenceStore;
use crate::reconcile::{reconcile, AudioForm, MergedSettings, NotificationToggles};
use crate::state::{Redirect, SessionState};
use crate::validation::{validate_password_change, validate_profile, ProfileForm, ValidProfile};

pub struct SettingsSession<R, A, M, S>
where
    R: ProfileRepository,
    A: AuthService,
    M: MusicOutput,
    S: PreferenceStore,
{
    profiles: R,
    auth: A,
    music: BackgroundMusic<M, S>,
    bus: SettingsBus,
    state: SessionState,
    merged: Option<MergedSettings>,
}

impl<R, A, M, S> SettingsSession<R, A, M, S>
where
    R: ProfileRepository,
    A: AuthService,
    M: MusicOutput,
    S: PreferenceStore,
{
    pub fn new(profiles: R, auth: A, music: BackgroundMusic<M, S>, bus: SettingsBus) -> Self {
        Self {
            profiles,
            auth,
            music,
            bus,
            state: SessionState::Loading,
            merged: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Settings as last loaded or saved
    pub fn merged(&self) -> Option<&MergedSettings> {
        self.merged.as_ref()
    }

    pub fn music(&self) -> &BackgroundMusic<M, S> {
        &self.music
    }

    pub fn bus(&self) -> &SettingsBus {
        &self.bus
    }

    fn require_user(&mut self) -> Result<UserInfo, SettingsError> {
        match self.auth.current_user() {
            Some(user) => Ok(user),
            None => {
                warn!("No active session, redirecting to login");
                self.state = SessionState::Unauthenticated;
                Err(SettingsError::NotAuthenticated)
            }
        }
    }

    /// Convert a remote failure. A session the server no longer accepts is
    /// left for the login page.
    fn remote<T>(&mut self, result: Result<T, IntegrationError>) -> Result<T, SettingsError> {
        result.map_err(|e| {
            let err = SettingsError::from(e);
            if matches!(err, SettingsError::NotAuthenticated) {
                warn!("Session rejected by the server, redirecting to login");
                self.state = SessionState::Unauthenticated;
            }
            err
        })
    }

    /// Read the profile once and merge it with local preferences.
    pub async fn load(&mut self) -> Result<MergedSettings, SettingsError> {
        let user = self.require_user()?;
        info!("User signed in: {}", user.email);

        let read = self.profiles.read().await;
        let Some(profile) = self.remote(read)? else {
            warn!("No profile document for {}", user.id);
            self.state = SessionState::NoProfile;
            return Err(SettingsError::NoProfile);
        };

        let local = self.music.preference();
        let merged = reconcile(&profile, &user, &local);
        self.merged = Some(merged.clone());
        self.state = SessionState::Ready;
        Ok(merged)
    }

    /// Forward a click, key press or touch to the autoplay gate.
    pub fn notify_interaction(&mut self, interaction: Interaction) -> bool {
        self.music.notify_interaction(interaction)
    }

    /// Live slider change: persisted locally and mirrored to other surfaces.
    pub fn set_music_volume(&mut self, volume: f64) {
        self.music.set_volume(volume);
        self.publish_audio();
    }

    /// Live music toggle: persisted locally and mirrored to other surfaces.
    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music.set_enabled(enabled);
        self.publish_audio();
    }

    fn publish_audio(&mut self) {
        let pref = self.music.preference();
        if let Some(merged) = self.merged.as_mut() {
            merged.audio.music_volume = pref.music_volume;
            merged.audio.background_music = pref.music_enabled;
            merged.audio.sound_enabled = pref.music_enabled;
        }
        self.bus.publish(SettingsEvent::AudioChanged(pref));
    }

    /// Validate and write the child profile.
    pub async fn save_profile(&mut self, form: &ProfileForm) -> Result<ValidProfile, SettingsError> {
        self.require_user()?;
        let profile = validate_profile(form)?;

        let update = ProfileUpdate::new()
            .set("childName", &profile.child_name)?
            .set("childAge", &profile.child_age)?
            .set("childGrade", &profile.child_grade)?
            .set("avatar", &profile.avatar)?
            .touched(Utc::now())?;
        let written = self.profiles.merge(&update).await;
        self.remote(written)?;

        if let Some(merged) = self.merged.as_mut() {
            merged.profile.child_name = profile.child_name.clone();
            merged.profile.child_age = Some(profile.child_age);
            merged.profile.child_grade = profile.child_grade.clone();
            merged.profile.avatar = profile.avatar.clone();
        }
        info!("Profile saved for {}", profile.child_name);
        Ok(profile)
    }

    /// Persist the audio form locally, re-derive playback, then write
    /// `settings.audio` remotely.
    pub async fn save_audio(&mut self, form: &AudioForm) -> Result<(), SettingsError> {
        self.require_user()?;

        let pref = form.preference();
        self.music.apply_preference(&pref);
        self.bus.publish(SettingsEvent::AudioChanged(pref));
        if let Some(merged) = self.merged.as_mut() {
            merged.audio = *form;
        }

        let update = ProfileUpdate::new()
            .set("settings.audio", &form.to_remote())?
            .touched(Utc::now())?;
        let written = self.profiles.merge(&update).await;
        self.remote(written)?;

        info!("Audio settings saved");
        Ok(())
    }

    /// Write `settings.notifications`. Nothing is kept locally.
    pub async fn save_notifications(&mut self, toggles: &NotificationToggles) -> Result<(), SettingsError> {
        self.require_user()?;

        let update = ProfileUpdate::new()
            .set("settings.notifications", &toggles.to_remote())?
            .touched(Utc::now())?;
        let written = self.profiles.merge(&update).await;
        self.remote(written)?;

        if let Some(merged) = self.merged.as_mut() {
            merged.notifications = *toggles;
        }
        info!("Notification settings saved");
        Ok(())
    }

    /// Confirm the current password, then replace it.
    pub async fn change_password(
        &mut self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), SettingsError> {
        validate_password_change(current, new, confirm)?;
        self.require_user()?;

        let confirmed = self.auth.reauthenticate(current).await;
        self.remote(confirmed)?;
        let changed = self.auth.change_password(new).await;
        self.remote(changed)?;
        info!("Password changed");
        Ok(())
    }

    /// Remove the profile document. The account stays and can sign in again.
    pub async fn delete_data(&mut self) -> Result<Redirect, SettingsError> {
        self.require_user()?;

        let deleted = self.profiles.delete().await;
        self.remote(deleted)?;
        self.merged = None;
        self.state = SessionState::DataDeleted;
        info!("Profile data deleted");
        Ok(Redirect::Dashboard)
    }

    /// Stop the music and end the session.
    pub async fn logout(&mut self) -> Result<Redirect, SettingsError> {
        self.music.teardown();
        self.bus.publish(SettingsEvent::SignedOut);

        self.auth.sign_out().await?;
        self.merged = None;
        self.state = SessionState::SignedOut;
        info!("User logged out");
        Ok(Redirect::Login)
    }
}
