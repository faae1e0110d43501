//! Merging local preferences with the remote profile
//!
//! Local preferences decide volume and whether music plays. The remote
//! document decides every structured setting it carries; absent fields keep
//! the form defaults (everything enabled). Profile fields are passed through.

use chrono::{DateTime, Utc};
use edufun_audio::AudioPreference;
use edufun_integration::{NotificationSettings, RemoteAudioSettings, UserInfo, UserProfile};

use crate::validation::ProfileForm;

/// Values shown in the audio panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioForm {
    pub music_volume: f64,
    pub sound_volume: f64,
    pub voice_volume: f64,
    pub sound_enabled: bool,
    pub background_music: bool,
    pub voice_narration: bool,
    pub game_sounds: bool,
}

impl AudioForm {
    /// The part of the form kept in local preferences
    pub fn preference(&self) -> AudioPreference {
        AudioPreference {
            music_volume: self.music_volume,
            sound_volume: self.sound_volume,
            music_enabled: self.background_music,
        }
        .clamped()
    }

    /// Contents of `settings.audio`
    pub fn to_remote(&self) -> RemoteAudioSettings {
        let pref = self.preference();
        RemoteAudioSettings {
            music_volume: Some(pref.music_volume),
            sfx_volume: Some(pref.sound_volume),
            voice_volume: Some(edufun_audio::clamp_volume(self.voice_volume)),
            sound_enabled: Some(self.sound_enabled),
            background_music: Some(self.background_music),
            voice_narration: Some(self.voice_narration),
            game_sounds: Some(self.game_sounds),
        }
    }
}

/// Values shown in the notifications panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationToggles {
    pub enabled: bool,
    pub progress: bool,
    pub achievements: bool,
    pub games: bool,
    pub reminders: bool,
}

impl Default for NotificationToggles {
    fn default() -> Self {
        Self {
            enabled: true,
            progress: true,
            achievements: true,
            games: true,
            reminders: true,
        }
    }
}

impl NotificationToggles {
    /// Contents of `settings.notifications`
    pub fn to_remote(&self) -> NotificationSettings {
        NotificationSettings {
            enabled: Some(self.enabled),
            progress: Some(self.progress),
            achievements: Some(self.achievements),
            games: Some(self.games),
            reminders: Some(self.reminders),
        }
    }

    fn overridden_by(self, remote: Option<&NotificationSettings>) -> Self {
        let Some(remote) = remote else {
            return self;
        };
        Self {
            enabled: remote.enabled.unwrap_or(self.enabled),
            progress: remote.progress.unwrap_or(self.progress),
            achievements: remote.achievements.unwrap_or(self.achievements),
            games: remote.games.unwrap_or(self.games),
            reminders: remote.reminders.unwrap_or(self.reminders),
        }
    }
}

/// Child profile and account details, projected straight from the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub child_name: String,
    pub child_age: Option<u32>,
    pub child_grade: String,
    pub avatar: String,
    pub email: String,
    pub joined_at: Option<DateTime<Utc>>,
    pub points: Option<i64>,
}

impl ProfileView {
    /// Join date as shown on the account panel, e.g. "Monday, 15 January 2024"
    pub fn join_date_label(&self) -> Option<String> {
        self.joined_at
            .map(|at| at.format("%A, %-d %B %Y").to_string())
    }

    pub fn points_label(&self) -> Option<String> {
        self.points.map(|p| format!("{} points", p))
    }

    /// Pre-filled profile form
    pub fn to_form(&self) -> ProfileForm {
        ProfileForm {
            child_name: self.child_name.clone(),
            child_age: self.child_age.map(|a| a.to_string()).unwrap_or_default(),
            child_grade: self.child_grade.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Everything the settings screen shows after loading
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSettings {
    pub profile: ProfileView,
    pub audio: AudioForm,
    pub notifications: NotificationToggles,
    pub save_progress: bool,
}

/// Merge the remote profile with local audio preferences.
pub fn reconcile(profile: &UserProfile, account: &UserInfo, local: &AudioPreference) -> MergedSettings {
    let local = local.clamped();
    let settings = profile.settings.as_ref();
    let remote_audio: Option<&RemoteAudioSettings> = settings.and_then(|s| s.audio.as_ref());

    let voice_narration = remote_audio
        .and_then(|a| a.voice_narration)
        .or_else(|| settings.and_then(|s| s.voice_narration))
        .unwrap_or(true);
    let game_sounds = remote_audio
        .and_then(|a| a.game_sounds)
        .or_else(|| settings.and_then(|s| s.game_sounds))
        .unwrap_or(true);

    let audio = AudioForm {
        music_volume: local.music_volume,
        sound_volume: local.sound_volume,
        voice_volume: local.sound_volume,
        sound_enabled: local.music_enabled,
        background_music: local.music_enabled,
        voice_narration,
        game_sounds,
    };

    let notifications =
        NotificationToggles::default().overridden_by(settings.and_then(|s| s.notifications.as_ref()));
    let save_progress = settings.and_then(|s| s.save_progress).unwrap_or(true);

    let profile = ProfileView {
        child_name: profile.child_name.clone().unwrap_or_default(),
        child_age: profile.child_age,
        child_grade: profile.child_grade.clone().unwrap_or_default(),
        avatar: profile.avatar.clone().unwrap_or_default(),
        email: account.email.clone(),
        joined_at: profile.created_at,
        points: profile.points,
    };

    MergedSettings {
        profile,
        audio,
        notifications,
        save_progress,
    }
}
