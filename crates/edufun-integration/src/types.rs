use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication response from `/v1/auth/login` and `/v1/auth/reauthenticate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserInfo,
}

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
}

/// Per-user profile document stored at `/v1/users/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProfileSettings>,
}

/// The nested `settings` object of a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<RemoteAudioSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_progress: Option<bool>,
    /// Older documents keep these two flags at the top of `settings`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_narration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_sounds: Option<bool>,
}

/// `settings.audio`, written whenever audio settings are saved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAudioSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sfx_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_music: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_narration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_sounds: Option<bool>,
}

/// `settings.notifications`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_profile_document() {
        let json = r#"{
            "childName": "Budi",
            "childAge": 9,
            "childGrade": "4",
            "avatar": "🦁",
            "points": 120,
            "createdAt": "2024-01-15T08:30:00Z",
            "settings": {
                "audio": { "musicVolume": 0.2, "backgroundMusic": false, "gameSounds": false },
                "notifications": { "enabled": true, "games": false },
                "saveProgress": false
            }
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.child_name.as_deref(), Some("Budi"));
        assert_eq!(profile.child_age, Some(9));
        assert_eq!(profile.points, Some(120));
        assert!(profile.created_at.is_some());

        let settings = profile.settings.as_ref().unwrap();
        assert_eq!(settings.save_progress, Some(false));
        let audio = settings.audio.as_ref().unwrap();
        assert_eq!(audio.music_volume, Some(0.2));
        assert_eq!(audio.background_music, Some(false));
        let notifications = settings.notifications.as_ref().unwrap();
        assert_eq!(notifications.games, Some(false));
        assert_eq!(notifications.progress, None);
    }

    #[test]
    fn test_empty_profile_document() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, UserProfile::default());
    }

    #[test]
    fn test_audio_settings_field_names() {
        let audio = RemoteAudioSettings {
            music_volume: Some(0.5),
            sfx_volume: Some(0.4),
            voice_volume: Some(0.4),
            sound_enabled: Some(true),
            background_music: Some(true),
            voice_narration: Some(false),
            game_sounds: Some(true),
        };
        let json = serde_json::to_value(&audio).unwrap();
        assert_eq!(json["sfxVolume"], 0.4);
        assert_eq!(json["backgroundMusic"], true);
        assert_eq!(json["voiceNarration"], false);
    }

    #[test]
    fn test_auth_response_serde() {
        let json = r#"{
            "token": "jwt123",
            "refreshToken": "ref456",
            "expiresIn": 3600,
            "user": { "_id": "u1", "email": "parent@example.com" }
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "jwt123");
        assert_eq!(resp.user.id, "u1");
        assert_eq!(resp.user.email, "parent@example.com");
    }
}
