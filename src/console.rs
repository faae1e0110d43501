//! Line-based settings console
//!
//! A terminal stand-in for the settings page: each line is one form action.

use edufun_audio::{Interaction, MusicOutput};
use edufun_integration::{AuthService, ProfileRepository};
use thiserror::Error;
use tracing::error;

use crate::error::SettingsError;
use crate::notice::Notice;
use crate::preferences::PreferenceStore;
use crate::reconcile::MergedSettings;
use crate::session::SettingsSession;
use crate::validation::{ProfileForm, MAX_CHILD_AGE, MIN_CHILD_AGE};

pub const HELP: &str = "\
commands:
  show                               print current settings
  click | key | touch                simulate a user interaction
  volume <0-100>                     move the music slider
  music on|off                       toggle background music
  profile <name> <age> [grade] [avatar]
  save-audio                         save the audio panel
  notify <enabled|progress|achievements|games|reminders> on|off
  password <current> <new> <confirm>
  delete                             delete all profile data
  logout
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationField {
    Enabled,
    Progress,
    Achievements,
    Games,
    Reminders,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Show,
    Interact(Interaction),
    Volume(f64),
    Music(bool),
    Profile(ProfileForm),
    SaveAudio,
    Notify(NotificationField, bool),
    Password {
        current: String,
        new: String,
        confirm: String,
    },
    Delete,
    Logout,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

fn parse_switch(word: Option<&str>, usage: &'static str) -> Result<bool, CommandError> {
    match word {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Help);
    };

    let command = match head {
        "help" => Command::Help,
        "show" => Command::Show,
        "click" => Command::Interact(Interaction::Click),
        "key" => Command::Interact(Interaction::Key),
        "touch" => Command::Interact(Interaction::Touch),
        "volume" => {
            let raw = words.next().ok_or(CommandError::Usage("volume <0-100>"))?;
            let percent: f64 = raw
                .parse()
                .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
            Command::Volume(percent / 100.0)
        }
        "music" => Command::Music(parse_switch(words.next(), "music on|off")?),
        "profile" => {
            let usage = "profile <name> <age> [grade] [avatar]";
            let child_name = words.next().ok_or(CommandError::Usage(usage))?;
            let child_age = words.next().ok_or(CommandError::Usage(usage))?;
            Command::Profile(ProfileForm {
                child_name: child_name.to_string(),
                child_age: child_age.to_string(),
                child_grade: words.next().unwrap_or_default().to_string(),
                avatar: words.next().unwrap_or_default().to_string(),
            })
        }
        "save-audio" => Command::SaveAudio,
        "notify" => {
            let usage = "notify <enabled|progress|achievements|games|reminders> on|off";
            let field = match words.next() {
                Some("enabled") => NotificationField::Enabled,
                Some("progress") => NotificationField::Progress,
                Some("achievements") => NotificationField::Achievements,
                Some("games") => NotificationField::Games,
                Some("reminders") => NotificationField::Reminders,
                _ => return Err(CommandError::Usage(usage)),
            };
            Command::Notify(field, parse_switch(words.next(), usage)?)
        }
        "password" => {
            let usage = "password <current> <new> <confirm>";
            let mut next = || words.next().map(str::to_string).ok_or(CommandError::Usage(usage));
            Command::Password {
                current: next()?,
                new: next()?,
                confirm: next()?,
            }
        }
        "delete" => Command::Delete,
        "logout" => Command::Logout,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

/// Result of running one command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    /// Lines to print
    pub output: Vec<String>,
    /// Notice to show, if the command produced one
    pub notice: Option<Notice>,
    /// Whether the console should exit
    pub exit: bool,
}

impl Step {
    fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Default::default()
        }
    }

    fn failed(err: &SettingsError, action: &str) -> Self {
        error!("Failed to {}: {}", action, err);
        Self::notice(Notice::from_error(err, action))
    }
}

/// Render merged settings as console lines.
pub fn describe(settings: &MergedSettings) -> Vec<String> {
    let p = &settings.profile;
    let a = &settings.audio;
    let n = &settings.notifications;
    let flag = |b: bool| if b { "on" } else { "off" };

    vec![
        format!(
            "child: {} (age {}, grade {}) {}",
            p.child_name,
            p.child_age.map(|age| age.to_string()).unwrap_or_else(|| "-".into()),
            p.child_grade,
            p.avatar
        ),
        format!(
            "account: {} joined {} {}",
            p.email,
            p.join_date_label().unwrap_or_else(|| "-".into()),
            p.points_label().unwrap_or_default()
        ),
        format!(
            "audio: music {:.0}% sound {:.0}% voice {:.0}% | music {} narration {} game sounds {}",
            a.music_volume * 100.0,
            a.sound_volume * 100.0,
            a.voice_volume * 100.0,
            flag(a.background_music),
            flag(a.voice_narration),
            flag(a.game_sounds)
        ),
        format!(
            "notifications: {} (progress {}, achievements {}, games {}, reminders {}) | save progress {}",
            flag(n.enabled),
            flag(n.progress),
            flag(n.achievements),
            flag(n.games),
            flag(n.reminders),
            flag(settings.save_progress)
        ),
    ]
}

/// Run one command against the session. A command that ends the session
/// also asks the console to exit.
pub async fn run_command<R, A, M, S>(session: &mut SettingsSession<R, A, M, S>, command: Command) -> Step
where
    R: ProfileRepository,
    A: AuthService,
    M: MusicOutput,
    S: PreferenceStore,
{
    let mut step = execute(session, command).await;
    if !step.exit {
        if let Some(redirect) = session.state().redirect() {
            step.output.push(format!("redirecting to {}", redirect.path()));
            step.exit = true;
        }
    }
    step
}

async fn execute<R, A, M, S>(session: &mut SettingsSession<R, A, M, S>, command: Command) -> Step
where
    R: ProfileRepository,
    A: AuthService,
    M: MusicOutput,
    S: PreferenceStore,
{
    // Every command is a user interaction as far as autoplay is concerned.
    if !matches!(command, Command::Interact(_)) {
        session.notify_interaction(Interaction::Key);
    }

    match command {
        Command::Help => Step {
            output: HELP.lines().map(str::to_string).collect(),
            ..Default::default()
        },
        Command::Show => match session.merged() {
            Some(settings) if session.state().is_personalized() => Step {
                output: describe(settings),
                ..Default::default()
            },
            _ => Step::notice(Notice::from_error(&SettingsError::NoProfile, "show settings")),
        },
        Command::Interact(interaction) => {
            let unlocked = session.notify_interaction(interaction);
            let line = if unlocked {
                "music unlocked"
            } else {
                "ok"
            };
            Step {
                output: vec![line.to_string()],
                ..Default::default()
            }
        }
        Command::Volume(volume) => {
            session.set_music_volume(volume);
            let controller = session.music().controller();
            Step {
                output: vec![format!(
                    "music {:.0}% ({})",
                    controller.volume() * 100.0,
                    if controller.is_playing() { "playing" } else { "paused" }
                )],
                ..Default::default()
            }
        }
        Command::Music(enabled) => {
            session.set_music_enabled(enabled);
            Step::default()
        }
        Command::Profile(form) => match session.save_profile(&form).await {
            Ok(_) => Step::notice(Notice::success("Changes saved", "Child profile updated")),
            Err(e) => {
                let mut step = Step::failed(&e, "save the profile");
                if matches!(&e, SettingsError::Validation(v) if v.is_age()) {
                    step.output.push(format!(
                        "check the age field ({}-{})",
                        MIN_CHILD_AGE, MAX_CHILD_AGE
                    ));
                }
                step
            }
        },
        Command::SaveAudio => {
            let Some(form) = session.merged().map(|m| m.audio) else {
                return Step::notice(Notice::from_error(&SettingsError::NoProfile, "save audio settings"));
            };
            match session.save_audio(&form).await {
                Ok(()) => Step::notice(Notice::success("Settings saved", "Audio settings saved")),
                Err(e) => Step::failed(&e, "save audio settings"),
            }
        }
        Command::Notify(field, on) => {
            let Some(mut toggles) = session.merged().map(|m| m.notifications) else {
                return Step::notice(Notice::from_error(
                    &SettingsError::NoProfile,
                    "save notification settings",
                ));
            };
            match field {
                NotificationField::Enabled => toggles.enabled = on,
                NotificationField::Progress => toggles.progress = on,
                NotificationField::Achievements => toggles.achievements = on,
                NotificationField::Games => toggles.games = on,
                NotificationField::Reminders => toggles.reminders = on,
            }
            match session.save_notifications(&toggles).await {
                Ok(()) => Step::notice(Notice::success("Settings saved", "Notification settings saved")),
                Err(e) => Step::failed(&e, "save notification settings"),
            }
        }
        Command::Password {
            current,
            new,
            confirm,
        } => match session.change_password(&current, &new, &confirm).await {
            Ok(()) => Step::notice(Notice::success("Password changed", "Password updated")),
            Err(e) => Step::failed(&e, "change the password"),
        },
        Command::Delete => match session.delete_data().await {
            Ok(redirect) => Step {
                output: vec![format!("redirecting to {}", redirect.path())],
                notice: Some(Notice::success("Data deleted", "All profile data was deleted")),
                exit: true,
            },
            Err(e) => Step::failed(&e, "delete data"),
        },
        Command::Logout => match session.logout().await {
            Ok(redirect) => Step {
                output: vec![format!("redirecting to {}", redirect.path())],
                notice: Some(Notice::success("Done", "Logged out")),
                exit: true,
            },
            Err(e) => Step::failed(&e, "log out"),
        },
        Command::Quit => Step {
            exit: true,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SettingsBus;
    use crate::music::BackgroundMusic;
    use crate::notice::NoticeKind;
    use crate::preferences::MemoryPreferenceStore;
    use edufun_audio::SilentOutput;
    use edufun_integration::{MemoryAuth, MemoryProfileRepository, UserInfo};
    use serde_json::json;

    #[test]
    fn parse_basic_commands() {
        assert_eq!(parse_command("show"), Ok(Command::Show));
        assert_eq!(parse_command(""), Ok(Command::Help));
        assert_eq!(parse_command("touch"), Ok(Command::Interact(Interaction::Touch)));
        assert_eq!(parse_command("volume 70"), Ok(Command::Volume(0.7)));
        assert_eq!(parse_command("music off"), Ok(Command::Music(false)));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert_eq!(
            parse_command("notify games off"),
            Ok(Command::Notify(NotificationField::Games, false))
        );
    }

    #[test]
    fn parse_profile_and_password() {
        assert_eq!(
            parse_command("profile Rina 9 4"),
            Ok(Command::Profile(ProfileForm {
                child_name: "Rina".into(),
                child_age: "9".into(),
                child_grade: "4".into(),
                avatar: String::new(),
            }))
        );
        assert_eq!(
            parse_command("password old abcdef abcdef"),
            Ok(Command::Password {
                current: "old".into(),
                new: "abcdef".into(),
                confirm: "abcdef".into(),
            })
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_command("dance"), Err(CommandError::Unknown("dance".into())));
        assert_eq!(parse_command("volume loud"), Err(CommandError::InvalidNumber("loud".into())));
        assert!(matches!(parse_command("music maybe"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_command("password a b"), Err(CommandError::Usage(_))));
        assert!(matches!(parse_command("profile Rina"), Err(CommandError::Usage(_))));
    }

    fn session() -> (
        SettingsSession<MemoryProfileRepository, MemoryAuth, SilentOutput, MemoryPreferenceStore>,
        MemoryProfileRepository,
    ) {
        let repo = MemoryProfileRepository::with_document(json!({ "childName": "Rina", "childAge": 9 }));
        let auth = MemoryAuth::signed_in(
            UserInfo {
                id: "u1".into(),
                email: "parent@example.com".into(),
            },
            "secret1",
        );
        let music = BackgroundMusic::initialize(SilentOutput::new(), MemoryPreferenceStore::new());
        (
            SettingsSession::new(repo.clone(), auth, music, SettingsBus::new()),
            repo,
        )
    }

    #[tokio::test]
    async fn show_and_save_commands() {
        let (mut session, repo) = session();
        session.load().await.unwrap();

        let step = run_command(&mut session, Command::Show).await;
        assert!(step.output[0].contains("Rina"));
        assert!(session.music().controller().is_playing());

        let step = run_command(&mut session, parse_command("profile Rina 13").unwrap()).await;
        assert_eq!(step.output, vec!["check the age field (7-12)".to_string()]);
        assert!(!step.exit);
        let notice = step.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "age must be at most 12");
        assert_eq!(repo.write_count(), 0);

        let step = run_command(&mut session, Command::SaveAudio).await;
        assert_eq!(step.notice.unwrap().kind, NoticeKind::Success);
        assert_eq!(repo.document().unwrap()["settings"]["audio"]["musicVolume"], 0.5);
    }

    #[tokio::test]
    async fn rejected_session_exits_to_login() {
        let (mut session, repo) = session();
        session.load().await.unwrap();
        repo.revoke_access();

        let step = run_command(&mut session, parse_command("notify games off").unwrap()).await;
        assert!(step.exit);
        assert_eq!(step.output, vec!["redirecting to login.html".to_string()]);
        assert_eq!(step.notice.unwrap().kind, NoticeKind::Warning);
    }

    #[tokio::test]
    async fn show_before_load_reports_missing_profile() {
        let (mut session, _) = session();
        let step = run_command(&mut session, Command::Show).await;
        assert!(step.output.is_empty());
        assert_eq!(step.notice.unwrap().title, "No data");
        assert!(!step.exit);
    }

    #[tokio::test]
    async fn logout_exits() {
        let (mut session, _) = session();
        session.load().await.unwrap();
        let step = run_command(&mut session, Command::Logout).await;
        assert!(step.exit);
        assert_eq!(step.output, vec!["redirecting to login.html".to_string()]);
    }
}
