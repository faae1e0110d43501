//! EduFun - Parent settings for the EduFun Kids learning app
//!
//! Loads the child's profile, keeps background music in step with local
//! preferences, and runs the save and account flows of the settings screen.

pub mod bus;
pub mod config;
pub mod console;
pub mod error;
pub mod music;
pub mod notice;
pub mod preferences;
pub mod reconcile;
pub mod session;
pub mod state;
pub mod validation;

pub use bus::{SettingsBus, SettingsEvent};
pub use config::AppConfig;
pub use error::SettingsError;
pub use music::BackgroundMusic;
pub use notice::{Notice, NoticeKind};
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use reconcile::{reconcile, AudioForm, MergedSettings, NotificationToggles, ProfileView};
pub use session::SettingsSession;
pub use state::{Redirect, SessionState};
pub use validation::{ProfileForm, ValidProfile, ValidationError};
