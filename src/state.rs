//! Settings session state machine
//!
//! Tracks where the settings screen stands: loading, ready, or ended by one
//! of the account actions, and where the user should be sent next.

/// The current session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Profile not loaded yet
    #[default]
    Loading,
    /// Profile loaded and merged; all settings available
    Ready,
    /// Signed in but no profile document exists; personalization is blocked
    NoProfile,
    /// No active session
    Unauthenticated,
    /// Profile data deleted; the account still exists
    DataDeleted,
    /// User logged out
    SignedOut,
}

/// Pages the settings screen can send the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// Login page
    Login,
    /// Dashboard, which starts profile setup when no data exists
    Dashboard,
}

impl Redirect {
    /// Path of the target page
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "login.html",
            Self::Dashboard => "dashboard.html",
        }
    }
}

impl SessionState {
    /// Where the user should go from this state, if anywhere
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            Self::Unauthenticated | Self::SignedOut => Some(Redirect::Login),
            Self::DataDeleted => Some(Redirect::Dashboard),
            Self::Loading | Self::Ready | Self::NoProfile => None,
        }
    }

    /// Whether per-user settings can be shown and saved
    pub fn is_personalized(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether the session has ended and the screen should be left
    pub fn is_terminal(&self) -> bool {
        self.redirect().is_some()
    }
}
