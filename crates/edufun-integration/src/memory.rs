//! In-process backends for offline use and tests.
//!
//! Both types are cheap to clone; clones share the same state.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::info;

use crate::auth::AuthService;
use crate::error::IntegrationError;
use crate::profile::{ProfileRepository, ProfileUpdate};
use crate::types::{UserInfo, UserProfile};

#[derive(Debug, Default)]
struct DocumentState {
    doc: Option<Value>,
    offline: bool,
    revoked: bool,
    writes: usize,
}

impl DocumentState {
    fn check_access(&self) -> Result<(), IntegrationError> {
        if self.offline {
            return Err(IntegrationError::Offline);
        }
        if self.revoked {
            return Err(IntegrationError::AuthFailed("token expired".into()));
        }
        Ok(())
    }
}

/// A profile document held in memory as JSON, with the same merge semantics
/// as the server.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileRepository {
    state: Arc<Mutex<DocumentState>>,
}

impl MemoryProfileRepository {
    /// Repository with no document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Repository holding `profile`.
    pub fn with_profile(profile: &UserProfile) -> Result<Self, IntegrationError> {
        let repo = Self::default();
        repo.state.lock().doc = Some(serde_json::to_value(profile)?);
        Ok(repo)
    }

    /// Repository holding a raw JSON document.
    pub fn with_document(doc: Value) -> Self {
        let repo = Self::default();
        repo.state.lock().doc = Some(doc);
        repo
    }

    /// Make every following call fail with [`IntegrationError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Reject every following call as the server does for an expired token.
    pub fn revoke_access(&self) {
        self.state.lock().revoked = true;
    }

    /// Snapshot of the raw document.
    pub fn document(&self) -> Option<Value> {
        self.state.lock().doc.clone()
    }

    /// Number of successful merges and deletes so far.
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }
}

impl ProfileRepository for MemoryProfileRepository {
    async fn read(&self) -> Result<Option<UserProfile>, IntegrationError> {
        let state = self.state.lock();
        state.check_access()?;
        match &state.doc {
            Some(doc) => Ok(Some(serde_json::from_value(doc.clone())?)),
            None => Ok(None),
        }
    }

    async fn merge(&self, update: &ProfileUpdate) -> Result<(), IntegrationError> {
        let mut state = self.state.lock();
        state.check_access()?;
        if update.is_empty() {
            return Ok(());
        }
        let doc = state.doc.get_or_insert_with(|| Value::Object(Default::default()));
        update.apply_to(doc);
        state.writes += 1;
        Ok(())
    }

    async fn delete(&self) -> Result<(), IntegrationError> {
        let mut state = self.state.lock();
        state.check_access()?;
        state.doc = None;
        state.writes += 1;
        Ok(())
    }
}

#[derive(Debug)]
struct AccountState {
    user: UserInfo,
    password: String,
    signed_in: bool,
    stale: bool,
    always_stale: bool,
}

/// A single account checked against a password held in memory.
#[derive(Debug, Clone)]
pub struct MemoryAuth {
    state: Arc<Mutex<AccountState>>,
}

impl MemoryAuth {
    /// A signed-in account.
    pub fn signed_in(user: UserInfo, password: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(AccountState {
                user,
                password: password.into(),
                signed_in: true,
                stale: false,
                always_stale: false,
            })),
        }
    }

    /// An account that is not currently signed in.
    pub fn signed_out(user: UserInfo, password: impl Into<String>) -> Self {
        let auth = Self::signed_in(user, password);
        auth.state.lock().signed_in = false;
        auth
    }

    /// Sign in again, as the login page would.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<UserInfo, IntegrationError> {
        let mut state = self.state.lock();
        if state.user.email != email || state.password != password {
            return Err(IntegrationError::InvalidCredential);
        }
        state.signed_in = true;
        state.stale = false;
        info!("Signed in as {}", email);
        Ok(state.user.clone())
    }

    /// Mark the session as too old for password changes until the next
    /// sign-in or re-authentication.
    pub fn expire_session(&self) {
        self.state.lock().stale = true;
    }

    /// Refuse every password change as too old, even right after
    /// re-authentication.
    pub fn require_fresh_login(&self) {
        self.state.lock().always_stale = true;
    }

    pub fn password(&self) -> String {
        self.state.lock().password.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.lock().signed_in
    }
}

impl AuthService for MemoryAuth {
    fn current_user(&self) -> Option<UserInfo> {
        let state = self.state.lock();
        state.signed_in.then(|| state.user.clone())
    }

    async fn reauthenticate(&self, password: &str) -> Result<(), IntegrationError> {
        let mut state = self.state.lock();
        if !state.signed_in {
            return Err(IntegrationError::NotAuthenticated);
        }
        if state.password != password {
            return Err(IntegrationError::InvalidCredential);
        }
        state.stale = false;
        Ok(())
    }

    async fn change_password(&self, new_password: &str) -> Result<(), IntegrationError> {
        let mut state = self.state.lock();
        if !state.signed_in {
            return Err(IntegrationError::NotAuthenticated);
        }
        if state.stale || state.always_stale {
            return Err(IntegrationError::RequiresRecentLogin);
        }
        state.password = new_password.to_string();
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IntegrationError> {
        self.state.lock().signed_in = false;
        Ok(())
    }
}
