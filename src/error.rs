use edufun_integration::IntegrationError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Failure of a settings flow. None of these end the process.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("no profile data found for this account")]
    NoProfile,

    #[error("current password is incorrect")]
    InvalidCredential,

    #[error("session expired, sign in again")]
    SessionExpired,

    #[error("remote request failed: {0}")]
    Remote(IntegrationError),
}

impl From<IntegrationError> for SettingsError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::NotAuthenticated | IntegrationError::AuthFailed(_) => {
                SettingsError::NotAuthenticated
            }
            IntegrationError::InvalidCredential => SettingsError::InvalidCredential,
            IntegrationError::RequiresRecentLogin => SettingsError::SessionExpired,
            other => SettingsError::Remote(other),
        }
    }
}
