//! Form validation for the profile and password dialogs

use thiserror::Error;

/// Youngest age the platform accepts.
pub const MIN_CHILD_AGE: u32 = 7;
/// Oldest age the platform accepts.
pub const MAX_CHILD_AGE: u32 = 12;
/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A rule broken by user input. Nothing is written when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name required")]
    NameRequired,

    #[error("age required")]
    AgeRequired,

    #[error("age must be numeric")]
    AgeNotNumeric,

    #[error("age must be at least 7")]
    AgeTooYoung,

    #[error("age must be at most 12")]
    AgeTooOld,

    #[error("all password fields are required")]
    PasswordFieldsMissing,

    #[error("new passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,
}

impl ValidationError {
    /// Whether the error concerns the age field
    pub fn is_age(&self) -> bool {
        matches!(
            self,
            Self::AgeRequired | Self::AgeNotNumeric | Self::AgeTooYoung | Self::AgeTooOld
        )
    }
}

/// Raw profile form values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub child_name: String,
    pub child_age: String,
    pub child_grade: String,
    pub avatar: String,
}

/// Profile values that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    pub child_name: String,
    pub child_age: u32,
    pub child_grade: String,
    pub avatar: String,
}

/// Check the profile form. Name is checked first, then the age.
pub fn validate_profile(form: &ProfileForm) -> Result<ValidProfile, ValidationError> {
    let child_name = form.child_name.trim();
    if child_name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let child_age = validate_age(&form.child_age)?;

    Ok(ValidProfile {
        child_name: child_name.to_string(),
        child_age,
        child_grade: form.child_grade.clone(),
        avatar: form.avatar.clone(),
    })
}

/// Parse and range-check an age typed into the form.
pub fn validate_age(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::AgeRequired);
    }
    let age = leading_integer(raw).ok_or(ValidationError::AgeNotNumeric)?;

    if age < i64::from(MIN_CHILD_AGE) {
        Err(ValidationError::AgeTooYoung)
    } else if age > i64::from(MAX_CHILD_AGE) {
        Err(ValidationError::AgeTooOld)
    } else {
        Ok(age as u32)
    }
}

/// An optional sign and the digits after it. Trailing text is ignored, so
/// "7.5" reads as 7 and "10abc" as 10.
fn leading_integer(raw: &str) -> Option<i64> {
    let start = usize::from(raw.starts_with(['+', '-']));
    let end = raw[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |i| start + i);
    if end == start {
        return None;
    }
    raw[..end].parse().ok()
}

/// Check the change-password dialog.
pub fn validate_password_change(
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(ValidationError::PasswordFieldsMissing);
    }
    if new != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}
