//! Passcode hashing and sign-in for local profiles.

use crate::db::Database;
use crate::models::User;
use crate::validate::{self, ValidationError};

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum AuthError {
    #[error("Invalid username or passcode")]
    InvalidCredentials,
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The underlying hashing library failed. Logged, never shown verbatim.
    #[error("hashing failed: {0}")]
    Hashing(String),
    #[error("Could not reach the local store")]
    Store,
}

/// A salted bcrypt hash of a user's passcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PasscodeHash(String);

impl PasscodeHash {
    pub(crate) const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Validate and hash a raw passcode.
    ///
    /// `cost` is the bcrypt work factor; tests pass the minimum (4) to stay fast.
    pub(crate) fn from_raw(passcode: &str, cost: u32) -> Result<Self, AuthError> {
        validate::validate_passcode(passcode)?;
        bcrypt::hash(passcode, cost)
            .map(Self)
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Wrap a hash read back from the store.
    pub(crate) fn from_stored(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// A malformed stored hash never matches.
    pub(crate) fn verify(&self, passcode: &str) -> bool {
        match bcrypt::verify(passcode, &self.0) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(error = %e, "stored passcode hash could not be checked");
                false
            }
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PasscodeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn store_failure(e: anyhow::Error) -> AuthError {
    tracing::error!("user store failed: {e:#}");
    AuthError::Store
}

/// Create a profile. The first profile on a fresh database is the administrator.
pub(crate) fn register(
    db: &mut Database,
    username: &str,
    passcode: &str,
    currency: &str,
    cost: u32,
) -> Result<User, AuthError> {
    let username = validate::required_text("Username", username, validate::MAX_NAME_LEN)?;
    let currency = validate::validate_currency(currency)?;
    if db
        .get_user_by_username(&username)
        .map_err(store_failure)?
        .is_some()
    {
        return Err(AuthError::UsernameTaken(username));
    }
    let hash = PasscodeHash::from_raw(passcode, cost)?;

    let mut user = User::new(username, hash.to_string(), currency);
    user.is_admin = db.get_users().map_err(store_failure)?.is_empty();
    user.id = Some(db.create_user(&user).map_err(store_failure)?);
    Ok(user)
}

pub(crate) fn authenticate(db: &Database, username: &str, passcode: &str) -> Result<User, AuthError> {
    let user = db
        .get_user_by_username(username)
        .map_err(store_failure)?;
    match user {
        Some(user) if PasscodeHash::from_stored(&user.passcode_hash).verify(passcode) => Ok(user),
        _ => {
            tracing::info!(username, "sign-in rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests;
