// Authentication interface for the backend-as-a-service client
// The playground only consumes sessions; credential handling lives in the host

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email address not confirmed")]
    EmailNotConfirmed,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("auth backend error: {0}")]
    Backend(String),
}

/// Email/password authentication against the hosting service.
pub trait AuthClient {
    fn sign_up(&mut self, email: &str, password: &str) -> Result<Session, AuthError>;
    fn sign_in(&mut self, email: &str, password: &str) -> Result<Session, AuthError>;
    fn sign_out(&mut self) -> Result<(), AuthError>;

    /// Current session, if signed in.
    fn session(&self) -> Option<&Session>;

    fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }
}
