use crate::domain::model::{Session, User};
use crate::domain::ports::{AuthProvider, Storage};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::require_field;
use std::io::ErrorKind;

pub const SESSION_FILE: &str = "session.json";

/// Sign-in state of the CLI, persisted as JSON between runs.
pub struct AuthService<A: AuthProvider, T: Storage> {
    provider: A,
    storage: T,
}

impl<A: AuthProvider, T: Storage> AuthService<A, T> {
    pub fn new(provider: A, storage: T) -> Self {
        Self { provider, storage }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = require_field("email", email)?;
        if password.is_empty() {
            return Err(AppError::ValidationError {
                message: "password is required".to_string(),
            });
        }

        let session = self.provider.sign_in(email, password).await?;

        // last_login is informational only
        if let Err(e) = self
            .provider
            .touch_last_login(&session.access_token, email)
            .await
        {
            tracing::warn!("Could not update last login for {}: {}", email, e);
        }

        let data = serde_json::to_vec_pretty(&session)?;
        self.storage.write_file(SESSION_FILE, &data).await?;

        tracing::info!("✅ Signed in as {}", session.user.email);
        Ok(session)
    }

    /// Revokes the stored session remotely and forgets it locally.
    /// The local file is removed even when the backend call fails.
    pub async fn logout(&self) -> Result<()> {
        let session = match self.load_session().await {
            Ok(session) => session,
            Err(AppError::NotAuthenticated) => return Ok(()),
            Err(e) => return Err(e),
        };

        if let Err(e) = self.provider.sign_out(&session.access_token).await {
            tracing::warn!("Remote sign-out failed: {}", e);
        }
        self.storage.remove_file(SESSION_FILE).await?;

        tracing::info!("👋 Signed out {}", session.user.email);
        Ok(())
    }

    pub async fn load_session(&self) -> Result<Session> {
        let data = match self.storage.read_file(SESSION_FILE).await {
            Ok(data) => data,
            Err(AppError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotAuthenticated)
            }
            Err(e) => return Err(e),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    pub async fn whoami(&self) -> Result<User> {
        let session = self.load_session().await?;
        match self.provider.current_user(&session.access_token).await {
            Err(AppError::BackendError { status: 401, .. }) => Err(AppError::NotAuthenticated),
            other => other,
        }
    }
}
