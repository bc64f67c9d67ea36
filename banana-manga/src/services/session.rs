//! Admin session
//!
//! Holds the ephemeral admin flag. The session lives only as long as the
//! owning `AppState` and is never part of the persisted snapshot.

use crate::error::{AppError, Result};

/// Password-gated admin session
#[derive(Debug, Clone)]
pub struct AdminSession {
    password: String,
    authenticated: bool,
}

impl AdminSession {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            authenticated: false,
        }
    }

    /// Unlock the admin dashboard for this session
    pub fn login(&mut self, attempt: &str) -> Result<()> {
        if attempt != self.password {
            tracing::warn!("Rejected admin login attempt");
            return Err(AppError::InvalidPassword);
        }

        self.authenticated = true;
        tracing::info!("Admin session started");
        Ok(())
    }

    pub fn logout(&mut self) {
        if self.authenticated {
            tracing::info!("Admin session ended");
        }
        self.authenticated = false;
    }

    pub fn is_admin(&self) -> bool {
        self.authenticated
    }
}
