use std::fmt;

use crate::error::Error;

/// The caller's login state. Passed explicitly to every authenticated call.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a session from a previously stored token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.open(token);
        session
    }

    pub fn open(&mut self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            self.token = None;
        } else {
            self.token = Some(token);
        }
    }

    /// User-initiated sign out. Returns the token that was held, if any.
    pub fn logout(&mut self) -> Option<String> {
        self.token.take()
    }

    /// The backend refused the token.
    pub fn expire(&mut self) {
        if self.token.take().is_some() {
            log::warn!("Session token rejected by server; login required");
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Token for an `Authorization: Bearer` header.
    pub fn bearer(&self) -> Result<&str, Error> {
        self.token().ok_or(Error::Auth)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
