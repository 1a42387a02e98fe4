use thiserror::Error;

/// Everything that can go wrong talking to the Finish-It backend.
///
/// `Auth` means the session token is gone or was refused; callers must log in
/// again. The rest leave local state as it was and can be retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error connecting to server: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Session expired or not logged in")]
    Auth,

    #[error("{0}")]
    Validation(String),

    /// The backend answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Server returned {status}")]
    Http { status: reqwest::StatusCode },
}

impl Error {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
