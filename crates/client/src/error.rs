use stockarium_auth::TokenError;
use stockarium_local::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no user is signed in")]
    NotSignedIn,

    /// The session was dropped (server answered 401 or the token expired).
    #[error("session expired; sign in again")]
    SessionExpired,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ClientError {
    /// Error code from the server's `{error, message}` body, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}
