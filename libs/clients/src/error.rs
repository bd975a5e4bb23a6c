use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Resource not found upstream")]
    NotFound,

    #[error("Upstream rejected the credentials")]
    Unauthorized,

    #[error("Upstream denied access")]
    Forbidden,

    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Response parsing failed: {0}")]
    Decode(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
