use boda_shared::whatsapp::WhatsappError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected locally; no request was issued.
    #[error("{0}")]
    Validation(String),

    #[error("Request failed with {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    /// Sending requires a connected WhatsApp session.
    #[error("WhatsApp is not connected")]
    NotConnected,

    #[error(transparent)]
    Whatsapp(#[from] WhatsappError),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Session(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
