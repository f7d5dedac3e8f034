use crate::domain::email::MessageId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting is missing or has an unusable value.
    #[error("configuration error: {name}: {reason}")]
    Configuration { name: String, reason: String },

    /// TLS, transport or authentication failure while talking to the server.
    #[error("failed to connect to email server: {0}")]
    Connection(#[source] imap::error::Error),

    #[error("failed to fetch email ID {id}: {source}")]
    Fetch {
        id: MessageId,
        #[source]
        source: imap::error::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("error processing emails: {0}")]
    Processing(String),
}

impl Error {
    pub(crate) fn missing(name: &str) -> Self {
        Error::Configuration {
            name: name.to_string(),
            reason: "missing required environment variable".to_string(),
        }
    }
}
