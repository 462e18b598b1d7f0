use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpgsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable schema for resource kind \"{kind}\": {reason}")]
    SchemaUnreadable {
        kind:   String,
        reason: String,
    },

    #[error("Failed to parse JSON: {0}")]
    Decode(String),

    #[error("Failed to encode JSON: {0}")]
    Encode(String),

    #[error("Failed to write file: {0}")]
    Write(#[source] std::io::Error),
}
