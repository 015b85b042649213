use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid agent url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {operation} failed: {source}")]
    Http {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} returned HTTP {status}")]
    Status { operation: String, status: u16 },
    #[error("could not decode {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Server(String),
}

impl ClientError {
    pub fn decode(operation: impl Into<String>, source: serde_json::Error) -> Self {
        ClientError::Decode {
            operation: operation.into(),
            source,
        }
    }
}
