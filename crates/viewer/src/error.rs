use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Unknown external base layer provider: {0}")]
    UnknownExternalBaseLayer(String),
}
