use std::error::Error as StdError;

use client::ClientError;
use commands::InitErrorPayload;
use thiserror::Error;

/// Fatal startup failures. Messages are already localized.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("{0}")]
    MissingResource(String),
    #[error("{0}")]
    UnknownResourceType(String),
    #[error("{0}")]
    UnsupportedCoordinateSystem(String),
    #[error("{0}")]
    UnregisteredEpsgCode(String),
    #[error("{0}")]
    NoMapDefinition(String),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl InitError {
    /// Option errors are reported without a stack; everything after the
    /// options were accepted carries one.
    pub fn include_stack(&self) -> bool {
        !matches!(
            self,
            InitError::MissingResource(_) | InitError::UnknownResourceType(_)
        )
    }

    pub fn to_payload(&self) -> InitErrorPayload {
        InitErrorPayload {
            message: self.to_string(),
            stack: error_chain(self),
        }
    }
}

/// Display text of `err` followed by each of its sources.
pub fn error_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        lines.push(e.to_string());
        current = e.source();
    }
    lines
}
