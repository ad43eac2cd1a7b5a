//! Errors surfaced by message handlers

use thiserror::Error;

/// Failure of a single handler invocation
///
/// A message that is skipped on purpose is not an error; handlers return
/// `Ok(())` for those.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Place ids must be in hyphenated UUID form; `source` is set when the
    /// value was not a UUID at all
    #[error("Malformed place id {value:?}")]
    MalformedPlaceId {
        value: String,
        #[source]
        source: Option<uuid::Error>,
    },

    /// Failure raised by a store or delete collaborator, passed through as-is
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub type HandlerResult<T = ()> = Result<T, HandlerError>;
