use crate::TermId;
use std::path::PathBuf;

/// Errors raised while building or querying a corpus.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid configuration, e.g. zero topics or a missing corpus directory.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The stopword file could not be read.
    #[error("configuration error: cannot read stopword resource {}: {source}", .path.display())]
    StopwordResource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A single document could not be read or is not valid UTF-8.
    #[error("cannot read document {}: {source}", .path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token not in vocabulary: {0:?}")]
    TokenNotFound(String),
    #[error("term id out of range: {0}")]
    IdNotFound(TermId),
    /// Operation not allowed in the vocabulary's current state.
    #[error("invalid vocabulary state: {0}")]
    InvalidState(&'static str),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::StopwordResource { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TokenNotFound(_) | Error::IdNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
