use std::path::PathBuf;

/// Construction-time and build-time failures.
///
/// Per-query reads never produce this type: a malformed record encountered
/// after a store has been opened successfully degrades to an empty/zero
/// result (see the individual store implementations), it does not surface
/// as an `Err`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error while building or opening {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file {path}: {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    #[error("invalid engine configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
