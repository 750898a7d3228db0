use std::path::PathBuf;

/// Errors raised while generating or persisting a synthetic message.
///
/// Domain extraction never shows up here: a sender or recipient without a
/// usable domain silently falls back to the HELO-derived or default domain.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Hop count, locale or another argument outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Template file that is unreadable, not JSON, or lacks string keys.
    #[error("malformed template {path}: {reason}")]
    MalformedTemplate { path: PathBuf, reason: String },

    /// A content field that was supplied with a non-string value.
    #[error("field `{field}` must be a string, got {found}")]
    TypeMismatch { field: &'static str, found: String },

    /// The output path could not be created or written.
    #[error("cannot write {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rejection sampling gave up before finding enough routable addresses.
    #[error("no routable IPv4 address found after {attempts} draws")]
    IpSpaceExhausted { attempts: usize },
}

pub type Result<T> = std::result::Result<T, GenError>;

impl GenError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Filesystem {
            path: path.into(),
            source,
        }
    }
}
