use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Core error type for liffey configuration handling.
///
/// Resolution itself can only fail with [`Error::InvalidConfiguration`] or
/// [`Error::UnknownOption`]; the remaining variants come from reading and
/// parsing a config file. All of them are fatal — there is no partial or
/// degraded configuration.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("invalid configuration: `{field}`: {message}")]
    InvalidConfiguration { field: String, message: String },

    #[error("unknown option `{key}`")]
    UnknownOption { key: String },

    #[error("failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

impl Error {
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown(key: impl Into<String>) -> Self {
        Self::UnknownOption { key: key.into() }
    }
}
