//! Error types for components and event bindings.

use std::path::PathBuf;

use horizon_trellis_core::ObjectError;

/// Result type alias for framework operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring components or binding events.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A component or binding was configured with an unsupported value.
    #[error("Invalid value for parameter `{parameter}`: {message}")]
    InvalidConfiguration { parameter: String, message: String },

    /// An operation was attempted on an object in a state that does not allow it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A component declaring the `stream` event cannot stream.
    #[error("Component '{component}' cannot be used as a streaming source")]
    NotStreamable { component: String },

    /// An event payload sent by the frontend was malformed.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    /// A user callback failed.
    #[error("Callback failed: {0}")]
    Callback(String),

    /// A configuration file could not be parsed.
    #[error("Invalid configuration file: {message}")]
    Config { message: String },

    /// Configuration file I/O error.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the core object registry.
    #[error(transparent)]
    Object(#[from] ObjectError),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a callback error.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }

    /// Create a configuration parse error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
