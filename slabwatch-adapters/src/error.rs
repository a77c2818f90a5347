//! Error types for adapters.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when collecting stats from a server.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Connection could not be established.
    #[error("Connection to {addr} failed: {reason}")]
    Connection {
        /// Address that was dialled.
        addr: String,
        /// Underlying failure.
        reason: String,
    },

    /// Connection was not established within the timeout.
    #[error("Connection to {addr} timed out after {timeout:?}")]
    Timeout {
        /// Address that was dialled.
        addr: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The stream failed after it was opened.
    #[error("I/O error while talking to server: {0}")]
    Io(#[from] std::io::Error),

    /// A response grammar could not be compiled.
    #[error("Invalid response grammar: {0}")]
    Grammar(String),
}

impl AdapterError {
    /// Whether the error happened before a stream was obtained.
    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            AdapterError::Connection { .. } | AdapterError::Timeout { .. }
        )
    }
}

#[cfg(feature = "memcached")]
impl From<regex::Error> for AdapterError {
    fn from(err: regex::Error) -> Self {
        AdapterError::Grammar(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_message() {
        let err = AdapterError::Connection {
            addr: "127.0.0.1:11211".to_string(),
            reason: "Connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Connection to 127.0.0.1:11211 failed: Connection refused"
        );
        assert!(err.is_connect());
    }

    #[test]
    fn test_timeout_is_connect() {
        let err = AdapterError::Timeout {
            addr: "10.0.0.1:11211".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert!(err.is_connect());
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_io_is_not_connect() {
        let err = AdapterError::from(std::io::Error::other("reset"));
        assert!(!err.is_connect());
    }
}
