/*!
Error handling for the initiator handshake.

Every failure of the one-shot flow is terminal. The variants below carry
enough detail to name the precise cause in a single log line; key material
never appears in any message.
*/

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for the initiator
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the initiator
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Parameter file could not be turned into handshake parameters
    #[error("Invalid parameters: {0}")]
    Config(#[from] ConfigError),

    /// No peer address was supplied
    #[error("No address provided for the peer")]
    NoPeerAddress,

    /// Peer address is not of the form `host:port`
    #[error("Invalid peer address '{0}', expected HOST:PORT")]
    InvalidPeerAddress(String),

    /// Outbound connection to the peer failed
    #[error("Peer {peer} is unreachable: {source}")]
    PeerUnreachable {
        peer: String,
        #[source]
        source: io::Error,
    },

    /// Peer closed the connection before a full message arrived
    #[error("Short read: expected {expected} bytes, received {received}")]
    ShortRead {
        expected: usize,
        received: usize,
    },

    /// A blocking operation exceeded its deadline
    #[error("{operation} timed out after {after_ms} ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    /// The handshake was cancelled through its cancellation token
    #[error("Operation cancelled")]
    Cancelled,

    /// Operation not allowed in the current handshake state
    #[error("Handshake not in correct state: expected {expected}, but was {actual}")]
    InvalidState {
        expected: String,
        actual: String,
    },

    /// Key exchange error (limited details for security)
    #[error("Key exchange failed: {0}")]
    KeyExchange(#[from] KeyExchangeError),
}

/// Parameter loading errors, in the order they are checked
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Parameter file does not exist
    #[error("Could not find parameter file {}", path.display())]
    NotFound { path: PathBuf },

    /// Parameter file exists but could not be read
    #[error("Could not read parameter file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Parameter file is not valid JSON of the expected shape
    #[error("Malformed parameter file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A seed is absent, empty or not valid hexadecimal
    #[error("Missing or invalid seed '{field}'")]
    MissingSeed { field: &'static str },

    /// No `connections` section
    #[error("No 'connections' section")]
    MissingListenConfig,

    /// Listen port cannot be easily used
    #[error("Port provided is {0}, which cannot be easily used")]
    InvalidPort(i64),

    /// Parameter set name is not recognised
    #[error("Unknown parameter set '{0}'")]
    UnknownParameterSet(String),
}

/// Key exchange errors with limited details to prevent leaking information
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExchangeError {
    /// Seed has the wrong length for key generation
    #[error("Seed must be {expected} bytes, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },

    /// Key generation failed
    #[error("Key generation failed")]
    KeyGenerationFailed,

    /// Invalid encapsulation key
    #[error("Invalid encapsulation key")]
    InvalidEncapsulationKey,

    /// Invalid decapsulation key
    #[error("Invalid decapsulation key")]
    InvalidDecapsulationKey,

    /// Invalid ciphertext
    #[error("Invalid ciphertext")]
    InvalidCiphertext,

    /// Key encapsulation failed
    #[error("Key encapsulation failed")]
    EncapsulationFailed,

    /// Key decapsulation failed
    #[error("Key decapsulation failed")]
    DecapsulationFailed,
}

impl Error {
    /// Timeout for the named operation
    pub(crate) fn timeout(operation: &'static str, after: std::time::Duration) -> Self {
        Error::Timeout {
            operation,
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Convert from Error to io::Error (for compatibility)
impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Io(io_error) => io_error,
            Error::Config(err) => io::Error::new(io::ErrorKind::InvalidInput, err.to_string()),
            Error::NoPeerAddress => io::Error::new(io::ErrorKind::InvalidInput, "No peer address"),
            Error::InvalidPeerAddress(addr) => io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid peer address: {}", addr),
            ),
            Error::PeerUnreachable { source, .. } => source,
            Error::ShortRead { expected, received } => io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Short read: expected {} bytes, received {}", expected, received),
            ),
            Error::Timeout { operation, after_ms } => io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{} timed out after {} ms", operation, after_ms),
            ),
            Error::Cancelled => io::Error::new(io::ErrorKind::Interrupted, "Operation cancelled"),
            Error::InvalidState { expected, actual } => io::Error::new(
                io::ErrorKind::Other,
                format!("Invalid state: expected {}, but was {}", expected, actual),
            ),
            Error::KeyExchange(_) => {
                io::Error::new(io::ErrorKind::InvalidData, "Key exchange error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config(ConfigError::InvalidPort(80));
        assert_eq!(
            format!("{}", err),
            "Invalid parameters: Port provided is 80, which cannot be easily used"
        );

        let err = Error::ShortRead { expected: 768, received: 100 };
        assert_eq!(format!("{}", err), "Short read: expected 768 bytes, received 100");

        let err = Error::KeyExchange(KeyExchangeError::DecapsulationFailed);
        assert_eq!(format!("{}", err), "Key exchange failed: Key decapsulation failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let err = Error::timeout("accept", std::time::Duration::from_millis(250));
        let io_err = io::Error::from(err);
        assert_eq!(io_err.kind(), io::ErrorKind::TimedOut);
        assert!(io_err.to_string().contains("250 ms"));

        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::PeerUnreachable { peer: "127.0.0.1:6000".into(), source: refused };
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_timeout_saturates() {
        let err = Error::timeout("read", std::time::Duration::MAX);
        assert!(matches!(err, Error::Timeout { operation: "read", after_ms: u64::MAX }));
    }
}
