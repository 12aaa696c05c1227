/*!
TCP transport for the handshake.

Message 1 (initiator to peer) is the raw encapsulation key written on a
fresh outbound connection. Message 2 (peer to initiator) is the raw
ciphertext of a fixed, parameter-set dependent length read from a single
accepted connection. Neither message carries a length prefix or a
terminator.

Both directions block. Deadlines in [`TransportConfig`] and a
[`CancellationToken`] bound the blocking points; without them the calls
wait indefinitely.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::error::{Error, Result};

// Outbound sender
pub mod sender;

// Inbound receiver
pub mod receiver;

pub use receiver::{read_fixed_length, InboundReceiver};
pub use sender::OutboundSender;

/// Deadlines for the blocking transport operations.
///
/// `None` means wait indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Limit for establishing the outbound connection
    pub connect_timeout: Option<Duration>,
    /// Limit for the peer to connect back
    pub accept_timeout: Option<Duration>,
    /// Limit for the full ciphertext to arrive once connected
    pub read_timeout: Option<Duration>,
}

impl TransportConfig {
    /// Block indefinitely on every operation
    pub fn blocking() -> Self {
        Self::default()
    }

    /// Use the same limit for every operation
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            connect_timeout: Some(timeout),
            accept_timeout: Some(timeout),
            read_timeout: Some(timeout),
        }
    }
}

/// Cooperative cancellation flag shared between the handshake and its owner.
///
/// Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an untriggered token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Deadline for one blocking operation
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    operation: &'static str,
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start(operation: &'static str, limit: Option<Duration>) -> Self {
        Self {
            operation,
            started: Instant::now(),
            limit,
        }
    }

    pub(crate) fn is_bounded(&self) -> bool {
        self.limit.is_some()
    }

    /// Time left, `None` when unbounded. Fails once the deadline has passed.
    pub(crate) fn remaining(&self) -> Result<Option<Duration>> {
        match self.limit {
            None => Ok(None),
            Some(limit) => {
                let elapsed = self.started.elapsed();
                if elapsed >= limit {
                    Err(Error::timeout(self.operation, limit))
                } else {
                    Ok(Some(limit - elapsed))
                }
            }
        }
    }
}

/// Ask the token, if any, whether to stop
pub(crate) fn check_cancelled(cancel: Option<&CancellationToken>) -> Result<()> {
    match cancel {
        Some(token) => token.check(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(token.check().is_ok());

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_deadline_expiry() {
        let unbounded = Deadline::start("accept", None);
        assert!(!unbounded.is_bounded());
        assert!(matches!(unbounded.remaining(), Ok(None)));

        let expired = Deadline::start("accept", Some(Duration::ZERO));
        assert!(matches!(
            expired.remaining(),
            Err(Error::Timeout { operation: "accept", after_ms: 0 })
        ));

        let generous = Deadline::start("read", Some(Duration::from_secs(60)));
        assert!(generous.remaining().unwrap().is_some());
    }

    #[test]
    fn test_transport_config_presets() {
        assert_eq!(TransportConfig::blocking().read_timeout, None);
        let bounded = TransportConfig::with_timeout(Duration::from_secs(2));
        assert_eq!(bounded.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(bounded.accept_timeout, bounded.read_timeout);
    }
}
