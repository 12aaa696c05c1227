/*!
Handshake state machine for the initiator.

The states advance strictly in declaration order. `Aborted` can be
entered from any non-terminal state and records why the run stopped.
*/

use std::fmt;

/// Why a handshake was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AbortReason {
    /// Parameter file missing or invalid
    ConfigError,
    /// Seeds unavailable or key generation failed
    KeyGenFailed,
    /// No peer address supplied
    NoPeerAddress,
    /// Peer address could not be parsed
    InvalidPeerAddress,
    /// Encapsulation key could not be delivered
    SendFailed,
    /// Ciphertext could not be received in full
    ReceiveFailed,
    /// Shared secret could not be derived
    DecapsFailed,
    /// Cancellation was requested
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::ConfigError => write!(f, "ConfigError"),
            AbortReason::KeyGenFailed => write!(f, "KeyGenFailed"),
            AbortReason::NoPeerAddress => write!(f, "NoPeerAddress"),
            AbortReason::InvalidPeerAddress => write!(f, "InvalidPeerAddress"),
            AbortReason::SendFailed => write!(f, "SendFailed"),
            AbortReason::ReceiveFailed => write!(f, "ReceiveFailed"),
            AbortReason::DecapsFailed => write!(f, "DecapsFailed"),
            AbortReason::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Handshake state for tracking the initiator's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandshakeState {
    /// Nothing done yet
    Init,
    /// Parameters loaded and validated
    ParamsLoaded,
    /// Key pair generated
    KeyGenerated,
    /// Encapsulation key delivered to the peer
    EkSent,
    /// Ciphertext received from the peer
    CipherTextReceived,
    /// Shared secret derived
    SecretDerived,
    /// Shared secret reported, run complete
    Done,
    /// Run stopped early
    Aborted(AbortReason),
}

impl HandshakeState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakeState::Done | HandshakeState::Aborted(_))
    }

    /// The state that follows on success, `None` for terminal states
    pub fn next(&self) -> Option<HandshakeState> {
        match self {
            HandshakeState::Init => Some(HandshakeState::ParamsLoaded),
            HandshakeState::ParamsLoaded => Some(HandshakeState::KeyGenerated),
            HandshakeState::KeyGenerated => Some(HandshakeState::EkSent),
            HandshakeState::EkSent => Some(HandshakeState::CipherTextReceived),
            HandshakeState::CipherTextReceived => Some(HandshakeState::SecretDerived),
            HandshakeState::SecretDerived => Some(HandshakeState::Done),
            HandshakeState::Done | HandshakeState::Aborted(_) => None,
        }
    }

    /// Whether moving to `to` is a legal transition
    pub fn can_transition_to(&self, to: HandshakeState) -> bool {
        match to {
            HandshakeState::Aborted(_) => !self.is_terminal(),
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::Init => write!(f, "Init"),
            HandshakeState::ParamsLoaded => write!(f, "ParamsLoaded"),
            HandshakeState::KeyGenerated => write!(f, "KeyGenerated"),
            HandshakeState::EkSent => write!(f, "EkSent"),
            HandshakeState::CipherTextReceived => write!(f, "CipherTextReceived"),
            HandshakeState::SecretDerived => write!(f, "SecretDerived"),
            HandshakeState::Done => write!(f, "Done"),
            HandshakeState::Aborted(reason) => write!(f, "Aborted({})", reason),
        }
    }
}
