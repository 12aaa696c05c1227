//! Handshake protocol for the initiator.
//!
//! This module contains parameter loading, the peer address, the TCP
//! transport for both messages, the handshake state machine and the
//! orchestrator that ties them together.

// Parameter file loading
pub mod params;

// Peer address parsing
pub mod peer;

// Outbound sender and inbound receiver
pub mod transport;

// Handshake state machine
pub mod state;

// Orchestrator
pub mod initiator;

// Re-export for convenience
pub use initiator::{HandshakeOutcome, Initiator, InitiatorBuilder, SeedSource};
pub use params::HandshakeParameters;
pub use peer::PeerAddress;
pub use state::{AbortReason, HandshakeState};
pub use transport::{CancellationToken, InboundReceiver, OutboundSender, TransportConfig};
