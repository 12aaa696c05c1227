//! Core components for the initiator.
//!
//! This module contains the building blocks the handshake is made of:
//! the KEM interface and its ML-KEM implementation, seed sources, secret
//! memory handling, constants and error handling.

// Export cryptographic functionality
pub mod crypto;

// Secret buffers
pub mod memory;

// Protocol constants
pub mod constants;

// Error handling
pub mod error;

// Re-exports for convenience
pub use self::error::{ConfigError, Error, KeyExchangeError, Result};
pub use self::memory::SecretBytes;
