/*!
Cryptographic components for the initiator.

The KEM is an external capability: the handshake only talks to the
[`KemProvider`] trait. [`MlKem`] is the FIPS 203 implementation used by
the `alice` binary.
*/

// Parameter set selection
pub mod config;

// KEM interface and key types
pub mod kem;

// FIPS 203 provider
pub mod ml_kem;

// Seed sources for key generation
pub mod entropy;

// Re-export frequently used types
pub use config::ParameterSet;
pub use entropy::{EntropySource, SystemEntropy};
#[cfg(any(test, feature = "debug-seeds"))]
pub use entropy::FixedSeeds;
pub use kem::{DecapsulationKey, EncapsulationKey, KemProvider, KeyGenSeeds, KeyPair, SharedSecret};
pub use ml_kem::MlKem;
