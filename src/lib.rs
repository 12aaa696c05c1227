/*!
# PQC Initiator

The initiating side of a one-shot post-quantum key exchange over TCP.

## Overview

The initiator:

- loads its seeds and listen port from a JSON parameter file
- derives an ML-KEM key pair from the seeds (FIPS 203)
- sends the raw encapsulation key to the peer over a fresh connection
- listens for the peer's raw ciphertext of a fixed, parameter-set dependent length
- decapsulates the shared secret

Every step runs once. There is no retry and any failure ends the run.

```no_run
use pqc_initiator::Initiator;

let mut initiator = Initiator::new();
let outcome = initiator.run("alice_params.json", Some("127.0.0.1:6000"))?;
println!("shared secret: {}", outcome.shared_secret.to_hex());
# Ok::<(), pqc_initiator::Error>(())
```
*/

// Core components
pub mod core;

// Handshake protocol
pub mod protocol;

// Re-export commonly used types for convenience
pub use self::core::error::{ConfigError, Error, KeyExchangeError, Result};
pub use self::core::constants::{sizes, DEFAULT_PARAMS_FILE, MIN_LISTEN_PORT};
pub use self::core::crypto::{EntropySource, KemProvider, MlKem, ParameterSet, SharedSecret, SystemEntropy};
#[cfg(any(test, feature = "debug-seeds"))]
pub use self::core::crypto::FixedSeeds;
pub use self::core::memory::SecretBytes;

pub use protocol::{
    AbortReason, CancellationToken, HandshakeOutcome, HandshakeParameters, HandshakeState, Initiator,
    InitiatorBuilder, PeerAddress, TransportConfig,
};
