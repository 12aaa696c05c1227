/*!
Constants for the initiator handshake.

This module contains the ML-KEM size constants for every supported
parameter set together with the defaults used by the parameter loader
and the transport.
*/

use std::time::Duration;

/// Size of each key generation seed (`d` and `z`) in bytes
pub const SEED_BYTES: usize = 32;

/// Size of the ML-KEM shared secret in bytes (identical for all parameter sets)
pub const SHARED_SECRET_BYTES: usize = 32;

/// Lowest listen port accepted by the parameter loader.
///
/// Ports below this value are privileged on most systems.
pub const MIN_LISTEN_PORT: u16 = 1024;

/// Parameter file read when none is given on the command line
pub const DEFAULT_PARAMS_FILE: &str = "alice_params.json";

/// Interface the inbound receiver binds to when the parameter file names none
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";

/// How often a non-blocking accept is retried while waiting on a deadline
/// or a cancellation token
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound for a single blocking read while a cancellation token is armed
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Size constants for the FIPS 203 parameter sets
pub mod sizes {
    /// ML-KEM-512 constants
    pub mod ml_kem_512 {
        /// Size of the encapsulation key in bytes
        pub const ENCAPSULATION_KEY_BYTES: usize = 800;

        /// Size of the decapsulation key in bytes
        pub const DECAPSULATION_KEY_BYTES: usize = 1632;

        /// Size of the ciphertext in bytes
        pub const CIPHERTEXT_BYTES: usize = 768;
    }

    /// ML-KEM-768 constants
    pub mod ml_kem_768 {
        /// Size of the encapsulation key in bytes
        pub const ENCAPSULATION_KEY_BYTES: usize = 1184;

        /// Size of the decapsulation key in bytes
        pub const DECAPSULATION_KEY_BYTES: usize = 2400;

        /// Size of the ciphertext in bytes
        pub const CIPHERTEXT_BYTES: usize = 1088;
    }

    /// ML-KEM-1024 constants
    pub mod ml_kem_1024 {
        /// Size of the encapsulation key in bytes
        pub const ENCAPSULATION_KEY_BYTES: usize = 1568;

        /// Size of the decapsulation key in bytes
        pub const DECAPSULATION_KEY_BYTES: usize = 3168;

        /// Size of the ciphertext in bytes
        pub const CIPHERTEXT_BYTES: usize = 1568;
    }
}
