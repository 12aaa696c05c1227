/*!
Seed material for key generation.

Key generation seeds should come from an approved random bit generator.
[`SystemEntropy`] is that default. [`FixedSeeds`] replays the `d`/`z`
values of a parameter file so that runs can be reproduced while debugging;
it only exists in builds with the `debug-seeds` feature and warns on use.
*/

use rand::RngCore;

use crate::core::constants::SEED_BYTES;
use crate::core::crypto::kem::KeyGenSeeds;
use crate::core::error::Result;
use crate::core::memory::SecretBytes;

/// Source of key generation seeds
pub trait EntropySource {
    /// Produce the `d` and `z` seeds for one key generation
    fn key_gen_seeds(&mut self) -> Result<KeyGenSeeds>;

    /// Whether the same seeds come back on every call
    fn is_deterministic(&self) -> bool {
        false
    }
}

/// Cryptographically secure seeds from the OS-seeded thread RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEntropy;

impl EntropySource for SystemEntropy {
    fn key_gen_seeds(&mut self) -> Result<KeyGenSeeds> {
        let mut rng = rand::rng();
        let mut d = vec![0u8; SEED_BYTES];
        let mut z = vec![0u8; SEED_BYTES];
        rng.fill_bytes(&mut d);
        rng.fill_bytes(&mut z);

        Ok(KeyGenSeeds {
            d: SecretBytes::new(d),
            z: SecretBytes::new(z),
        })
    }
}

/// Fixed seeds, returned unchanged on every call.
///
/// # Security Warning
///
/// Keys derived from fixed seeds are predictable to anyone holding the
/// parameter file. Debugging only.
#[cfg(any(test, feature = "debug-seeds"))]
#[derive(Debug, Clone)]
pub struct FixedSeeds {
    d: SecretBytes,
    z: SecretBytes,
}

#[cfg(any(test, feature = "debug-seeds"))]
impl FixedSeeds {
    /// Use `d` and `z` verbatim for every key generation
    pub fn new(d: SecretBytes, z: SecretBytes) -> Self {
        Self { d, z }
    }
}

#[cfg(any(test, feature = "debug-seeds"))]
impl EntropySource for FixedSeeds {
    fn key_gen_seeds(&mut self) -> Result<KeyGenSeeds> {
        log::warn!("Generating key pair using 'fixed' seed data; do not use outside debugging");
        Ok(KeyGenSeeds {
            d: self.d.clone(),
            z: self.z.clone(),
        })
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}
