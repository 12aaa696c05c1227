/*!
Key encapsulation interface.

The handshake only depends on the call contract of a KEM:
`KeyGen(d, z) -> (ek, dk)` and `Decaps(dk, ct) -> K`. Any implementation
of [`KemProvider`] can drive the initiator.
*/

use std::fmt;

use crate::core::crypto::config::ParameterSet;
use crate::core::error::Result;
use crate::core::memory::SecretBytes;

/// Public half of a KEM key pair. This is the only key sent to the peer.
#[derive(Clone, PartialEq, Eq)]
pub struct EncapsulationKey(Vec<u8>);

impl EncapsulationKey {
    /// Wrap encoded encapsulation key bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encoded key bytes, exactly as they go on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the encoding is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EncapsulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.0[..self.0.len().min(8)];
        write!(f, "EncapsulationKey({}.., {} bytes)", hex::encode(prefix), self.0.len())
    }
}

/// Private half of a KEM key pair. Never leaves the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecapsulationKey(SecretBytes);

impl DecapsulationKey {
    /// Wrap encoded decapsulation key bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(SecretBytes::new(bytes))
    }

    /// Borrow the encoded key
    pub fn expose(&self) -> &[u8] {
        self.0.expose()
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the encoding is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Key pair produced once per handshake
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Public key, sent to the peer
    pub encapsulation_key: EncapsulationKey,
    /// Private key, used for decapsulation only
    pub decapsulation_key: DecapsulationKey,
}

impl KeyPair {
    /// Build a key pair from encoded halves
    pub fn new(encapsulation_key: Vec<u8>, decapsulation_key: Vec<u8>) -> Self {
        Self {
            encapsulation_key: EncapsulationKey::new(encapsulation_key),
            decapsulation_key: DecapsulationKey::new(decapsulation_key),
        }
    }
}

/// Shared secret recovered by decapsulation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedSecret(SecretBytes);

impl SharedSecret {
    /// Wrap shared secret bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(SecretBytes::new(bytes))
    }

    /// Borrow the secret
    pub fn expose(&self) -> &[u8] {
        self.0.expose()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex encoding for the final report of a successful run
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

/// The two seeds consumed by key generation
#[derive(Clone, Debug)]
pub struct KeyGenSeeds {
    /// Seed `d`
    pub d: SecretBytes,
    /// Seed `z`, used for implicit rejection
    pub z: SecretBytes,
}

/// Trait for KEM implementations
pub trait KemProvider {
    /// Parameter set this provider operates on
    fn parameter_set(&self) -> ParameterSet;

    /// Derive a key pair from the seeds `d` and `z`
    fn key_gen(&self, d: &[u8], z: &[u8]) -> Result<KeyPair>;

    /// Recover the shared secret from a ciphertext (initiator side)
    fn decaps(&self, decapsulation_key: &DecapsulationKey, ciphertext: &[u8]) -> Result<SharedSecret>;

    /// Encapsulate a fresh shared secret to an encapsulation key (peer side).
    ///
    /// Returns the shared secret and the ciphertext.
    fn encaps(&self, encapsulation_key: &[u8]) -> Result<(SharedSecret, Vec<u8>)>;

    /// Encapsulation key size for the configured parameter set
    fn encapsulation_key_size(&self) -> usize {
        self.parameter_set().encapsulation_key_size()
    }

    /// Ciphertext size for the configured parameter set
    fn ciphertext_size(&self) -> usize {
        self.parameter_set().ciphertext_size()
    }
}

impl<K: KemProvider + ?Sized> KemProvider for Box<K> {
    fn parameter_set(&self) -> ParameterSet {
        (**self).parameter_set()
    }

    fn key_gen(&self, d: &[u8], z: &[u8]) -> Result<KeyPair> {
        (**self).key_gen(d, z)
    }

    fn decaps(&self, decapsulation_key: &DecapsulationKey, ciphertext: &[u8]) -> Result<SharedSecret> {
        (**self).decaps(decapsulation_key, ciphertext)
    }

    fn encaps(&self, encapsulation_key: &[u8]) -> Result<(SharedSecret, Vec<u8>)> {
        (**self).encaps(encapsulation_key)
    }
}
