/*!
KEM parameter set selection.

The ciphertext length the receiver waits for, and the encapsulation key
length the sender writes, are properties of the chosen parameter set.
*/

use std::fmt;
use std::str::FromStr;

use crate::core::constants::sizes;
use crate::core::error::ConfigError;

/// Supported FIPS 203 parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterSet {
    /// ML-KEM-512, the set used by the reference peer
    #[default]
    MlKem512,
    /// ML-KEM-768
    MlKem768,
    /// ML-KEM-1024 - highest security level
    MlKem1024,
}

impl ParameterSet {
    /// All supported parameter sets, weakest first
    pub const ALL: [ParameterSet; 3] = [
        ParameterSet::MlKem512,
        ParameterSet::MlKem768,
        ParameterSet::MlKem1024,
    ];

    /// FIPS 203 name of the parameter set
    pub fn name(&self) -> &'static str {
        match self {
            ParameterSet::MlKem512 => "ML-KEM-512",
            ParameterSet::MlKem768 => "ML-KEM-768",
            ParameterSet::MlKem1024 => "ML-KEM-1024",
        }
    }

    /// Encapsulation key size in bytes
    pub fn encapsulation_key_size(&self) -> usize {
        match self {
            ParameterSet::MlKem512 => sizes::ml_kem_512::ENCAPSULATION_KEY_BYTES,
            ParameterSet::MlKem768 => sizes::ml_kem_768::ENCAPSULATION_KEY_BYTES,
            ParameterSet::MlKem1024 => sizes::ml_kem_1024::ENCAPSULATION_KEY_BYTES,
        }
    }

    /// Decapsulation key size in bytes
    pub fn decapsulation_key_size(&self) -> usize {
        match self {
            ParameterSet::MlKem512 => sizes::ml_kem_512::DECAPSULATION_KEY_BYTES,
            ParameterSet::MlKem768 => sizes::ml_kem_768::DECAPSULATION_KEY_BYTES,
            ParameterSet::MlKem1024 => sizes::ml_kem_1024::DECAPSULATION_KEY_BYTES,
        }
    }

    /// Ciphertext size in bytes
    pub fn ciphertext_size(&self) -> usize {
        match self {
            ParameterSet::MlKem512 => sizes::ml_kem_512::CIPHERTEXT_BYTES,
            ParameterSet::MlKem768 => sizes::ml_kem_768::CIPHERTEXT_BYTES,
            ParameterSet::MlKem1024 => sizes::ml_kem_1024::CIPHERTEXT_BYTES,
        }
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterSet {
    type Err = ConfigError;

    /// Accepts the FIPS 203 names case-insensitively, with or without dashes
    /// (`ML-KEM-768`, `mlkem768`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "MLKEM512" => Ok(ParameterSet::MlKem512),
            "MLKEM768" => Ok(ParameterSet::MlKem768),
            "MLKEM1024" => Ok(ParameterSet::MlKem1024),
            _ => Err(ConfigError::UnknownParameterSet(s.to_string())),
        }
    }
}
