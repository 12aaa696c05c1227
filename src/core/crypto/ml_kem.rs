/*!
FIPS 203 ML-KEM provider.

This module implements [`KemProvider`] on top of the `fips203` crate for
all three parameter sets.
*/

use fips203::traits::{Decaps, Encaps, KeyGen, SerDes};
use zeroize::Zeroize;

use crate::core::constants::SEED_BYTES;
use crate::core::crypto::config::ParameterSet;
use crate::core::crypto::kem::{DecapsulationKey, KemProvider, KeyPair, SharedSecret};
use crate::core::error::{KeyExchangeError, Result};

// Runs `$body` with `$module` bound to the fips203 module of `$set`.
macro_rules! with_parameter_set {
    ($set:expr, $module:ident => $body:block) => {
        match $set {
            ParameterSet::MlKem512 => {
                use fips203::ml_kem_512 as $module;
                $body
            }
            ParameterSet::MlKem768 => {
                use fips203::ml_kem_768 as $module;
                $body
            }
            ParameterSet::MlKem1024 => {
                use fips203::ml_kem_1024 as $module;
                $body
            }
        }
    };
}

/// ML-KEM key encapsulation for a fixed parameter set
#[derive(Debug, Clone, Copy, Default)]
pub struct MlKem {
    parameter_set: ParameterSet,
}

impl MlKem {
    /// Create a provider for the given parameter set
    pub fn new(parameter_set: ParameterSet) -> Self {
        Self { parameter_set }
    }
}

fn seed_array(seed: &[u8]) -> Result<[u8; SEED_BYTES]> {
    seed.try_into().map_err(|_| {
        KeyExchangeError::InvalidSeedLength {
            expected: SEED_BYTES,
            actual: seed.len(),
        }
        .into()
    })
}

impl KemProvider for MlKem {
    fn parameter_set(&self) -> ParameterSet {
        self.parameter_set
    }

    fn key_gen(&self, d: &[u8], z: &[u8]) -> Result<KeyPair> {
        let mut d = seed_array(d)?;
        let mut z = seed_array(z)?;

        let pair = with_parameter_set!(self.parameter_set, params => {
            let (ek, dk) = params::KG::keygen_from_seed(d, z);
            KeyPair::new(ek.into_bytes().to_vec(), dk.into_bytes().to_vec())
        });
        d.zeroize();
        z.zeroize();

        if pair.encapsulation_key.len() != self.encapsulation_key_size() {
            return Err(KeyExchangeError::KeyGenerationFailed.into());
        }
        Ok(pair)
    }

    fn decaps(&self, decapsulation_key: &DecapsulationKey, ciphertext: &[u8]) -> Result<SharedSecret> {
        with_parameter_set!(self.parameter_set, params => {
            let mut dk_bytes: [u8; params::DK_LEN] = decapsulation_key
                .expose()
                .try_into()
                .map_err(|_| KeyExchangeError::InvalidDecapsulationKey)?;
            let dk = params::DecapsKey::try_from_bytes(dk_bytes);
            dk_bytes.zeroize();
            let dk = dk.map_err(|_| KeyExchangeError::InvalidDecapsulationKey)?;

            let ct_bytes: [u8; params::CT_LEN] = ciphertext
                .try_into()
                .map_err(|_| KeyExchangeError::InvalidCiphertext)?;
            let ct = params::CipherText::try_from_bytes(ct_bytes)
                .map_err(|_| KeyExchangeError::InvalidCiphertext)?;

            let ssk = dk
                .try_decaps(&ct)
                .map_err(|_| KeyExchangeError::DecapsulationFailed)?;
            Ok(SharedSecret::new(ssk.into_bytes().to_vec()))
        })
    }

    fn encaps(&self, encapsulation_key: &[u8]) -> Result<(SharedSecret, Vec<u8>)> {
        with_parameter_set!(self.parameter_set, params => {
            let ek_bytes: [u8; params::EK_LEN] = encapsulation_key
                .try_into()
                .map_err(|_| KeyExchangeError::InvalidEncapsulationKey)?;
            let ek = params::EncapsKey::try_from_bytes(ek_bytes)
                .map_err(|_| KeyExchangeError::InvalidEncapsulationKey)?;

            let (ssk, ct) = ek
                .try_encaps()
                .map_err(|_| KeyExchangeError::EncapsulationFailed)?;
            Ok((SharedSecret::new(ssk.into_bytes().to_vec()), ct.into_bytes().to_vec()))
        })
    }
}
