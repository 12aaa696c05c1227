/*!
Handshake orchestration for the initiator.

One run performs, strictly in sequence and with a single attempt each:

1. load and validate the parameters
2. generate a key pair from two seeds
3. send the encapsulation key to the peer
4. receive the peer's ciphertext on the listen port
5. decapsulate the shared secret

Any failure moves the initiator to `Aborted` with a reason and ends the run.
*/

use std::path::Path;

use bytes::Bytes;

use crate::core::crypto::config::ParameterSet;
use crate::core::crypto::entropy::{EntropySource, SystemEntropy};
#[cfg(any(test, feature = "debug-seeds"))]
use crate::core::crypto::entropy::FixedSeeds;
use crate::core::crypto::kem::{EncapsulationKey, KemProvider, KeyGenSeeds, SharedSecret};
use crate::core::crypto::ml_kem::MlKem;
use crate::core::error::{Error, KeyExchangeError, Result};
use crate::protocol::params::HandshakeParameters;
use crate::protocol::peer::PeerAddress;
use crate::protocol::state::{AbortReason, HandshakeState};
use crate::protocol::transport::{CancellationToken, InboundReceiver, OutboundSender, TransportConfig};

/// Where key generation seeds come from
pub enum SeedSource {
    /// Draw fresh seeds from an entropy source
    Entropy(Box<dyn EntropySource>),
    /// Replay the `d`/`z` seeds of the parameter file (debug builds only)
    #[cfg(any(test, feature = "debug-seeds"))]
    ParameterFile,
}

impl Default for SeedSource {
    fn default() -> Self {
        SeedSource::Entropy(Box::new(SystemEntropy))
    }
}

impl std::fmt::Debug for SeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedSource::Entropy(source) if source.is_deterministic() => write!(f, "Entropy(deterministic)"),
            SeedSource::Entropy(_) => write!(f, "Entropy"),
            #[cfg(any(test, feature = "debug-seeds"))]
            SeedSource::ParameterFile => write!(f, "ParameterFile"),
        }
    }
}

/// Result of a completed handshake
#[derive(Debug, Clone)]
pub struct HandshakeOutcome {
    /// Parameter set the run used
    pub parameter_set: ParameterSet,
    /// Encapsulation key sent to the peer
    pub encapsulation_key: EncapsulationKey,
    /// Ciphertext received from the peer
    pub ciphertext: Bytes,
    /// Derived shared secret
    pub shared_secret: SharedSecret,
}

/// Builder for [`Initiator`]
#[derive(Default)]
pub struct InitiatorBuilder {
    kem: Option<Box<dyn KemProvider>>,
    seeds: SeedSource,
    transport: Option<TransportConfig>,
    cancel: Option<CancellationToken>,
}

impl InitiatorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific KEM instead of ML-KEM for the configured parameter set
    pub fn with_kem(mut self, kem: impl KemProvider + 'static) -> Self {
        self.kem = Some(Box::new(kem));
        self
    }

    /// Draw seeds from `source`
    pub fn with_entropy(mut self, source: impl EntropySource + 'static) -> Self {
        self.seeds = SeedSource::Entropy(Box::new(source));
        self
    }

    /// Replay the seeds of the parameter file
    #[cfg(any(test, feature = "debug-seeds"))]
    pub fn with_seeds_from_params(mut self) -> Self {
        self.seeds = SeedSource::ParameterFile;
        self
    }

    /// Override the deadlines from the parameter file
    pub fn with_transport(mut self, config: TransportConfig) -> Self {
        self.transport = Some(config);
        self
    }

    /// Abort the run once `token` is triggered
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the initiator
    pub fn build(self) -> Initiator {
        Initiator {
            kem: self.kem,
            seeds: self.seeds,
            transport: self.transport,
            cancel: self.cancel,
            state: HandshakeState::Init,
            history: vec![HandshakeState::Init],
        }
    }
}

/// Initiator side of the handshake. Runs once.
pub struct Initiator {
    kem: Option<Box<dyn KemProvider>>,
    seeds: SeedSource,
    transport: Option<TransportConfig>,
    cancel: Option<CancellationToken>,
    state: HandshakeState,
    history: Vec<HandshakeState>,
}

impl Initiator {
    /// Initiator with secure seeds and ML-KEM for the configured parameter set
    pub fn new() -> Self {
        InitiatorBuilder::new().build()
    }

    /// Create a builder
    pub fn builder() -> InitiatorBuilder {
        InitiatorBuilder::new()
    }

    /// Current state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Every state entered so far, in order
    pub fn history(&self) -> &[HandshakeState] {
        &self.history
    }

    /// Load the parameter file at `params_path`, then run the handshake
    /// against `peer` (`host:port`).
    pub fn run(&mut self, params_path: impl AsRef<Path>, peer: Option<&str>) -> Result<HandshakeOutcome> {
        self.ensure_fresh()?;

        let params_path = params_path.as_ref();
        log::debug!("Loading handshake parameters from {}", params_path.display());
        let params = match HandshakeParameters::load(params_path) {
            Ok(params) => params,
            Err(e) => return Err(self.abort(AbortReason::ConfigError, e)),
        };
        self.run_with_params(params, peer)
    }

    /// Run the handshake with parameters that are already loaded
    pub fn run_with_params(&mut self, params: HandshakeParameters, peer: Option<&str>) -> Result<HandshakeOutcome> {
        self.ensure_fresh()?;
        self.advance(HandshakeState::ParamsLoaded);

        let kem: Box<dyn KemProvider> = match self.kem.take() {
            Some(kem) => {
                if kem.parameter_set() != params.parameter_set {
                    log::warn!(
                        "KEM provider uses {}, parameter file asks for {}",
                        kem.parameter_set(),
                        params.parameter_set
                    );
                }
                kem
            }
            None => Box::new(MlKem::new(params.parameter_set)),
        };
        let transport = self.transport.unwrap_or(params.transport);
        log::debug!("Starting initiator with {} configuration", kem.parameter_set());

        // Key generation
        let key_pair = match self.seeds_for(&params).and_then(|seeds| kem.key_gen(&seeds.d, &seeds.z)) {
            Ok(pair) => pair,
            Err(e) => return Err(self.abort(AbortReason::KeyGenFailed, e)),
        };
        if key_pair.encapsulation_key.len() != kem.encapsulation_key_size() {
            let e = Error::KeyExchange(KeyExchangeError::KeyGenerationFailed);
            return Err(self.abort(AbortReason::KeyGenFailed, e));
        }
        self.advance(HandshakeState::KeyGenerated);

        // Message 1: encapsulation key to the peer
        let peer = match peer {
            Some(peer) => peer,
            None => return Err(self.abort(AbortReason::NoPeerAddress, Error::NoPeerAddress)),
        };
        let peer: PeerAddress = match peer.parse() {
            Ok(peer) => peer,
            Err(e) => return Err(self.abort(AbortReason::InvalidPeerAddress, e)),
        };
        log::debug!("Sending the ek to {}", peer);
        log::debug!("The amount of data we are sending is {} bytes", key_pair.encapsulation_key.len());
        let sender = self.with_token(OutboundSender::new(transport), OutboundSender::with_cancellation);
        if let Err(e) = sender.send(&peer, key_pair.encapsulation_key.as_bytes()) {
            return Err(self.abort(AbortReason::SendFailed, e));
        }
        self.advance(HandshakeState::EkSent);

        // Message 2: ciphertext from the peer
        let expected = kem.ciphertext_size();
        log::debug!("Waiting for the peer's response on port {}...", params.listen_port);
        let receiver = self.with_token(InboundReceiver::new(transport), InboundReceiver::with_cancellation);
        let ciphertext = match receiver.receive_fixed_length(&params.listen_host, params.listen_port, expected) {
            Ok(ciphertext) => ciphertext,
            Err(e) => return Err(self.abort(AbortReason::ReceiveFailed, e)),
        };
        if ciphertext.len() < expected {
            let e = Error::ShortRead {
                expected,
                received: ciphertext.len(),
            };
            return Err(self.abort(AbortReason::ReceiveFailed, e));
        }
        self.advance(HandshakeState::CipherTextReceived);

        log::debug!("Got the peer's response! Retrieving the shared secret...");
        let shared_secret = match kem.decaps(&key_pair.decapsulation_key, &ciphertext) {
            Ok(secret) => secret,
            Err(e) => return Err(self.abort(AbortReason::DecapsFailed, e)),
        };
        self.advance(HandshakeState::SecretDerived);

        log::debug!("Shared secret obtained!");
        log::debug!("It should be {}", shared_secret.to_hex());
        self.advance(HandshakeState::Done);

        Ok(HandshakeOutcome {
            parameter_set: kem.parameter_set(),
            encapsulation_key: key_pair.encapsulation_key,
            ciphertext,
            shared_secret,
        })
    }

    #[cfg_attr(not(any(test, feature = "debug-seeds")), allow(unused_variables))]
    fn seeds_for(&mut self, params: &HandshakeParameters) -> Result<KeyGenSeeds> {
        match &mut self.seeds {
            SeedSource::Entropy(source) => source.key_gen_seeds(),
            #[cfg(any(test, feature = "debug-seeds"))]
            SeedSource::ParameterFile => {
                FixedSeeds::new(params.seed_d.clone(), params.seed_z.clone()).key_gen_seeds()
            }
        }
    }

    fn with_token<T>(&self, component: T, attach: fn(T, CancellationToken) -> T) -> T {
        match &self.cancel {
            Some(token) => attach(component, token.clone()),
            None => component,
        }
    }

    fn ensure_fresh(&self) -> Result<()> {
        if self.state != HandshakeState::Init {
            return Err(Error::InvalidState {
                expected: HandshakeState::Init.to_string(),
                actual: self.state.to_string(),
            });
        }
        Ok(())
    }

    fn advance(&mut self, next: HandshakeState) {
        debug_assert!(self.state.can_transition_to(next), "{} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn abort(&mut self, reason: AbortReason, error: Error) -> Error {
        let reason = match error {
            Error::Cancelled => AbortReason::Cancelled,
            _ => reason,
        };
        log::error!("Handshake aborted in state {} ({}): {}", self.state, reason, error);
        self.advance(HandshakeState::Aborted(reason));
        error
    }
}

impl Default for Initiator {
    fn default() -> Self {
        Self::new()
    }
}
