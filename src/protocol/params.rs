/*!
Parameter loading.

The parameter file is a small JSON record:

```json
{
  "d": "<hex>",
  "z": "<hex>",
  "parameter_set": "ML-KEM-512",
  "connections": {
    "port": 5000,
    "host": "127.0.0.1",
    "connect_timeout_ms": 5000,
    "receive_timeout_ms": 30000
  }
}
```

`parameter_set`, `host` and the timeouts are optional. Checks run in a
fixed order so that the first problem in a file is the one reported.
*/

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::constants::{DEFAULT_LISTEN_HOST, MIN_LISTEN_PORT};
use crate::core::crypto::config::ParameterSet;
use crate::core::error::{ConfigError, Result};
use crate::core::memory::SecretBytes;
use crate::protocol::transport::TransportConfig;

/// Validated handshake parameters, immutable once loaded
#[derive(Debug, Clone)]
pub struct HandshakeParameters {
    /// Key generation seed `d`
    pub seed_d: SecretBytes,
    /// Key generation seed `z`
    pub seed_z: SecretBytes,
    /// Port the peer's ciphertext is received on
    pub listen_port: u16,
    /// Interface the receiver binds to
    pub listen_host: String,
    /// KEM parameter set
    pub parameter_set: ParameterSet,
    /// Transport deadlines
    pub transport: TransportConfig,
}

#[derive(Debug, Deserialize)]
struct RawParameters {
    d: Option<String>,
    z: Option<String>,
    parameter_set: Option<String>,
    connections: Option<RawConnections>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConnections {
    port: Option<i64>,
    host: Option<String>,
    connect_timeout_ms: Option<u64>,
    receive_timeout_ms: Option<u64>,
    // Any other key still makes the section present.
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

impl RawConnections {
    fn is_empty(&self) -> bool {
        self.port.is_none()
            && self.host.is_none()
            && self.connect_timeout_ms.is_none()
            && self.receive_timeout_ms.is_none()
            && self.other.is_empty()
    }
}

impl HandshakeParameters {
    /// Build parameters directly, applying the same checks as [`load`](Self::load)
    pub fn new(seed_d: &[u8], seed_z: &[u8], listen_port: i64) -> Result<Self> {
        if seed_d.is_empty() {
            return Err(ConfigError::MissingSeed { field: "d" }.into());
        }
        if seed_z.is_empty() {
            return Err(ConfigError::MissingSeed { field: "z" }.into());
        }

        Ok(Self {
            seed_d: SecretBytes::from_slice(seed_d),
            seed_z: SecretBytes::from_slice(seed_z),
            listen_port: validate_port(listen_port)?,
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            parameter_set: ParameterSet::default(),
            transport: TransportConfig::default(),
        })
    }

    /// Read and validate the parameter file at `path`.
    ///
    /// Checks, in order: the file exists and is readable, both seeds are
    /// present valid hex, a `connections` section exists, and its port is
    /// at least 1024.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let raw: RawParameters = serde_json::from_str(&text).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawParameters) -> Result<Self> {
        let seed_d = decode_seed(raw.d.as_deref(), "d")?;
        let seed_z = decode_seed(raw.z.as_deref(), "z")?;

        let connections = match raw.connections {
            Some(connections) if !connections.is_empty() => connections,
            _ => return Err(ConfigError::MissingListenConfig.into()),
        };
        // An absent port reads as 0, which is then rejected.
        let listen_port = validate_port(connections.port.unwrap_or(0))?;

        let parameter_set = match raw.parameter_set {
            Some(name) => name.parse()?,
            None => ParameterSet::default(),
        };

        let receive_timeout = millis(connections.receive_timeout_ms);
        Ok(Self {
            seed_d,
            seed_z,
            listen_port,
            listen_host: connections
                .host
                .unwrap_or_else(|| DEFAULT_LISTEN_HOST.to_string()),
            parameter_set,
            transport: TransportConfig {
                connect_timeout: millis(connections.connect_timeout_ms),
                accept_timeout: receive_timeout,
                read_timeout: receive_timeout,
            },
        })
    }
}

/// Hex-decode a seed. Whitespace between digits is ignored.
fn decode_seed(value: Option<&str>, field: &'static str) -> Result<SecretBytes> {
    let missing = || ConfigError::MissingSeed { field };

    let digits: String = value
        .ok_or_else(missing)?
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = hex::decode(&digits).map_err(|_| missing())?;
    if bytes.is_empty() {
        return Err(missing().into());
    }
    Ok(SecretBytes::new(bytes))
}

fn validate_port(port: i64) -> Result<u16> {
    match u16::try_from(port) {
        Ok(port) if port >= MIN_LISTEN_PORT => Ok(port),
        _ => Err(ConfigError::InvalidPort(port).into()),
    }
}

// Zero disables the limit.
fn millis(value: Option<u64>) -> Option<Duration> {
    value.filter(|ms| *ms > 0).map(Duration::from_millis)
}
