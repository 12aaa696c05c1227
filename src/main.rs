/*!
`alice`: run the initiator side of the key exchange once.

Exits 0 once the shared secret has been derived and 1 on any failure.
Set `RUST_LOG` to change the log level (default `debug`).
*/

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pqc_initiator::{Initiator, InitiatorBuilder, SystemEntropy, DEFAULT_PARAMS_FILE};

#[derive(Parser)]
#[command(name = "alice", version, about = "Initiator side of an ML-KEM key exchange", long_about = None)]
struct Cli {
    /// JSON file holding the seeds and the listen port
    #[arg(short = 'p', long = "params", default_value = DEFAULT_PARAMS_FILE)]
    params: PathBuf,

    /// Peer to send the encapsulation key to, as host:port
    #[arg(short = 'a', long = "address")]
    address: Option<String>,

    /// Draw fresh seeds from the OS instead of the parameter file
    #[arg(long = "system-entropy")]
    system_entropy: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn initiator_for(cli: &Cli) -> Initiator {
    let builder = InitiatorBuilder::new();

    #[cfg(feature = "debug-seeds")]
    let builder = if cli.system_entropy {
        builder.with_entropy(SystemEntropy)
    } else {
        builder.with_seeds_from_params()
    };
    #[cfg(not(feature = "debug-seeds"))]
    let builder = {
        if !cli.system_entropy {
            log::info!("Built without debug-seeds, ignoring the seeds in the parameter file");
        }
        builder.with_entropy(SystemEntropy)
    };

    builder.build()
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let mut initiator = initiator_for(&cli);
    match initiator.run(&cli.params, cli.address.as_deref()) {
        Ok(outcome) => {
            log::info!(
                "Handshake complete ({}), {} byte shared secret",
                outcome.parameter_set,
                outcome.shared_secret.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Initiator failed in state {}: {}", initiator.state(), e);
            ExitCode::FAILURE
        }
    }
}
