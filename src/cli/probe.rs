use clap::Args;
use tokio::time::Duration;

use crate::cli::GlobalOptions;
use crate::core::{HttpProbe, Probe};
use crate::{KvseedError, Result};

/// Check the store status endpoint once
#[derive(Args, Debug)]
pub struct ProbeCommand {
    /// Timeout of the health check
    #[arg(long, env = "KVSEED_PROBE_TIMEOUT_MILLISECONDS")]
    probe_timeout: Option<u64>,
}

impl ProbeCommand {
    pub async fn run(self, global: GlobalOptions) -> Result<()> {
        let initializer = global.initializer().await?;
        let config = initializer.config();

        let timeout = self
            .probe_timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.retry().probe_timeout());
        let probe = HttpProbe::new(config.store(), timeout);

        match probe.check().await {
            Ok(()) => {
                println!(
                    "OK {}:{}",
                    config.store().host(),
                    config.store().port()
                );
                Ok(())
            }
            Err(err) => {
                eprintln!("{}", err);
                Err(KvseedError::Unreachable { attempts: 1 })
            }
        }
    }
}
