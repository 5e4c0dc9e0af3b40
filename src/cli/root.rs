use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::{probe, seed};
use crate::common::debug;
use crate::config::Initializer;
use crate::Result;

/// Kvseed command
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct KvseedCommand {
    /// Global options
    #[command(flatten)]
    pub global: GlobalOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Configuration file path
    #[arg(long, short = 'C', env = "KVSEED_CONFIG_PATH", global = true)]
    pub config: Option<PathBuf>,
    /// Store protocol(http or https)
    #[arg(long, env = "KVSEED_STORE_PROTOCOL", global = true)]
    pub protocol: Option<String>,
    /// Store host
    #[arg(long, env = "KVSEED_STORE_HOST", global = true)]
    pub host: Option<String>,
    /// Store port
    #[arg(long, env = "KVSEED_STORE_PORT", global = true)]
    pub port: Option<String>,
}

impl GlobalOptions {
    /// Load the configuration file, if any, and apply the store flags on top.
    pub async fn initializer(self) -> Result<Initializer> {
        let GlobalOptions {
            config,
            mut protocol,
            mut host,
            mut port,
        } = self;

        let mut initializer = match config {
            Some(path) => {
                debug!("Load config file {}", path.display());
                Initializer::load_config_file(path).await?
            }
            None => Initializer::from_config(Default::default()),
        };

        let store = initializer.config_mut().store_mut();
        store.set_protocol(&mut protocol);
        store.set_host(&mut host);
        store.set_port(&mut port);

        Ok(initializer)
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a configuration directory into the store
    Seed(seed::SeedCommand),
    /// Check once whether the store is reachable
    Probe(probe::ProbeCommand),
}

/// Parse command line args
pub fn parse() -> KvseedCommand {
    KvseedCommand::parse()
}
