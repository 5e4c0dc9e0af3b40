use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::Args;

use crate::cli::GlobalOptions;
use crate::common::debug;
use crate::config::{Config, Outcome};
use crate::Result;

/// Seed the store from a configuration directory
#[derive(Args, Debug)]
pub struct SeedCommand {
    /// Directory tree to import
    #[arg(long, env = "KVSEED_CONFIG_DIR")]
    config_path: Option<PathBuf>,
    /// Namespace root of every imported key
    #[arg(long, env = "KVSEED_GLOBAL_PREFIX")]
    global_prefix: Option<String>,
    /// Delete every key under the prefix before importing(--reset=false overrides the config file)
    #[arg(
        long,
        env = "KVSEED_RESET",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    reset: Option<bool>,
    /// Health checks before giving up on the store
    #[arg(long, env = "KVSEED_FAIL_LIMIT", allow_negative_numbers = true)]
    fail_limit: Option<i32>,
    /// Wait before each health check
    #[arg(long, env = "KVSEED_WAIT_TIME_BETWEEN_FAILS_MILLISECONDS")]
    wait_time_between_fails: Option<u64>,
    /// Timeout of a single health check
    #[arg(long, env = "KVSEED_PROBE_TIMEOUT_MILLISECONDS")]
    probe_timeout: Option<u64>,
    /// File name extension to import(repeatable)
    #[arg(
        long = "acceptable-extension",
        env = "KVSEED_ACCEPTABLE_EXTENSIONS",
        value_delimiter = ','
    )]
    acceptable_extensions: Vec<String>,
    /// File name extension parsed as yaml(repeatable)
    #[arg(
        long = "yaml-extension",
        env = "KVSEED_YAML_EXTENSIONS",
        value_delimiter = ','
    )]
    yaml_extensions: Vec<String>,
    /// Concurrent writes per file
    #[arg(long, env = "KVSEED_WRITE_CONCURRENCY")]
    write_concurrency: Option<usize>,
}

impl SeedCommand {
    pub async fn run(self, global: GlobalOptions) -> Result<Outcome> {
        let SeedCommand {
            mut config_path,
            mut global_prefix,
            reset,
            fail_limit,
            wait_time_between_fails,
            probe_timeout,
            acceptable_extensions,
            yaml_extensions,
            write_concurrency,
        } = self;

        let mut initializer = global.initializer().await?;

        let mut flags = {
            let mut config = Config::default();

            config.set_config_path(&mut config_path);
            config.set_global_prefix(&mut global_prefix);
            config.set_reset(reset);
            config.set_acceptable_extensions(&mut non_empty(acceptable_extensions));
            config.set_yaml_extensions(&mut non_empty(yaml_extensions));
            config.set_write_concurrency(write_concurrency);

            let retry = config.retry_mut();
            retry.set_fail_limit(fail_limit);
            retry.set_wait_time_between_fails_milliseconds(wait_time_between_fails);
            retry.set_probe_timeout_milliseconds(probe_timeout);
            config
        };

        initializer.config_mut().override_merge(&mut flags);

        debug!("{:?}", initializer);

        initializer.run().await
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
