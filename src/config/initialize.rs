use std::path::Path;
use std::sync::Arc;

use tokio::fs;

use crate::client::{consul, Api};
use crate::common::{error, info};
use crate::config::Config;
use crate::core::{self, Decision, HttpProbe, ImportSummary, RetryConnector, TreeImporter};
use crate::Result;

/// Result of a seed run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    // The prefix was already populated.
    Skipped,
    Imported(ImportSummary),
}

#[derive(Debug)]
pub struct Initializer {
    pub(crate) config: Config,
}

impl Initializer {
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub async fn load_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = fs::File::open(path).await?;
        let config = serde_yaml::from_reader::<_, Config>(f.into_std().await)?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Wait for the store to come up, then seed it.
    pub async fn run(self) -> Result<Outcome> {
        let store_config = self.config.store();
        let retry = self.config.retry();

        info!(
            "Connecting to store at {}:{}",
            store_config.host(),
            store_config.port()
        );

        let probe = HttpProbe::new(store_config, retry.probe_timeout());
        let connector =
            RetryConnector::new(probe, retry.fail_limit(), retry.wait_time_between_fails());

        let client = match connector
            .connect(|| store_config.base_url().map(consul::Client::new))
            .await
        {
            Ok(client) => client,
            Err(unreachable) => {
                error!("Cannot connect to store");
                return Err(unreachable.into());
            }
        };

        self.run_with_store(Arc::new(client)).await
    }

    /// Seed an already connected store.
    pub async fn run_with_store<S>(&self, store: Arc<S>) -> Result<Outcome>
    where
        S: Api + ?Sized + 'static,
    {
        let prefix = self.config.global_prefix();

        match core::should_import(store.as_ref(), prefix, self.config.reset()).await? {
            Decision::Skip => {
                info!(
                    "{} exists! The configuration data has been initialized.",
                    prefix
                );
                return Ok(Outcome::Skipped);
            }
            Decision::Reset => info!("{} was reset. Start importing configuration data.", prefix),
            Decision::Proceed => {
                info!("{} doesn't exist! Start importing configuration data.", prefix)
            }
        }

        let base = self.config.config_path();
        let importer = TreeImporter::new(store, self.config.import_options());
        let summary = importer.import_from(base).await.map_err(|err| {
            error!(base = %base.display(), "Import aborted");
            err
        })?;

        info!(
            files = summary.files,
            keys = summary.keys,
            "Import completed"
        );

        Ok(Outcome::Imported(summary))
    }
}

