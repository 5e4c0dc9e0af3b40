use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing_futures::Instrument;

use crate::client::Api;
use crate::common::{debug, info, trace, warn};
use crate::core::parse::{ExtensionFilter, Format, Properties};
use crate::core::{relative_directory, StoreKey, Walk};
use crate::{KvseedError, Result};

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub prefix: String,
    pub filter: ExtensionFilter,
    // Max in flight writes for one file.
    pub write_concurrency: usize,
}

/// Counts of what one import wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub files: usize,
    pub keys: usize,
}

// Imports a directory tree of configuration files into the store.
pub struct TreeImporter<S: ?Sized> {
    store: Arc<S>,
    options: ImportOptions,
}

impl<S> TreeImporter<S>
where
    S: Api + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, options: ImportOptions) -> Self {
        Self { store, options }
    }

    /// Walk `base` and write every property of every accepted file.
    ///
    /// Files are processed one at a time; the writes of a file all finish
    /// before the next file is read. The first read, parse or write error
    /// aborts the import. Keys written before the error stay in the store.
    pub async fn import_from(&self, base: &Path) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        let mut walk = Walk::new(base);
        loop {
            let (rest, next) = next_file(walk).await?;
            walk = rest;
            let file = match next {
                Some(file) => file?,
                None => break,
            };
            let name = match file.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            let format = match self.options.filter.select(&name) {
                Some(format) => format,
                None => {
                    trace!(file = %file.display(), "Not a config file");
                    continue;
                }
            };

            let directory = relative_directory(base, &file);
            info!(
                "Found config file: {} in context {}",
                name,
                directory.join("/")
            );

            let properties = read_properties(&file, format).await?;
            let span = tracing::info_span!("file", path = %file.display());
            let written = self
                .write_properties(&directory, properties)
                .instrument(span)
                .await?;

            summary.files += 1;
            summary.keys += written;
        }

        Ok(summary)
    }

    // Fan out the writes of one file and wait for all of them.
    async fn write_properties(
        &self,
        directory: &[String],
        properties: Properties,
    ) -> Result<usize> {
        let permits = Arc::new(Semaphore::new(self.options.write_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut count = 0;

        for (name, value) in properties {
            if !StoreKey::is_valid_name(&name) {
                warn!("Skip property without a name segment: {:?}", name);
                continue;
            }
            let key = StoreKey::derive(&self.options.prefix, directory, &name);
            debug!("Found property name: {} ; and value: {}", name, value);

            count += 1;

            let store = Arc::clone(&self.store);
            let permits = Arc::clone(&permits);
            let span = tracing::debug_span!("put", %key);
            tasks.spawn(
                async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|err| KvseedError::Store(err.to_string()))?;
                    store.put_value(&key, &value).await
                }
                .instrument(span),
            );
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|err| KvseedError::Store(format!("write task failed. {}", err)))
                .and_then(|written| written);
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(count),
        }
    }
}

// Directory reads block, so every step of the walk runs on the blocking pool.
async fn next_file(mut walk: Walk) -> Result<(Walk, Option<Result<PathBuf>>)> {
    let stepped = tokio::task::spawn_blocking(move || {
        let next = walk.next();
        (walk, next)
    })
    .await
    .map_err(io::Error::from)?;

    Ok(stepped)
}

async fn read_properties(file: &Path, format: Format) -> Result<Properties> {
    let content = tokio::fs::read(file)
        .await
        .map_err(|err| KvseedError::import(file, err.into()))?;

    format
        .parse(&content)
        .map_err(|err| KvseedError::import(file, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Duration;

    use crate::client::memory::MemoryStore;

    fn options() -> ImportOptions {
        ImportOptions {
            prefix: "config".to_owned(),
            filter: ExtensionFilter::new(
                vec![".yaml", ".yml", ".properties"],
                vec![".yaml", ".yml"],
            ),
            write_concurrency: 4,
        }
    }

    #[test]
    fn root_and_nested_files() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            fs::write(root.path().join("app.properties"), "x.y=1\n").unwrap();
            fs::create_dir(root.path().join("sub")).unwrap();
            fs::write(root.path().join("sub").join("app.properties"), "x.y=1\n").unwrap();

            let store = Arc::new(MemoryStore::new());
            let summary = TreeImporter::new(store.clone(), options())
                .import_from(root.path())
                .await
                .unwrap();

            assert_eq!(summary, ImportSummary { files: 2, keys: 2 });
            let snapshot = store.snapshot();
            assert_eq!(snapshot["config/x.y"], "1");
            assert_eq!(snapshot["config/sub/x.y"], "1");
            assert_eq!(snapshot.len(), 2);
        })
    }

    #[test]
    fn yaml_files_are_flattened() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            fs::create_dir(root.path().join("application")).unwrap();
            fs::write(
                root.path().join("application").join("application.yml"),
                "logging:\n  level:\n    org.edgexfoundry: INFO\n",
            )
            .unwrap();

            let store = Arc::new(MemoryStore::new());
            TreeImporter::new(store.clone(), options())
                .import_from(root.path())
                .await
                .unwrap();

            assert_eq!(
                store
                    .get_value("config/application/logging.level.org.edgexfoundry")
                    .await
                    .unwrap(),
                Some("INFO".to_owned())
            );
        })
    }

    #[test]
    fn other_files_are_ignored() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            fs::write(root.path().join("notes.txt"), "x.y=1\n").unwrap();

            let store = Arc::new(MemoryStore::new());
            let summary = TreeImporter::new(store.clone(), options())
                .import_from(root.path())
                .await
                .unwrap();

            assert_eq!(summary, ImportSummary::default());
            assert_eq!(store.put_count(), 0);
        })
    }

    #[test]
    fn parse_error_aborts() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            fs::write(root.path().join("broken.yaml"), "a: [1, 2\n").unwrap();

            let store = Arc::new(MemoryStore::new());
            let err = TreeImporter::new(store.clone(), options())
                .import_from(root.path())
                .await
                .unwrap_err();

            match err {
                KvseedError::Import { path, .. } => {
                    assert_eq!(path, root.path().join("broken.yaml"))
                }
                other => panic!("unexpected {:?}", other),
            }
        })
    }

    #[test]
    fn missing_base_path() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            let store = Arc::new(MemoryStore::new());

            let err = TreeImporter::new(store, options())
                .import_from(&root.path().join("foobar"))
                .await
                .unwrap_err();

            assert!(matches!(err, KvseedError::Import { .. }));
        })
    }

    struct FailingStore;

    #[async_trait]
    impl Api for FailingStore {
        async fn get_keys(&self, _prefix: &str) -> Result<Option<Vec<String>>> {
            Ok(None)
        }
        async fn delete_keys(&self, _prefix: &str) -> Result<()> {
            Ok(())
        }
        async fn put_value(&self, key: &str, _value: &str) -> Result<()> {
            Err(KvseedError::Store(format!("rejected {}", key)))
        }
        async fn get_value(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn write_error_aborts() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            fs::write(root.path().join("app.properties"), "a=1\nb=2\n").unwrap();

            let err = TreeImporter::new(Arc::new(FailingStore), options())
                .import_from(root.path())
                .await
                .unwrap_err();

            assert!(matches!(err, KvseedError::Store(_)));
        })
    }

    #[test]
    fn names_without_segments_are_skipped() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            fs::write(root.path().join("app.yaml"), "\"\": empty\nok: 1\n").unwrap();
            fs::create_dir(root.path().join("sub")).unwrap();
            fs::write(
                root.path().join("sub").join("app.properties"),
                "/=slash\n//=double\nok=2\n",
            )
            .unwrap();

            let store = Arc::new(MemoryStore::new());
            let summary = TreeImporter::new(store.clone(), options())
                .import_from(root.path())
                .await
                .unwrap();

            assert_eq!(summary, ImportSummary { files: 2, keys: 2 });
            let want = vec![("config/ok", "1"), ("config/sub/ok", "2")]
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect::<std::collections::BTreeMap<_, _>>();
            assert_eq!(store.snapshot(), want);
        })
    }

    // Records which directory each in flight write belongs to.
    #[derive(Default)]
    struct SlowStore {
        in_flight: Mutex<Vec<String>>,
        peak: AtomicUsize,
        puts: AtomicUsize,
        files_overlapped: AtomicBool,
    }

    #[async_trait]
    impl Api for SlowStore {
        async fn get_keys(&self, _prefix: &str) -> Result<Option<Vec<String>>> {
            Ok(None)
        }
        async fn delete_keys(&self, _prefix: &str) -> Result<()> {
            Ok(())
        }
        async fn put_value(&self, key: &str, _value: &str) -> Result<()> {
            // config/<dir>/<name>
            let dir = key.split('/').nth(1).unwrap_or_default().to_owned();
            {
                let mut in_flight = self.in_flight.lock().unwrap();
                if in_flight.iter().any(|other| other != &dir) {
                    self.files_overlapped.store(true, Ordering::SeqCst);
                }
                in_flight.push(dir.clone());
                self.peak.fetch_max(in_flight.len(), Ordering::SeqCst);
            }

            tokio::time::sleep(Duration::from_millis(5)).await;

            {
                let mut in_flight = self.in_flight.lock().unwrap();
                if let Some(pos) = in_flight.iter().position(|other| other == &dir) {
                    in_flight.remove(pos);
                }
            }
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn get_value(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn writes_are_bounded_and_grouped_by_file() {
        tokio_test::block_on(async move {
            let root = tempfile::tempdir().unwrap();
            let properties = (0..6)
                .map(|i| format!("key.{}={}\n", i, i))
                .collect::<String>();
            for dir in &["a", "b", "c"] {
                fs::create_dir(root.path().join(dir)).unwrap();
                fs::write(root.path().join(dir).join("app.properties"), &properties).unwrap();
            }

            let store = Arc::new(SlowStore::default());
            let mut options = options();
            options.write_concurrency = 2;

            let summary = TreeImporter::new(store.clone(), options)
                .import_from(root.path())
                .await
                .unwrap();

            assert_eq!(summary, ImportSummary { files: 3, keys: 18 });
            assert_eq!(store.puts.load(Ordering::SeqCst), 18);
            assert_eq!(store.peak.load(Ordering::SeqCst), 2);
            assert!(!store.files_overlapped.load(Ordering::SeqCst));
        })
    }
}
