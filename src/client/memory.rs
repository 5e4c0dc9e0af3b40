use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::Api;
use crate::Result;

/// Store that keeps every key in process memory.
///
/// Prefix semantics follow Consul: a prefix matches every key that starts
/// with it, and listing an empty prefix reports not found.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
            puts: AtomicUsize::new(0),
        }
    }

    /// Copy of every stored key value pair in key order.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    /// Number of `put_value` calls served so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A panicking writer cannot leave the map half updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Api for MemoryStore {
    async fn get_keys(&self, prefix: &str) -> Result<Option<Vec<String>>> {
        let keys = self
            .lock()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect::<Vec<_>>();

        Ok(if keys.is_empty() { None } else { Some(keys) })
    }

    async fn delete_keys(&self, prefix: &str) -> Result<()> {
        self.lock().retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }
}
