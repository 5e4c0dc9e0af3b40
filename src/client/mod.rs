use async_trait::async_trait;

use crate::Result;

pub mod consul;
pub mod memory;

/// Operations the seeder needs from a key value store.
///
/// Keys are `/` separated paths. Listing and deleting work on every key that
/// starts with the given prefix.
#[async_trait]
pub trait Api: Send + Sync {
    /// List keys under `prefix`. `None` means the store has nothing there.
    async fn get_keys(&self, prefix: &str) -> Result<Option<Vec<String>>>;
    async fn delete_keys(&self, prefix: &str) -> Result<()>;
    async fn put_value(&self, key: &str, value: &str) -> Result<()>;
    async fn get_value(&self, key: &str) -> Result<Option<String>>;
}
