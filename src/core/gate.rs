use crate::client::Api;
use crate::common::info;
use crate::core::StoreKey;
use crate::Result;

/// What to do with a prefix before importing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    // Keys already exist under the prefix. Nothing is imported.
    Skip,
    // The prefix was cleared and will be imported again.
    Reset,
    // Nothing under the prefix yet.
    Proceed,
}

impl Decision {
    pub fn should_import(self) -> bool {
        !matches!(self, Decision::Skip)
    }
}

/// Decide whether `prefix` needs an import, clearing it first when `reset`
/// is requested.
///
/// The check and the following writes are not atomic. Two seeders running
/// against the same prefix may both see it empty.
pub async fn should_import<S>(store: &S, prefix: &str, reset: bool) -> Result<Decision>
where
    S: Api + ?Sized,
{
    let namespace = StoreKey::namespace(prefix);

    if reset {
        info!(%namespace, "Reset requested, deleting keys");
        store.delete_keys(&namespace).await?;
        return Ok(Decision::Reset);
    }

    match store.get_keys(&namespace).await? {
        Some(keys) if !keys.is_empty() => Ok(Decision::Skip),
        _ => Ok(Decision::Proceed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemoryStore;

    #[test]
    fn empty_store_proceeds() {
        tokio_test::block_on(async move {
            let store = MemoryStore::new();
            let decision = should_import(&store, "config", false).await.unwrap();

            assert_eq!(decision, Decision::Proceed);
            assert!(decision.should_import());
        })
    }

    #[test]
    fn populated_prefix_skips() {
        tokio_test::block_on(async move {
            let store = MemoryStore::with_entries(vec![("config/app/a", "1")]);
            let decision = should_import(&store, "config", false).await.unwrap();

            assert_eq!(decision, Decision::Skip);
            assert!(!decision.should_import());
        })
    }

    #[test]
    fn sibling_namespace_does_not_count() {
        tokio_test::block_on(async move {
            let store = MemoryStore::with_entries(vec![("configuration/a", "1")]);
            let decision = should_import(&store, "config", false).await.unwrap();

            assert_eq!(decision, Decision::Proceed);
        })
    }

    #[test]
    fn reset_deletes_prefix() {
        tokio_test::block_on(async move {
            let store = MemoryStore::with_entries(vec![
                ("config/app/a", "1"),
                ("config/b", "2"),
                ("other/c", "3"),
            ]);
            let decision = should_import(&store, "config", true).await.unwrap();

            assert_eq!(decision, Decision::Reset);
            assert!(decision.should_import());
            assert_eq!(
                store.snapshot().into_iter().collect::<Vec<_>>(),
                vec![("other/c".to_owned(), "3".to_owned())]
            );
        })
    }
}
