//! Storage providers for LinkVault.
//!
//! A provider persists the whole bookmark collection to one concrete medium.
//! The [`StorageManager`](crate::managers::storage_manager::StorageManager)
//! depends only on the [`StorageProvider`] trait, never on backend details.
//!
//! Two media are implemented:
//! - [`key_value`]: one opaque value under one fixed key.
//! - [`table`]: one SQLite row per bookmark, rewritten in a single transaction.

use async_trait::async_trait;

use crate::types::backup::LoadedCollection;
use crate::types::bookmark::Bookmark;
use crate::types::errors::StorageResult;

pub mod key_value;
pub mod table;

pub use key_value::{FileMedium, KeyValueMedium, KeyValueProvider, MemoryMedium};
pub use table::TableProvider;

/// Capability set every storage backend implements.
///
/// Implementations serialize their own operations, so a second call issued
/// before the first settles waits instead of interleaving writes.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Stable name reported as the current provider.
    fn name(&self) -> &str;

    /// Replaces everything stored with `bookmarks`.
    ///
    /// Fails with `BackendUnavailable` or `WriteFailed`.
    async fn save(&self, bookmarks: &[Bookmark]) -> StorageResult<()>;

    /// Returns the stored collection in storage order.
    ///
    /// Returns an empty collection when nothing was ever stored. Records
    /// that fail to decode are reported in `skipped` rather than aborting.
    async fn load(&self) -> StorageResult<LoadedCollection>;

    /// Removes all stored data. Clearing an empty store succeeds.
    async fn clear(&self) -> StorageResult<()>;
}
