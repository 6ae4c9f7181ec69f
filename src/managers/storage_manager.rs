//! Storage Manager for LinkVault.
//!
//! Walks an ordered, priority-ranked list of [`StorageProvider`]s, falling
//! back to the next provider whenever one fails, and remembers which one
//! last succeeded. Providers are tried strictly one after another.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::providers::{FileMedium, KeyValueProvider, StorageProvider, TableProvider};
use crate::types::backup::{LoadedCollection, SkippedRecord};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{ProviderFailure, StorageError, StorageResult};
use crate::types::settings::StorageSettings;

/// Reported as the current provider when the chain is empty.
pub const NO_PROVIDER: &str = "none";

/// Operation a [`StorageEvent`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Save,
    Load,
    Clear,
}

impl std::fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageOperation::Save => write!(f, "save"),
            StorageOperation::Load => write!(f, "load"),
            StorageOperation::Clear => write!(f, "clear"),
        }
    }
}

/// Something observable that happened while walking the provider chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    /// A provider completed the operation. For loads, `count` is the number
    /// of bookmarks returned (zero means the manager moves on).
    ProviderSucceeded {
        provider: String,
        operation: StorageOperation,
        count: usize,
    },
    /// A provider failed; the manager moves on to the next one.
    ProviderFailed {
        provider: String,
        operation: StorageOperation,
        error: String,
    },
    /// A provider loaded, but some records could not be decoded.
    RecordsSkipped {
        provider: String,
        skipped: Vec<SkippedRecord>,
    },
}

/// Hook receiving every [`StorageEvent`] the manager produces.
pub trait StorageObserver: Send + Sync {
    fn on_event(&self, event: &StorageEvent);
}

/// Default observer. The manager already logs through `tracing`, so this
/// adds nothing beyond a trace-level line.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl StorageObserver for TracingObserver {
    fn on_event(&self, event: &StorageEvent) {
        tracing::trace!(?event, "storage event");
    }
}

/// Orchestrates save/load/clear across the provider chain.
pub struct StorageManager {
    providers: Vec<Box<dyn StorageProvider>>,
    current: AtomicUsize,
    observer: Arc<dyn StorageObserver>,
    attempt_timeout: Option<Duration>,
    op_lock: tokio::sync::Mutex<()>,
}

impl StorageManager {
    /// Creates a manager over `providers`, highest priority first.
    ///
    /// The current provider starts as the first one in the list.
    pub fn new(providers: Vec<Box<dyn StorageProvider>>) -> Self {
        Self {
            providers,
            current: AtomicUsize::new(0),
            observer: Arc::new(TracingObserver),
            attempt_timeout: None,
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Builds the default chain: the table medium (when enabled) ahead of
    /// the file-backed key-value medium, both under the settings' data dir.
    pub fn from_settings(settings: &StorageSettings) -> Self {
        let data_dir = settings.resolved_data_dir();
        let mut providers: Vec<Box<dyn StorageProvider>> = Vec::new();
        if settings.enable_table_provider {
            providers.push(Box::new(TableProvider::open(settings.database_path())));
        }
        providers.push(Box::new(Self::key_value_provider(&data_dir, settings)));

        let manager = Self::new(providers);
        match settings.provider_timeout_ms {
            0 => manager,
            ms => manager.with_attempt_timeout(Duration::from_millis(ms)),
        }
    }

    fn key_value_provider(
        data_dir: &Path,
        settings: &StorageSettings,
    ) -> KeyValueProvider<FileMedium> {
        KeyValueProvider::new(FileMedium::new(data_dir), settings.namespace_key.clone())
            .with_quota(settings.key_value_quota_bytes)
    }

    /// Replaces the observability hook.
    pub fn with_observer(mut self, observer: Arc<dyn StorageObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Bounds each provider attempt so a hung medium cannot block fallback.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Names of the providers in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Name of the provider that backed the last successful save or
    /// non-empty load.
    pub fn current_provider_name(&self) -> String {
        let index = self.current.load(Ordering::SeqCst);
        self.providers
            .get(index)
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| NO_PROVIDER.to_string())
    }

    fn emit(&self, event: StorageEvent) {
        self.observer.on_event(&event);
    }

    fn report_failure(&self, provider: &str, operation: StorageOperation, error: &StorageError) {
        warn!(provider, %operation, error = %error, "storage provider failed");
        self.emit(StorageEvent::ProviderFailed {
            provider: provider.to_string(),
            operation,
            error: error.to_string(),
        });
    }

    async fn attempt<T, F>(&self, provider: &str, fut: F) -> StorageResult<T>
    where
        F: std::future::Future<Output = StorageResult<T>>,
    {
        match self.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(StorageError::unavailable(
                    provider,
                    format!("timed out after {} ms", limit.as_millis()),
                )),
            },
            None => fut.await,
        }
    }

    /// Persists the full collection to the first provider that accepts it.
    ///
    /// # Errors
    /// Returns `AllProvidersFailed` when every provider rejects the write.
    pub async fn save(&self, bookmarks: &[Bookmark]) -> StorageResult<()> {
        let _guard = self.op_lock.lock().await;
        let mut attempts = Vec::new();

        for (index, provider) in self.providers.iter().enumerate() {
            let name = provider.name();
            match self.attempt(name, provider.save(bookmarks)).await {
                Ok(()) => {
                    self.current.store(index, Ordering::SeqCst);
                    debug!(provider = name, count = bookmarks.len(), "save succeeded");
                    self.emit(StorageEvent::ProviderSucceeded {
                        provider: name.to_string(),
                        operation: StorageOperation::Save,
                        count: bookmarks.len(),
                    });
                    return Ok(());
                }
                Err(e) => {
                    self.report_failure(name, StorageOperation::Save, &e);
                    attempts.push(ProviderFailure {
                        provider: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(StorageError::AllProvidersFailed { attempts })
    }

    /// Returns the first non-empty collection found along the chain.
    ///
    /// Never fails: when every provider errors or is empty the result is an
    /// empty collection, which is also what a fresh install looks like. An
    /// emptied high-priority provider is therefore passed over in favour of
    /// a lower-priority one that still holds data.
    pub async fn load(&self) -> Vec<Bookmark> {
        self.load_collection().await.bookmarks
    }

    /// Like [`load`](Self::load), keeping the skipped-record report of the
    /// provider that answered.
    pub async fn load_collection(&self) -> LoadedCollection {
        let _guard = self.op_lock.lock().await;

        for (index, provider) in self.providers.iter().enumerate() {
            let name = provider.name();
            let loaded = match self.attempt(name, provider.load()).await {
                Ok(loaded) => loaded,
                Err(e) => {
                    self.report_failure(name, StorageOperation::Load, &e);
                    continue;
                }
            };

            if !loaded.skipped.is_empty() {
                warn!(
                    provider = name,
                    skipped = loaded.skipped.len(),
                    "partial load: skipped malformed records"
                );
                self.emit(StorageEvent::RecordsSkipped {
                    provider: name.to_string(),
                    skipped: loaded.skipped.clone(),
                });
            }

            self.emit(StorageEvent::ProviderSucceeded {
                provider: name.to_string(),
                operation: StorageOperation::Load,
                count: loaded.len(),
            });

            if !loaded.is_empty() {
                self.current.store(index, Ordering::SeqCst);
                info!(provider = name, count = loaded.len(), "loaded bookmarks");
                return loaded;
            }
            debug!(provider = name, "provider empty, trying next");
        }

        LoadedCollection::default()
    }

    /// Clears every provider, best effort. Failures are logged and
    /// reported to the observer but never returned.
    pub async fn clear(&self) {
        let _guard = self.op_lock.lock().await;

        for provider in &self.providers {
            let name = provider.name();
            match self.attempt(name, provider.clear()).await {
                Ok(()) => {
                    self.emit(StorageEvent::ProviderSucceeded {
                        provider: name.to_string(),
                        operation: StorageOperation::Clear,
                        count: 0,
                    });
                }
                Err(e) => self.report_failure(name, StorageOperation::Clear, &e),
            }
        }
    }
}
