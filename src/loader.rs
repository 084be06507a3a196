//! Loader boundary — initial snapshot in, autosave observation out.
//!
//! DESIGN
//! ======
//! Durable storage is an external collaborator. The substrate only needs two
//! things from it: "give me an initial snapshot" (this trait) and
//! "let me observe snapshots" ([`crate::store::Store::subscribe`] plus
//! [`crate::store::Store::snapshot`]). Until `bootstrap` completes, every
//! store mutation is dropped with a diagnostic, never a crash.

use async_trait::async_trait;
use tracing::info;

use crate::notify::ErrorCode;
use crate::store::{AppData, Store};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot decode failed: {0}")]
    Decode(String),
}

impl ErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_LOAD_UNAVAILABLE",
            Self::Decode(_) => "E_LOAD_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Supplies the initial application state at dashboard mount.
#[async_trait]
pub trait SnapshotLoader: Send + Sync {
    /// Produce the initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the source is unreachable or the
    /// snapshot cannot be decoded.
    async fn load(&self) -> Result<AppData, LoadError>;
}

// =============================================================================
// STATIC LOADER
// =============================================================================

/// Fixed in-memory snapshot. Backs tests and demo dashboards that seed
/// their state at construction.
pub struct StaticLoader {
    data: AppData,
}

impl StaticLoader {
    #[must_use]
    pub fn new(data: AppData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl SnapshotLoader for StaticLoader {
    async fn load(&self) -> Result<AppData, LoadError> {
        Ok(self.data.clone())
    }
}

// =============================================================================
// BOOTSTRAP
// =============================================================================

/// Load the initial snapshot and install it into the store.
///
/// # Errors
///
/// Propagates the loader's [`LoadError`]; the store stays uninitialized.
pub async fn bootstrap(store: &Store, loader: &dyn SnapshotLoader) -> Result<(), LoadError> {
    let data = loader.load().await?;
    let collections = data.collection_names().count();
    store.initialize(data).await;
    info!(collections, "loader: initial snapshot installed");
    Ok(())
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
