//! In-memory storage for Pagecraft layout configurations
//!
//! This crate implements the [`ConfigurationRepository`] trait from
//! pagecraft-core on top of shared in-process maps. It is useful for
//! development, tests and single-process hosts where drafts do not need to
//! outlive the process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use pagecraft_core::{ConfigurationRepository, PageType, SlotConfiguration, TenantId};

pub mod repositories;
pub use repositories::InMemoryConfigurationRepository;


pub(crate) type ConfigKey = (TenantId, PageType);
pub(crate) type ConfigMap = Arc<RwLock<HashMap<ConfigKey, SlotConfiguration>>>;
pub(crate) type HistoryMap = Arc<RwLock<HashMap<ConfigKey, Vec<SlotConfiguration>>>>;

/// Provider for in-memory configuration repositories
///
/// Every repository handed out by one provider sees the same storage, so a
/// host can give separate handles to the editor and the storefront reader.
pub struct InMemoryStateStoreProvider {
    // Current draft per tenant and page type
    drafts: ConfigMap,

    // Live published copy per tenant and page type
    published: ConfigMap,

    // Published copies that were replaced by a later publish, oldest first
    history: HistoryMap,
}

impl InMemoryStateStoreProvider {
    /// Create a new in-memory state store provider
    pub fn new() -> Self {
        Self {
            drafts: Arc::new(RwLock::new(HashMap::new())),
            published: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Concrete repository over the shared storage
    pub fn repository(&self) -> InMemoryConfigurationRepository {
        InMemoryConfigurationRepository::new(
            self.drafts.clone(),
            self.published.clone(),
            self.history.clone(),
        )
    }

    /// Repository for use with `ConfigurationService`
    pub fn create_repository(&self) -> Arc<dyn ConfigurationRepository> {
        debug!("Creating in-memory configuration repository");
        Arc::new(self.repository())
    }

    /// Number of stored drafts across all tenants
    pub async fn draft_count(&self) -> usize {
        self.drafts.read().await.len()
    }

    /// Drop every stored configuration
    pub async fn clear(&self) {
        self.drafts.write().await.clear();
        self.published.write().await.clear();
        self.history.write().await.clear();
    }
}

impl Default for InMemoryStateStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}
