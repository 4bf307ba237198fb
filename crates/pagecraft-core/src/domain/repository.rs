//! Repository traits for the layout engine
//!
//! The lifecycle manager only talks to storage through these traits. External
//! crates implement them to provide different persistence mechanisms.

use async_trait::async_trait;

use super::configuration::{ConfigurationId, PageType, SlotConfiguration, TenantId};
use crate::LayoutError;

/// Repository for draft and published slot configurations
#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    /// Load the draft for a tenant and page type
    async fn load_draft(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<Option<SlotConfiguration>, LayoutError>;

    /// Store a draft.
    ///
    /// A save whose revision is older than the stored draft's is ignored.
    async fn save_draft(&self, configuration: &SlotConfiguration) -> Result<(), LayoutError>;

    /// Copy the stored draft into the published record, replacing any
    /// previous published record for the same page type
    async fn publish(
        &self,
        draft_id: &ConfigurationId,
        tenant_id: &TenantId,
    ) -> Result<SlotConfiguration, LayoutError>;

    /// Load the published record for a tenant and page type
    async fn load_published(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<Option<SlotConfiguration>, LayoutError>;

    /// Find any configuration by ID
    async fn find_by_id(&self, id: &ConfigurationId)
        -> Result<Option<SlotConfiguration>, LayoutError>;
}

/// Memory implementation for testing
#[cfg(feature = "testing")]
pub mod memory {
    use super::*;
    use dashmap::mapref::entry::Entry;
    use dashmap::DashMap;
    use std::sync::Arc;

    type ConfigKey = (TenantId, PageType);

    /// In-memory configuration repository using concurrent maps
    #[derive(Clone, Default)]
    pub struct MemoryConfigurationRepository {
        drafts: Arc<DashMap<ConfigKey, SlotConfiguration>>,
        published: Arc<DashMap<ConfigKey, SlotConfiguration>>,
    }

    impl MemoryConfigurationRepository {
        /// Create a new memory configuration repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of stored drafts
        pub fn draft_count(&self) -> usize {
            self.drafts.len()
        }
    }

    #[async_trait]
    impl ConfigurationRepository for MemoryConfigurationRepository {
        async fn load_draft(
            &self,
            tenant_id: &TenantId,
            page_type: &PageType,
        ) -> Result<Option<SlotConfiguration>, LayoutError> {
            let key = (tenant_id.clone(), page_type.clone());
            Ok(self.drafts.get(&key).map(|draft| draft.value().clone()))
        }

        async fn save_draft(&self, configuration: &SlotConfiguration) -> Result<(), LayoutError> {
            if !configuration.is_draft() {
                return Err(LayoutError::Persistence(format!(
                    "configuration {} is not a draft",
                    configuration.id
                )));
            }

            match self.drafts.entry(configuration.key()) {
                Entry::Occupied(mut entry) => {
                    if entry.get().revision <= configuration.revision {
                        entry.insert(configuration.clone());
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(configuration.clone());
                }
            }
            Ok(())
        }

        async fn publish(
            &self,
            draft_id: &ConfigurationId,
            tenant_id: &TenantId,
        ) -> Result<SlotConfiguration, LayoutError> {
            let draft = self
                .drafts
                .iter()
                .find(|entry| &entry.id == draft_id && &entry.tenant_id == tenant_id)
                .map(|entry| entry.value().clone())
                .ok_or_else(|| LayoutError::ConfigurationNotFound(draft_id.0.clone()))?;

            let published = draft.to_published()?;
            self.published.insert(published.key(), published.clone());
            Ok(published)
        }

        async fn load_published(
            &self,
            tenant_id: &TenantId,
            page_type: &PageType,
        ) -> Result<Option<SlotConfiguration>, LayoutError> {
            let key = (tenant_id.clone(), page_type.clone());
            Ok(self.published.get(&key).map(|published| published.value().clone()))
        }

        async fn find_by_id(
            &self,
            id: &ConfigurationId,
        ) -> Result<Option<SlotConfiguration>, LayoutError> {
            let found = self
                .drafts
                .iter()
                .chain(self.published.iter())
                .find(|entry| &entry.id == id)
                .map(|entry| entry.value().clone());
            Ok(found)
        }
    }

}
