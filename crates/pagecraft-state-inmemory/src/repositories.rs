use async_trait::async_trait;
use tracing::{debug, warn};

use pagecraft_core::{
    ConfigurationId, ConfigurationRepository, LayoutError, PageType, SlotConfiguration, TenantId,
};

use crate::{ConfigMap, HistoryMap};

/// In-memory implementation of the ConfigurationRepository
#[derive(Clone)]
pub struct InMemoryConfigurationRepository {
    drafts: ConfigMap,
    published: ConfigMap,
    history: HistoryMap,
}

impl InMemoryConfigurationRepository {
    /// Create a repository over shared storage
    pub fn new(drafts: ConfigMap, published: ConfigMap, history: HistoryMap) -> Self {
        Self {
            drafts,
            published,
            history,
        }
    }

    /// Published copies replaced by later publishes, oldest first
    pub async fn published_history(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Vec<SlotConfiguration> {
        let history = self.history.read().await;
        history
            .get(&(tenant_id.clone(), page_type.clone()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConfigurationRepository for InMemoryConfigurationRepository {
    async fn load_draft(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<Option<SlotConfiguration>, LayoutError> {
        let drafts = self.drafts.read().await;
        Ok(drafts.get(&(tenant_id.clone(), page_type.clone())).cloned())
    }

    async fn save_draft(&self, configuration: &SlotConfiguration) -> Result<(), LayoutError> {
        if !configuration.is_draft() {
            return Err(LayoutError::Persistence(format!(
                "configuration {} is not a draft",
                configuration.id
            )));
        }

        let mut drafts = self.drafts.write().await;
        if let Some(stored) = drafts.get(&configuration.key()) {
            if stored.revision > configuration.revision {
                warn!(
                    tenant = %configuration.tenant_id,
                    page_type = %configuration.page_type,
                    stored = stored.revision,
                    incoming = configuration.revision,
                    "Ignoring stale draft save"
                );
                return Ok(());
            }
        }

        drafts.insert(configuration.key(), configuration.clone());
        debug!(
            tenant = %configuration.tenant_id,
            revision = configuration.revision,
            "Draft stored"
        );
        Ok(())
    }

    async fn publish(
        &self,
        draft_id: &ConfigurationId,
        tenant_id: &TenantId,
    ) -> Result<SlotConfiguration, LayoutError> {
        let draft = {
            let drafts = self.drafts.read().await;
            drafts
                .values()
                .find(|draft| &draft.id == draft_id && &draft.tenant_id == tenant_id)
                .cloned()
                .ok_or_else(|| LayoutError::ConfigurationNotFound(draft_id.0.clone()))?
        };

        let published = draft.to_published()?;
        let replaced = {
            let mut live = self.published.write().await;
            live.insert(published.key(), published.clone())
        };

        if let Some(previous) = replaced {
            let mut history = self.history.write().await;
            history.entry(previous.key()).or_default().push(previous);
        }

        debug!(
            tenant = %published.tenant_id,
            page_type = %published.page_type,
            revision = published.revision,
            "Draft published"
        );
        Ok(published)
    }

    async fn load_published(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<Option<SlotConfiguration>, LayoutError> {
        let published = self.published.read().await;
        Ok(published.get(&(tenant_id.clone(), page_type.clone())).cloned())
    }

    async fn find_by_id(
        &self,
        id: &ConfigurationId,
    ) -> Result<Option<SlotConfiguration>, LayoutError> {
        if let Some(found) = self.drafts.read().await.values().find(|c| &c.id == id) {
            return Ok(Some(found.clone()));
        }
        if let Some(found) = self.published.read().await.values().find(|c| &c.id == id) {
            return Ok(Some(found.clone()));
        }

        let history = self.history.read().await;
        Ok(history.values().flatten().find(|c| &c.id == id).cloned())
    }
}
