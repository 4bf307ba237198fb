use crate::{
    application::autosave::DraftAutosaver,
    application::command_processor::CommandProcessor,
    application::editor_session::EditorSession,
    application::emit,
    config::EngineConfig,
    domain::configuration::{PageType, SlotConfiguration, TenantId},
    domain::events::{
        ConfigurationPublished, DraftCreated, DraftFallback, DraftLoaded, DraftSaved,
        LayoutEventHandler,
    },
    domain::invariants,
    domain::repository::ConfigurationRepository,
    domain::template::{BuiltinTemplates, TemplateProvider},
    LayoutError,
};
use chrono::Utc;
use std::sync::Arc;

/// Service for the draft and publish lifecycle
pub struct ConfigurationService {
    /// Repository for configurations
    repository: Arc<dyn ConfigurationRepository>,

    /// Default trees for new drafts
    templates: Arc<dyn TemplateProvider>,

    /// Event handler
    events: Arc<dyn LayoutEventHandler>,

    /// Engine settings
    config: EngineConfig,
}

impl ConfigurationService {
    /// Create a new configuration service using the built-in templates
    pub fn new(
        repository: Arc<dyn ConfigurationRepository>,
        events: Arc<dyn LayoutEventHandler>,
        config: EngineConfig,
    ) -> Self {
        Self::with_templates(repository, Arc::new(BuiltinTemplates), events, config)
    }

    /// Create a new configuration service with host-provided templates
    pub fn with_templates(
        repository: Arc<dyn ConfigurationRepository>,
        templates: Arc<dyn TemplateProvider>,
        events: Arc<dyn LayoutEventHandler>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            templates,
            events,
            config,
        }
    }

    /// Engine settings in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load the draft, creating it from the default template when absent.
    ///
    /// A stored draft that fails validation is replaced by the template.
    pub async fn load_or_create_draft(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<SlotConfiguration, LayoutError> {
        let stored = self.repository.load_draft(tenant_id, page_type).await?;

        let draft = match stored {
            Some(draft) => match invariants::validate(&draft.snapshot) {
                Ok(()) => {
                    tracing::info!(
                        tenant = %tenant_id,
                        page_type = %page_type,
                        revision = draft.revision,
                        slots = draft.snapshot.len(),
                        "Draft loaded"
                    );
                    emit(
                        self.events.as_ref(),
                        Box::new(DraftLoaded {
                            tenant_id: tenant_id.clone(),
                            page_type: page_type.clone(),
                            configuration_id: draft.id.clone(),
                            revision: draft.revision,
                            timestamp: Utc::now(),
                        }),
                    )
                    .await;
                    draft
                }
                Err(violations) => {
                    let reason = LayoutError::InvariantViolation(violations).to_string();
                    tracing::warn!(
                        tenant = %tenant_id,
                        page_type = %page_type,
                        reason = %reason,
                        "Stored draft is invalid, falling back to default template"
                    );

                    let replacement = draft.with_snapshot(self.templates.template(page_type)?);
                    self.repository.save_draft(&replacement).await?;
                    emit(
                        self.events.as_ref(),
                        Box::new(DraftFallback {
                            tenant_id: tenant_id.clone(),
                            page_type: page_type.clone(),
                            configuration_id: replacement.id.clone(),
                            reason,
                            timestamp: Utc::now(),
                        }),
                    )
                    .await;
                    replacement
                }
            },
            None => {
                let template = self.templates.template(page_type)?;
                let draft = SlotConfiguration::new_draft(tenant_id.clone(), page_type.clone(), template);
                self.repository.save_draft(&draft).await?;

                tracing::info!(
                    tenant = %tenant_id,
                    page_type = %page_type,
                    configuration_id = %draft.id,
                    "Draft created from default template"
                );
                emit(
                    self.events.as_ref(),
                    Box::new(DraftCreated {
                        tenant_id: tenant_id.clone(),
                        page_type: page_type.clone(),
                        configuration_id: draft.id.clone(),
                        timestamp: Utc::now(),
                    }),
                )
                .await;
                draft
            }
        };

        Ok(draft)
    }

    /// Validate and store a draft immediately
    pub async fn save_draft(&self, draft: &SlotConfiguration) -> Result<(), LayoutError> {
        if !draft.is_draft() {
            return Err(LayoutError::Other(format!(
                "configuration {} is not a draft",
                draft.id
            )));
        }
        invariants::ensure_valid(&draft.snapshot)?;

        self.repository.save_draft(draft).await?;
        tracing::debug!(
            tenant = %draft.tenant_id,
            page_type = %draft.page_type,
            revision = draft.revision,
            "Draft saved"
        );
        emit(
            self.events.as_ref(),
            Box::new(DraftSaved {
                tenant_id: draft.tenant_id.clone(),
                page_type: draft.page_type.clone(),
                configuration_id: draft.id.clone(),
                revision: draft.revision,
                timestamp: Utc::now(),
            }),
        )
        .await;
        Ok(())
    }

    /// Publish the stored draft for a tenant and page type
    pub async fn publish(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<SlotConfiguration, LayoutError> {
        let draft = self
            .repository
            .load_draft(tenant_id, page_type)
            .await?
            .ok_or_else(|| {
                LayoutError::ConfigurationNotFound(format!("{}/{} draft", tenant_id, page_type))
            })?;
        invariants::ensure_valid(&draft.snapshot)?;

        publish_draft(self.repository.as_ref(), self.events.as_ref(), &draft).await
    }

    /// Load the published configuration, if any
    pub async fn load_published(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<Option<SlotConfiguration>, LayoutError> {
        self.repository.load_published(tenant_id, page_type).await
    }

    /// Load or create the draft and start an editing session on it
    pub async fn open_session(
        &self,
        tenant_id: &TenantId,
        page_type: &PageType,
    ) -> Result<EditorSession, LayoutError> {
        let draft = self.load_or_create_draft(tenant_id, page_type).await?;

        let autosaver = DraftAutosaver::new(
            self.repository.clone(),
            self.events.clone(),
            self.config.autosave_debounce(),
            self.config.autosave_enabled,
            draft.revision,
        );

        Ok(EditorSession::new(
            draft,
            CommandProcessor::new(&self.config),
            autosaver,
            self.repository.clone(),
            self.events.clone(),
        ))
    }
}

/// Copy `draft` into the published record and announce it
pub(crate) async fn publish_draft(
    repository: &dyn ConfigurationRepository,
    events: &dyn LayoutEventHandler,
    draft: &SlotConfiguration,
) -> Result<SlotConfiguration, LayoutError> {
    let published = repository.publish(&draft.id, &draft.tenant_id).await?;

    tracing::info!(
        tenant = %draft.tenant_id,
        page_type = %draft.page_type,
        revision = published.revision,
        published_id = %published.id,
        "Configuration published"
    );
    emit(
        events,
        Box::new(ConfigurationPublished {
            tenant_id: draft.tenant_id.clone(),
            page_type: draft.page_type.clone(),
            draft_id: draft.id.clone(),
            published_id: published.id.clone(),
            revision: published.revision,
            timestamp: Utc::now(),
        }),
    )
    .await;
    Ok(published)
}

#[cfg(all(test, feature = "testing"))]
mod tests {
    use super::*;
    use crate::domain::events::RecordingEventHandler;
    use crate::domain::repository::memory::MemoryConfigurationRepository;
    use crate::domain::slot::Slot;
    use crate::domain::template::default_template;
    use crate::domain::tree::LayoutSnapshot;
    use std::collections::BTreeMap;

    fn service() -> (
        ConfigurationService,
        MemoryConfigurationRepository,
        Arc<RecordingEventHandler>,
    ) {
        let repo = MemoryConfigurationRepository::new();
        let events = Arc::new(RecordingEventHandler::new());
        let service = ConfigurationService::new(
            Arc::new(repo.clone()),
            events.clone(),
            EngineConfig::default(),
        );
        (service, repo, events)
    }

    #[tokio::test]
    async fn test_first_load_creates_and_persists_template() {
        let (service, repo, events) = service();
        let tenant = TenantId::from("shop");

        let draft = service
            .load_or_create_draft(&tenant, &PageType::Product)
            .await
            .unwrap();

        assert_eq!(draft.snapshot, default_template(&PageType::Product).unwrap());
        assert_eq!(repo.draft_count(), 1);
        assert_eq!(events.event_types(), vec!["draft.created".to_string()]);

        let again = service
            .load_or_create_draft(&tenant, &PageType::Product)
            .await
            .unwrap();
        assert_eq!(again.id, draft.id);
        assert_eq!(events.event_types().last().map(String::as_str), Some("draft.loaded"));
    }

    #[tokio::test]
    async fn test_invalid_stored_draft_falls_back() {
        let (service, repo, events) = service();
        let tenant = TenantId::from("shop");

        let mut slots = BTreeMap::new();
        slots.insert("a".into(), Slot::container("a").with_parent("b"));
        slots.insert("b".into(), Slot::container("b").with_parent("a"));
        let broken = LayoutSnapshot::from_parts_unchecked(slots, Vec::new());
        let stored = SlotConfiguration::new_draft(tenant.clone(), PageType::Cart, broken);
        repo.save_draft(&stored).await.unwrap();

        let draft = service
            .load_or_create_draft(&tenant, &PageType::Cart)
            .await
            .unwrap();

        assert_eq!(draft.snapshot, default_template(&PageType::Cart).unwrap());
        assert_eq!(draft.id, stored.id);
        assert_eq!(draft.revision, stored.revision + 1);
        assert_eq!(events.event_types(), vec!["draft.fallback".to_string()]);
    }

    #[tokio::test]
    async fn test_publish_and_load_published() {
        let (service, _repo, events) = service();
        let tenant = TenantId::from("shop");

        assert!(service
            .load_published(&tenant, &PageType::Homepage)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            service.publish(&tenant, &PageType::Homepage).await,
            Err(LayoutError::ConfigurationNotFound(_))
        ));

        let draft = service
            .load_or_create_draft(&tenant, &PageType::Homepage)
            .await
            .unwrap();
        let published = service.publish(&tenant, &PageType::Homepage).await.unwrap();

        assert_eq!(published.snapshot, draft.snapshot);
        let loaded = service
            .load_published(&tenant, &PageType::Homepage)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, published.id);
        assert!(events
            .event_types()
            .contains(&"configuration.published".to_string()));
    }

    #[tokio::test]
    async fn test_save_draft_rejects_invalid_tree() {
        let (service, repo, _events) = service();
        let mut slots = BTreeMap::new();
        slots.insert("x".into(), Slot::text("x", "t").with_parent("ghost"));
        let broken = LayoutSnapshot::from_parts_unchecked(slots, Vec::new());
        let draft = SlotConfiguration::new_draft("shop".into(), PageType::Checkout, broken);

        assert!(matches!(
            service.save_draft(&draft).await,
            Err(LayoutError::InvariantViolation(_))
        ));
        assert_eq!(repo.draft_count(), 0);
    }
}
