use crate::domain::tree::LayoutSnapshot;
use crate::LayoutError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Value object: Tenant ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Value object: Configuration ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(pub String);

impl ConfigurationId {
    /// Fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of storefront page a configuration lays out
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PageType {
    /// Product detail page
    Product,
    /// Category listing page
    Category,
    /// Shopping cart
    Cart,
    /// Checkout
    Checkout,
    /// Store front page
    Homepage,
    /// Host-defined page, serialized as `custom:<name>`
    Custom(String),
}

impl PageType {
    /// Built-in page types
    pub const BUILT_IN: [PageType; 5] = [
        PageType::Product,
        PageType::Category,
        PageType::Cart,
        PageType::Checkout,
        PageType::Homepage,
    ];
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::Product => f.write_str("product"),
            PageType::Category => f.write_str("category"),
            PageType::Cart => f.write_str("cart"),
            PageType::Checkout => f.write_str("checkout"),
            PageType::Homepage => f.write_str("homepage"),
            PageType::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

impl FromStr for PageType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(PageType::Product),
            "category" => Ok(PageType::Category),
            "cart" => Ok(PageType::Cart),
            "checkout" => Ok(PageType::Checkout),
            "homepage" => Ok(PageType::Homepage),
            other => match other.strip_prefix("custom:") {
                Some(name) if !name.is_empty() => Ok(PageType::Custom(name.to_string())),
                _ => Err(LayoutError::InvalidParameter(format!(
                    "unknown page type: {}",
                    other
                ))),
            },
        }
    }
}

impl From<PageType> for String {
    fn from(page_type: PageType) -> Self {
        page_type.to_string()
    }
}

impl TryFrom<String> for PageType {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Configuration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationStatus {
    /// Editable working copy
    Draft,
    /// Read-only copy served to shoppers
    Published,
}

/// Aggregate: a stored layout for one tenant and page type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotConfiguration {
    /// Unique identifier
    pub id: ConfigurationId,

    /// Owning tenant
    pub tenant_id: TenantId,

    /// Page this layout is for
    pub page_type: PageType,

    /// Draft or published
    pub status: ConfigurationStatus,

    /// The layout tree
    pub snapshot: LayoutSnapshot,

    /// Committed change counter
    pub revision: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,

    /// When this copy was published
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl SlotConfiguration {
    /// Create a new draft at revision 1
    pub fn new_draft(tenant_id: TenantId, page_type: PageType, snapshot: LayoutSnapshot) -> Self {
        let now = Utc::now();
        Self {
            id: ConfigurationId::generate(),
            tenant_id,
            page_type,
            status: ConfigurationStatus::Draft,
            snapshot,
            revision: 1,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    /// Same record with a new snapshot and the next revision
    pub fn with_snapshot(&self, snapshot: LayoutSnapshot) -> Self {
        Self {
            snapshot,
            revision: self.revision + 1,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Published copy of this draft.
    ///
    /// The snapshot and revision are carried over verbatim.
    pub fn to_published(&self) -> Result<Self, LayoutError> {
        if self.status != ConfigurationStatus::Draft {
            return Err(LayoutError::Other(format!(
                "configuration {} is already published",
                self.id
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: ConfigurationId::generate(),
            status: ConfigurationStatus::Published,
            created_at: now,
            updated_at: now,
            published_at: Some(now),
            ..self.clone()
        })
    }

    /// Check if this is the draft
    #[inline]
    pub fn is_draft(&self) -> bool {
        self.status == ConfigurationStatus::Draft
    }

    /// Lookup key
    pub fn key(&self) -> (TenantId, PageType) {
        (self.tenant_id.clone(), self.page_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::slot::Slot;
    use serde_json::json;

    #[test]
    fn test_page_type_names() {
        for page_type in PageType::BUILT_IN {
            let name = page_type.to_string();
            assert_eq!(name.parse::<PageType>().unwrap(), page_type);
        }
        assert_eq!(
            "custom:landing".parse::<PageType>().unwrap(),
            PageType::Custom("landing".to_string())
        );
        assert!("custom:".parse::<PageType>().is_err());
        assert!("blog".parse::<PageType>().is_err());
    }

    #[test]
    fn test_page_type_serde_as_string() {
        assert_eq!(serde_json::to_value(PageType::Cart).unwrap(), json!("cart"));
        let custom: PageType = serde_json::from_value(json!("custom:faq")).unwrap();
        assert_eq!(custom, PageType::Custom("faq".to_string()));
        assert!(serde_json::from_value::<PageType>(json!("nope")).is_err());
    }

    #[test]
    fn test_with_snapshot_bumps_revision() {
        let draft = SlotConfiguration::new_draft("t1".into(), PageType::Product, LayoutSnapshot::new());
        let tree = LayoutSnapshot::from_slots(vec![Slot::container("root")]).unwrap();
        let next = draft.with_snapshot(tree.clone());

        assert_eq!(draft.revision, 1);
        assert_eq!(next.revision, 2);
        assert_eq!(next.id, draft.id);
        assert_eq!(next.snapshot, tree);
        assert!(next.updated_at >= draft.updated_at);
    }

    #[test]
    fn test_to_published_copies_snapshot() {
        let tree = LayoutSnapshot::from_slots(vec![Slot::container("root")]).unwrap();
        let draft = SlotConfiguration::new_draft("t1".into(), PageType::Cart, tree);
        let published = draft.to_published().unwrap();

        assert_eq!(published.status, ConfigurationStatus::Published);
        assert_ne!(published.id, draft.id);
        assert_eq!(published.snapshot, draft.snapshot);
        assert_eq!(published.revision, draft.revision);
        assert!(published.published_at.is_some());
        assert!(published.to_published().is_err());
    }
}
