use crate::LayoutError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Width of the layout grid in columns
pub const GRID_COLUMNS: u8 = 12;

/// Smallest legal column span
pub const MIN_COL_SPAN: u8 = 1;

/// Value object: Slot ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub String);

impl SlotId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier for a slot of the given type
    pub fn generate(slot_type: SlotType) -> Self {
        Self(format!("{}_{}", slot_type.as_str(), Uuid::new_v4().simple()))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SlotId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Discriminant of [`SlotKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    /// Layout container, the only type that owns children
    Container,
    /// Plain or templated text
    Text,
    /// Call-to-action button
    Button,
    /// Image
    Image,
    /// Raw markup
    Html,
    /// Named external component
    Component,
}

impl SlotType {
    /// Every slot type, in declaration order
    pub const ALL: [SlotType; 6] = [
        SlotType::Container,
        SlotType::Text,
        SlotType::Button,
        SlotType::Image,
        SlotType::Html,
        SlotType::Component,
    ];

    /// Whether slots of this type may own children
    #[inline]
    pub fn can_have_children(self) -> bool {
        matches!(self, SlotType::Container)
    }

    /// Column span applied when a slot of this type is created without one
    pub fn default_col_span(self) -> u8 {
        match self {
            SlotType::Container => 12,
            SlotType::Text => 6,
            SlotType::Button => 4,
            SlotType::Image => 6,
            SlotType::Html => 12,
            SlotType::Component => 12,
        }
    }

    /// Wire name of the type
    pub fn as_str(self) -> &'static str {
        match self {
            SlotType::Container => "container",
            SlotType::Text => "text",
            SlotType::Button => "button",
            SlotType::Image => "image",
            SlotType::Html => "html",
            SlotType::Component => "component",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LayoutError::InvalidParameter(format!("unknown slot type: {}", s)))
    }
}

/// Type-specific payload of a slot.
///
/// The engine never interprets these values; it only stores and moves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlotKind {
    /// Container owning child slots
    Container,

    /// Text or template string
    Text {
        /// Text content
        #[serde(default)]
        content: String,
    },

    /// Button
    Button {
        /// Button label
        #[serde(default)]
        content: String,
        /// Optional link target
        #[serde(default, skip_serializing_if = "Option::is_none")]
        href: Option<String>,
    },

    /// Image
    Image {
        /// Image source
        #[serde(default)]
        content: String,
        /// Alternative text
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },

    /// Raw markup
    Html {
        /// Markup
        #[serde(default)]
        content: String,
    },

    /// Rendering delegated to a named external component
    Component {
        /// Component name resolved by the renderer
        component: String,
        /// Opaque component props
        #[serde(default)]
        props: Value,
    },
}

impl SlotKind {
    /// Build the payload for `slot_type` with the given content.
    ///
    /// For components the content is the component name.
    pub fn with_content(slot_type: SlotType, content: impl Into<String>) -> Self {
        let content = content.into();
        match slot_type {
            SlotType::Container => SlotKind::Container,
            SlotType::Text => SlotKind::Text { content },
            SlotType::Button => SlotKind::Button {
                content,
                href: None,
            },
            SlotType::Image => SlotKind::Image { content, alt: None },
            SlotType::Html => SlotKind::Html { content },
            SlotType::Component => SlotKind::Component {
                component: content,
                props: Value::Null,
            },
        }
    }

    /// Discriminant of this payload
    pub fn slot_type(&self) -> SlotType {
        match self {
            SlotKind::Container => SlotType::Container,
            SlotKind::Text { .. } => SlotType::Text,
            SlotKind::Button { .. } => SlotType::Button,
            SlotKind::Image { .. } => SlotType::Image,
            SlotKind::Html { .. } => SlotType::Html,
            SlotKind::Component { .. } => SlotType::Component,
        }
    }

    /// Content string, for the variants that carry one
    pub fn content(&self) -> Option<&str> {
        match self {
            SlotKind::Text { content }
            | SlotKind::Button { content, .. }
            | SlotKind::Image { content, .. }
            | SlotKind::Html { content } => Some(content),
            SlotKind::Container | SlotKind::Component { .. } => None,
        }
    }

    /// Replace the content string.
    ///
    /// Fails for variants without one.
    pub fn set_content(&mut self, new_content: String) -> Result<(), LayoutError> {
        match self {
            SlotKind::Text { content }
            | SlotKind::Button { content, .. }
            | SlotKind::Image { content, .. }
            | SlotKind::Html { content } => {
                *content = new_content;
                Ok(())
            }
            other => Err(LayoutError::InvalidParameter(format!(
                "{} slots have no content",
                other.slot_type()
            ))),
        }
    }
}

/// One node of the layout tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Unique identifier
    pub id: SlotId,

    /// Type and type-specific payload
    #[serde(flatten)]
    pub kind: SlotKind,

    /// Owning container, `None` for roots
    #[serde(default)]
    pub parent_id: Option<SlotId>,

    /// Width in grid columns
    pub col_span: u8,

    /// Position among siblings
    #[serde(default)]
    pub order: u32,

    /// Presentation class names
    #[serde(default)]
    pub class_name: String,

    /// Inline styles
    #[serde(default)]
    pub styles: BTreeMap<String, String>,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Slot {
    /// Create a root slot with type defaults
    pub fn new(id: impl Into<SlotId>, kind: SlotKind) -> Self {
        let col_span = kind.slot_type().default_col_span();
        Self {
            id: id.into(),
            kind,
            parent_id: None,
            col_span,
            order: 0,
            class_name: String::new(),
            styles: BTreeMap::new(),
            metadata: Map::new(),
        }
    }

    /// Container slot shorthand
    pub fn container(id: impl Into<SlotId>) -> Self {
        Self::new(id, SlotKind::Container)
    }

    /// Text slot shorthand
    pub fn text(id: impl Into<SlotId>, content: impl Into<String>) -> Self {
        Self::new(id, SlotKind::with_content(SlotType::Text, content))
    }

    /// Set the parent
    pub fn with_parent(mut self, parent_id: impl Into<SlotId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the column span
    pub fn with_col_span(mut self, col_span: u8) -> Self {
        self.col_span = col_span;
        self
    }

    /// Set the sibling order
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Set the class names
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Type of this slot
    #[inline]
    pub fn slot_type(&self) -> SlotType {
        self.kind.slot_type()
    }

    /// Whether this slot may own children
    #[inline]
    pub fn is_container(&self) -> bool {
        self.slot_type().can_have_children()
    }

    /// Content string, if the type carries one
    pub fn content(&self) -> Option<&str> {
        self.kind.content()
    }
}
