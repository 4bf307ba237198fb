//! Structured layout commands as issued by the editor UI or an assistant.
//!
//! A command is parsed into a [`Mutation`] without looking at any tree;
//! checks against the working snapshot happen in the command processor.

use crate::domain::mutation::{CreateOptions, Mutation, SlotPatch};
use crate::domain::slot::{SlotId, SlotKind, SlotType};
use crate::LayoutError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported command operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Add a slot under the target
    Create,
    /// Remove the target
    Delete,
    /// Move the target
    Move,
    /// Change the target's span
    Resize,
    /// Reorder the target's children
    Reorder,
    /// Change the target's fields
    Update,
    /// Copy the target
    Duplicate,
}

impl CommandKind {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Create => "create",
            CommandKind::Delete => "delete",
            CommandKind::Move => "move",
            CommandKind::Resize => "resize",
            CommandKind::Reorder => "reorder",
            CommandKind::Update => "update",
            CommandKind::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(CommandKind::Create),
            "delete" => Ok(CommandKind::Delete),
            "move" => Ok(CommandKind::Move),
            "resize" => Ok(CommandKind::Resize),
            "reorder" => Ok(CommandKind::Reorder),
            "update" => Ok(CommandKind::Update),
            "duplicate" => Ok(CommandKind::Duplicate),
            other => Err(LayoutError::UnsupportedCommand(other.to_string())),
        }
    }
}

/// A single externally-issued command.
///
/// `operation` stays a plain string so that unknown operations are reported
/// per command instead of failing the whole batch at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCommand {
    /// Slot the command acts on; the parent for create and reorder
    #[serde(default)]
    pub target_slot_id: Option<SlotId>,
    /// Operation name
    pub operation: String,
    /// Operation parameters
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl LayoutCommand {
    /// Command without parameters
    pub fn new(operation: impl Into<String>, target_slot_id: Option<SlotId>) -> Self {
        Self {
            target_slot_id,
            operation: operation.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Parsed operation kind
    pub fn kind(&self) -> Result<CommandKind, LayoutError> {
        self.operation.parse()
    }

    /// Translate into a mutation, checking parameter presence and types
    pub fn to_mutation(&self) -> Result<Mutation, LayoutError> {
        let params = Params(&self.params);
        match self.kind()? {
            CommandKind::Create => {
                let slot_type: SlotType = params.required_str("type")?.parse()?;
                let kind = build_kind(slot_type, &params)?;
                let options = CreateOptions {
                    id: params.optional_str("id")?.map(SlotId::from),
                    col_span: params.optional_i64("colSpan")?,
                    position: params.optional_usize("position")?,
                    class_name: params.optional_str("className")?.map(str::to_string),
                    styles: params.styles()?,
                    metadata: params.object("metadata")?,
                };
                Ok(Mutation::Create {
                    kind,
                    parent_id: self.target_slot_id.clone(),
                    options,
                })
            }
            CommandKind::Delete => Ok(Mutation::Delete {
                slot_id: self.require_target()?,
            }),
            CommandKind::Move => Ok(Mutation::Move {
                slot_id: self.require_target()?,
                new_parent_id: params.nullable_id("parentId")?,
                position: params.optional_usize("position")?,
            }),
            CommandKind::Resize => Ok(Mutation::Resize {
                slot_id: self.require_target()?,
                col_span: params
                    .optional_i64("colSpan")?
                    .ok_or_else(|| LayoutError::MissingParameter("colSpan".to_string()))?,
            }),
            CommandKind::Reorder => Ok(Mutation::Reorder {
                parent_id: self.target_slot_id.clone(),
                ordered_ids: params.id_list("order")?,
            }),
            CommandKind::Update => {
                let patch = SlotPatch {
                    content: params.optional_str("content")?.map(str::to_string),
                    href: params.optional_str("href")?.map(str::to_string),
                    alt: params.optional_str("alt")?.map(str::to_string),
                    component: params.optional_str("component")?.map(str::to_string),
                    props: params.0.get("props").cloned(),
                    class_name: params.optional_str("className")?.map(str::to_string),
                    styles: params.styles()?,
                    metadata: params.object("metadata")?,
                };
                if patch.is_empty() {
                    return Err(LayoutError::MissingParameter(
                        "at least one field to update".to_string(),
                    ));
                }
                Ok(Mutation::Update {
                    slot_id: self.require_target()?,
                    patch,
                })
            }
            CommandKind::Duplicate => Ok(Mutation::Duplicate {
                slot_id: self.require_target()?,
            }),
        }
    }

    fn require_target(&self) -> Result<SlotId, LayoutError> {
        self.target_slot_id
            .clone()
            .ok_or_else(|| LayoutError::MissingParameter("targetSlotId".to_string()))
    }
}

fn build_kind(slot_type: SlotType, params: &Params<'_>) -> Result<SlotKind, LayoutError> {
    let content = params.optional_str("content")?.unwrap_or_default().to_string();
    let kind = match slot_type {
        SlotType::Button => SlotKind::Button {
            content,
            href: params.optional_str("href")?.map(str::to_string),
        },
        SlotType::Image => SlotKind::Image {
            content,
            alt: params.optional_str("alt")?.map(str::to_string),
        },
        SlotType::Component => {
            let component = match params.optional_str("component")? {
                Some(name) => name.to_string(),
                None if !content.is_empty() => content,
                None => return Err(LayoutError::MissingParameter("component".to_string())),
            };
            SlotKind::Component {
                component,
                props: params.0.get("props").cloned().unwrap_or(Value::Null),
            }
        }
        other => SlotKind::with_content(other, content),
    };
    Ok(kind)
}

/// Typed access to a command's parameter object
struct Params<'a>(&'a Map<String, Value>);

impl<'a> Params<'a> {
    fn required_str(&self, name: &str) -> Result<&'a str, LayoutError> {
        self.optional_str(name)?
            .ok_or_else(|| LayoutError::MissingParameter(name.to_string()))
    }

    fn optional_str(&self, name: &str) -> Result<Option<&'a str>, LayoutError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(invalid(name, "a string")),
        }
    }

    fn optional_i64(&self, name: &str) -> Result<Option<i64>, LayoutError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            // Integers past i64::MAX saturate; spans are clamped later
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|_| i64::MAX))
                .map(Some)
                .ok_or_else(|| invalid(name, "an integer")),
            Some(_) => Err(invalid(name, "an integer")),
        }
    }

    fn optional_usize(&self, name: &str) -> Result<Option<usize>, LayoutError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(|v| Some(usize::try_from(v).unwrap_or(usize::MAX)))
                .ok_or_else(|| invalid(name, "a non-negative integer")),
            Some(_) => Err(invalid(name, "a non-negative integer")),
        }
    }

    /// Required key whose value is a slot id or null
    fn nullable_id(&self, name: &str) -> Result<Option<SlotId>, LayoutError> {
        match self.0.get(name) {
            None => Err(LayoutError::MissingParameter(name.to_string())),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(SlotId::from(s.as_str()))),
            Some(_) => Err(invalid(name, "a slot id or null")),
        }
    }

    fn id_list(&self, name: &str) -> Result<Vec<SlotId>, LayoutError> {
        let items = match self.0.get(name) {
            None | Some(Value::Null) => return Err(LayoutError::MissingParameter(name.to_string())),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(invalid(name, "an array of slot ids")),
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(SlotId::from(s.as_str())),
                _ => Err(invalid(name, "an array of slot ids")),
            })
            .collect()
    }

    fn object(&self, name: &str) -> Result<Map<String, Value>, LayoutError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(invalid(name, "an object")),
        }
    }

    fn styles(&self) -> Result<BTreeMap<String, String>, LayoutError> {
        self.object("styles")?
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => Ok((key, s)),
                Value::Number(n) => Ok((key, n.to_string())),
                _ => Err(invalid("styles", "a map of strings")),
            })
            .collect()
    }
}

fn invalid(name: &str, expected: &str) -> LayoutError {
    LayoutError::InvalidParameter(format!("{} must be {}", name, expected))
}
