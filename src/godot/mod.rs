// Author: godot-tscn contributors
// License: MIT

//! Typed records for the Godot file kinds built on top of a parsed [`Document`].
//!
//! | File              | Header        | Record       |
//! |-------------------|---------------|--------------|
//! | `*.tscn`          | `gd_scene`    | [`Scene`]    |
//! | `*.tres`          | `gd_resource` | [`Resource`] |
//! | `project.godot`   | none          | [`Project`]  |
//! | `*.import`        | `remap`       | [`Import`]   |

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{Document, Field, Position, Section, Value, ValueKind};
use crate::TscnError;

mod import;
mod project;
mod resource;
mod scene;

pub use import::Import;
pub use project::{Project, Settings};
pub use resource::Resource;
pub use scene::{Connection, Editable, Scene};

pub(crate) const EXT_RESOURCE_TAG: &str = "ext_resource";
pub(crate) const SUB_RESOURCE_TAG: &str = "sub_resource";

/// Resource ids are integers up to format 2 and strings (`"1_x4kd2"`) from format 3.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Str(String),
}

impl ResourceId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match &value.kind {
            ValueKind::Int(i) => Some(ResourceId::Int(*i)),
            ValueKind::String(s) => Some(ResourceId::Str(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(i) => write!(f, "{}", i),
            ResourceId::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A resource stored in another file, `[ext_resource path=".." type=".." id=..]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtResource {
    pub path: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: ResourceId,
    pub uid: Option<String>,
    pub position: Position,
}

impl TryFrom<&Section> for ExtResource {
    type Error = TscnError;

    fn try_from(section: &Section) -> Result<Self, Self::Error> {
        Ok(ExtResource {
            path: required_str(section, "path")?.to_string(),
            resource_type: required_str(section, "type")?.to_string(),
            id: required_id(section, "id")?,
            uid: section.attribute_str("uid").map(str::to_string),
            position: section.position,
        })
    }
}

/// A resource embedded in the file, `[sub_resource type=".." id=..]` plus its body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: ResourceId,
    pub fields: IndexMap<String, Value>,
    pub position: Position,
}

impl TryFrom<&Section> for SubResource {
    type Error = TscnError;

    fn try_from(section: &Section) -> Result<Self, Self::Error> {
        Ok(SubResource {
            resource_type: required_str(section, "type")?.to_string(),
            id: required_id(section, "id")?,
            fields: field_map(&section.fields),
            position: section.position,
        })
    }
}

/// External and internal resources shared by scenes and resource files.
#[derive(Debug, Default)]
pub(crate) struct ResourceTables {
    pub ext_resources: IndexMap<ResourceId, ExtResource>,
    pub sub_resources: IndexMap<ResourceId, SubResource>,
}

impl ResourceTables {
    /// Take the section if it is an ext or sub resource; `false` means it is something else.
    pub fn absorb(&mut self, section: &Section) -> Result<bool, TscnError> {
        match section.tag.as_str() {
            EXT_RESOURCE_TAG => {
                let res = ExtResource::try_from(section)?;
                self.ext_resources.insert(res.id.clone(), res);
                Ok(true)
            }
            SUB_RESOURCE_TAG => {
                let res = SubResource::try_from(section)?;
                self.sub_resources.insert(res.id.clone(), res);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

pub(crate) fn expect_header(document: &Document, expected: &str) -> Result<(), TscnError> {
    match document.header_key() {
        Some(key) if key == expected => Ok(()),
        other => Err(TscnError::WrongFileKind {
            expected: expected.to_string(),
            found: other.unwrap_or("<no header>").to_string(),
        }),
    }
}

pub(crate) fn required_str<'s>(section: &'s Section, attribute: &str) -> Result<&'s str, TscnError> {
    let value = required(section, attribute)?;
    value
        .as_str()
        .ok_or_else(|| invalid_type(section, attribute, "a string", value))
}

pub(crate) fn required_id(section: &Section, attribute: &str) -> Result<ResourceId, TscnError> {
    let value = required(section, attribute)?;
    ResourceId::from_value(value)
        .ok_or_else(|| invalid_type(section, attribute, "an integer or a string", value))
}

pub(crate) fn required<'s>(section: &'s Section, attribute: &str) -> Result<&'s Value, TscnError> {
    section
        .attribute(attribute)
        .ok_or_else(|| TscnError::MissingAttribute {
            section: section.tag.clone(),
            attribute: attribute.to_string(),
            position: section.position,
        })
}

pub(crate) fn invalid_type(section: &Section, attribute: &str, expected: &str, found: &Value) -> TscnError {
    TscnError::InvalidAttributeType {
        section: section.tag.clone(),
        attribute: attribute.to_string(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
        position: found.position,
    }
}

/// Fields keyed by name; a repeated key keeps its last value.
pub(crate) fn field_map(fields: &[Field]) -> IndexMap<String, Value> {
    fields
        .iter()
        .map(|f| (f.key.clone(), f.value.clone()))
        .collect()
}

#[cfg(test)]
mod tests;
