use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::*;
use crate::options::AssembleOptions;
use crate::tree::{Node, NodeTree, TreeAssembler};

const SCENE_HEADER: &str = "gd_scene";
const EDITABLE_TAG: &str = "editable";
const CONNECTION_TAG: &str = "connection";
const NODE_TAG: &str = "node";

/// Marks the children of an instanced subscene as editable in the parent scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Editable {
    pub path: String,
    pub position: Position,
}

impl TryFrom<&Section> for Editable {
    type Error = TscnError;

    fn try_from(section: &Section) -> Result<Self, Self::Error> {
        Ok(Editable {
            path: required_str(section, "path")?.to_string(),
            position: section.position,
        })
    }
}

/// A signal of node `from` wired to `method` on node `to`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub signal: String,
    pub method: String,
    pub flags: Option<i64>,
    pub binds: Option<Value>,
    pub position: Position,
}

impl TryFrom<&Section> for Connection {
    type Error = TscnError;

    fn try_from(section: &Section) -> Result<Self, Self::Error> {
        let flags = match section.attribute("flags") {
            Some(value) => Some(
                value
                    .as_int()
                    .ok_or_else(|| invalid_type(section, "flags", "an integer", value))?,
            ),
            None => None,
        };

        Ok(Connection {
            from: required_str(section, "from")?.to_string(),
            to: required_str(section, "to")?.to_string(),
            signal: required_str(section, "signal")?.to_string(),
            method: required_str(section, "method")?.to_string(),
            flags,
            binds: section.attribute("binds").cloned(),
            position: section.position,
        })
    }
}

/// A `.tscn` file: its resources, connections and the assembled node tree.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub format: Option<i64>,
    pub load_steps: Option<i64>,
    pub uid: Option<String>,
    pub ext_resources: IndexMap<ResourceId, ExtResource>,
    pub sub_resources: IndexMap<ResourceId, SubResource>,
    pub editables: Vec<Editable>,
    pub connections: Vec<Connection>,
    pub tree: NodeTree,
    pub position: Position,
}

impl Scene {
    pub fn from_document(document: &Document) -> Result<Self, TscnError> {
        Self::from_document_with(document, &AssembleOptions::default())
    }

    pub fn from_document_with(document: &Document, options: &AssembleOptions) -> Result<Self, TscnError> {
        expect_header(document, SCENE_HEADER)?;

        let mut resources = ResourceTables::default();
        let mut editables = Vec::new();
        let mut connections = Vec::new();

        for section in &document.sections {
            if resources.absorb(section)? {
                continue;
            }
            match section.tag.as_str() {
                EDITABLE_TAG => editables.push(Editable::try_from(section)?),
                CONNECTION_TAG => connections.push(Connection::try_from(section)?),
                NODE_TAG => {}
                other => {
                    return Err(TscnError::InvalidResourceType {
                        tag: other.to_string(),
                        position: section.position,
                    });
                }
            }
        }

        let tree = TreeAssembler::new(
            &document.sections,
            editables.iter().map(|e| e.path.clone()),
            options.clone(),
        )
        .assemble()?;

        debug!(
            ext_resources = resources.ext_resources.len(),
            sub_resources = resources.sub_resources.len(),
            connections = connections.len(),
            nodes = tree.len(),
            "converted scene"
        );

        Ok(Scene {
            format: document.header_attribute("format").and_then(Value::as_int),
            load_steps: document.header_attribute("load_steps").and_then(Value::as_int),
            uid: document
                .header_attribute("uid")
                .and_then(Value::as_str)
                .map(str::to_string),
            ext_resources: resources.ext_resources,
            sub_resources: resources.sub_resources,
            editables,
            connections,
            tree,
            position: document.position,
        })
    }

    pub fn root(&self) -> &Node {
        self.tree.root_node()
    }

    /// Node at `path` below the root, `.` being the root itself.
    pub fn node(&self, path: &str) -> Option<&Node> {
        self.tree.get_node(path).and_then(|id| self.tree.get(id))
    }

    pub fn ext_resource(&self, id: impl Into<ResourceId>) -> Option<&ExtResource> {
        self.ext_resources.get(&id.into())
    }

    pub fn sub_resource(&self, id: impl Into<ResourceId>) -> Option<&SubResource> {
        self.sub_resources.get(&id.into())
    }

    /// The ext resource a node was instanced from, if any.
    pub fn instance_of(&self, node: &Node) -> Option<&ExtResource> {
        let id = node.instance.as_ref()?.reference_id()?;
        self.ext_resources.get(&ResourceId::from_value(id)?)
    }
}
