// Author: godot-tscn contributors
// License: MIT

use std::fmt;

use indexmap::IndexMap;
use tracing::warn;

use crate::ast::{Position, TypedCall, Value};
use crate::TscnError;

mod assemble;

pub use assemble::{assemble_tree, assemble_tree_with, TreeAssembler};

/// Index of a node inside its [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of the scene graph.
///
/// `node_type` and `instance` are mutually exclusive in well-formed scenes;
/// a node with neither inherits its type from an instanced ancestor.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub node_type: Option<String>,
    pub instance: Option<TypedCall>,
    /// Body fields in file order. A repeated key keeps its first slot and its last value.
    pub fields: IndexMap<String, Value>,
    pub position: Position,
    children: IndexMap<String, NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            node_type: None,
            instance: None,
            fields: IndexMap::new(),
            position: Position::default(),
            children: IndexMap::new(),
            parent: None,
        }
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_instance(mut self, instance: TypedCall) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Arena-backed node tree with a single root.
///
/// Nodes can also live in the arena without a parent (the assembler parks
/// unresolved nodes that way); those are invisible to path lookups and to
/// [`NodeTree::walk`].
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl NodeTree {
    pub fn new(mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        NodeTree {
            nodes: vec![Some(root)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self[self.root]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(|n| n.children().collect()).unwrap_or_default()
    }

    /// Resolve `path` relative to the root.
    pub fn get_node(&self, path: &str) -> Option<NodeId> {
        self.get_node_from(self.root, path)
    }

    /// Resolve `path` relative to `from`: `.` is `from` itself, anything else
    /// is a `/`-separated chain of child names.
    pub fn get_node_from(&self, from: NodeId, path: &str) -> Option<NodeId> {
        let mut current = self.get(from)?;
        let mut id = from;
        if path == "." {
            return Some(id);
        }
        for segment in path.split('/') {
            id = current.child(segment)?;
            current = self.get(id)?;
        }
        Some(id)
    }

    /// Add `node` as the last child of `parent`.
    pub fn add_node(&mut self, parent: NodeId, node: Node) -> Result<NodeId, TscnError> {
        if self.get(parent).is_none() {
            return Err(TscnError::NodePath {
                path: parent.to_string(),
                message: "parent node does not exist".into(),
            });
        }
        let id = self.insert_detached(node);
        self.attach(parent, id);
        Ok(id)
    }

    /// Remove the node at `path` with its whole subtree.
    pub fn remove_node(&mut self, path: &str) -> Result<Node, TscnError> {
        let id = self.get_node(path).ok_or_else(|| TscnError::NodePath {
            path: path.to_string(),
            message: "no such node".into(),
        })?;
        if id == self.root {
            return Err(TscnError::NodePath {
                path: path.to_string(),
                message: "can't remove the root node".into(),
            });
        }

        self.detach(id);
        self.take_subtree(id).ok_or_else(|| TscnError::NodePath {
            path: path.to_string(),
            message: "node vanished during removal".into(),
        })
    }

    /// `.` for the root, `A/B` for nodes below it, `None` for detached nodes.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = id;
        while current != self.root {
            let node = self.get(current)?;
            segments.push(node.name.as_str());
            current = node.parent?;
        }
        if segments.is_empty() {
            return Some(".".into());
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth-first, pre-order traversal from the root.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![self.root],
        }
    }

    pub(crate) fn insert_detached(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    /// A sibling with the same name is replaced and dropped.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let Some(name) = self.get(child).map(|n| n.name.clone()) else {
            return;
        };

        let replaced = match self.get_mut(parent) {
            Some(p) => p.children.insert(name.clone(), child),
            None => return,
        };

        if let Some(old) = replaced.filter(|old| *old != child) {
            warn!(
                node = %name,
                parent = %parent,
                "duplicate sibling name, replacing the earlier node"
            );
            if let Some(old_node) = self.get_mut(old) {
                old_node.parent = None;
            }
            self.take_subtree(old);
        }

        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some((name, parent)) = self
            .get(id)
            .and_then(|n| n.parent.map(|p| (n.name.clone(), p)))
        else {
            return;
        };

        if let Some(p) = self.get_mut(parent) {
            if p.children.get(&name) == Some(&id) {
                p.children.shift_remove(&name);
            }
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
        }
    }

    /// Free `id` and every descendant from the arena, returning the top node.
    fn take_subtree(&mut self, id: NodeId) -> Option<Node> {
        let mut stack: Vec<NodeId> = self.children(id);
        while let Some(next) = stack.pop() {
            stack.extend(self.children(next));
            if let Some(slot) = self.nodes.get_mut(next.0) {
                *slot = None;
            }
        }
        let mut node = self.nodes.get_mut(id.0)?.take()?;
        node.children.clear();
        Some(node)
    }
}

impl std::ops::Index<NodeId> for NodeTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {} is not in this tree", id),
        }
    }
}

pub struct Walk<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id)?;
        let children: Vec<NodeId> = node.children().collect();
        self.stack.extend(children.into_iter().rev());
        Some((id, node))
    }
}
