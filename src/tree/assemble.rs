use tracing::{debug, trace};

use super::*;
use crate::ast::{Document, Section, ValueKind};
use crate::godot::Editable;
use crate::options::{AssembleOptions, VOLATILE_NODE_TYPE};

const NODE_TAG: &str = "node";

/// Build the node tree of a scene document, reading editable declarations
/// from its `[editable path="..."]` sections.
pub fn assemble_tree(document: &Document) -> Result<NodeTree, TscnError> {
    assemble_tree_with(document, &AssembleOptions::default())
}

pub fn assemble_tree_with(
    document: &Document,
    options: &AssembleOptions,
) -> Result<NodeTree, TscnError> {
    let editables = document
        .sections_tagged("editable")
        .map(|s| Editable::try_from(s).map(|e| e.path))
        .collect::<Result<Vec<_>, _>>()?;
    TreeAssembler::new(&document.sections, editables, options.clone()).assemble()
}

/// A converted node waiting outside the tree for editable reconciliation.
struct Parked {
    id: NodeId,
    parent_path: String,
    position: Position,
}

/// Turns the flat `[node]` sections of a scene into a [`NodeTree`].
///
/// Sections are attached in passes, in file order, as soon as their parent
/// path resolves. A section whose parent keeps failing to resolve is parked
/// once the consecutive-failure count reaches the retry budget. Parked nodes
/// are placed at the end, either below placeholder ancestors synthesized for
/// a matching editable subscene or by a final plain lookup.
pub struct TreeAssembler<'a> {
    sections: Vec<&'a Section>,
    editables: Vec<String>,
    options: AssembleOptions,
}

impl<'a> TreeAssembler<'a> {
    /// `sections` may hold any tags; only `node` sections are used.
    pub fn new<I, E>(sections: I, editables: E, options: AssembleOptions) -> Self
    where
        I: IntoIterator<Item = &'a Section>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        TreeAssembler {
            sections: sections.into_iter().filter(|s| s.tag == NODE_TAG).collect(),
            editables: editables.into_iter().map(Into::into).collect(),
            options,
        }
    }

    pub fn assemble(self) -> Result<NodeTree, TscnError> {
        let (root, pending) = self.partition()?;
        let mut tree = NodeTree::new(convert_section(root)?);

        let bucket = self.resolve(&mut tree, &pending)?;
        self.reconcile(&mut tree, bucket)?;

        debug!(
            root = %tree.root_node().name,
            nodes = tree.len(),
            "assembled node tree"
        );
        Ok(tree)
    }

    fn partition(&self) -> Result<(&'a Section, Vec<&'a Section>), TscnError> {
        let mut root: Option<&'a Section> = None;
        let mut pending = Vec::new();

        for &section in &self.sections {
            if section.has_attribute("parent") {
                pending.push(section);
                continue;
            }
            if let Some(first) = root {
                return Err(TscnError::MultipleRoots {
                    first: section_name(first).to_string(),
                    second: section_name(section).to_string(),
                    position: section.position,
                });
            }
            root = Some(section);
        }

        let root = root.ok_or_else(|| TscnError::MissingRoot {
            position: self
                .sections
                .first()
                .map_or_else(Position::start, |s| s.position),
        })?;
        Ok((root, pending))
    }

    /// Attach everything that resolves; return the parked nodes.
    ///
    /// A pass that attaches nothing leaves the tree unchanged, so no later
    /// pass could attach anything either: every section still pending is
    /// parked right away instead of spending the rest of the budget.
    fn resolve(&self, tree: &mut NodeTree, pending: &[&'a Section]) -> Result<Vec<Parked>, TscnError> {
        let budget = self.options.retry_budget.max(1);
        let mut done = vec![false; pending.len()];
        let mut remaining = pending.len();
        let mut failures = 0usize;
        let mut bucket = Vec::new();
        let mut pass = 0usize;

        while remaining > 0 {
            pass += 1;
            trace!(pass, remaining, "node resolution pass");
            let mut attached = 0usize;

            for (index, &section) in pending.iter().enumerate() {
                if done[index] {
                    continue;
                }

                let parent_path = parent_path_of(section)?;
                if let Some(parent) = resolve_parent(tree, parent_path) {
                    tree.add_node(parent, convert_section(section)?)?;
                    done[index] = true;
                    remaining -= 1;
                    attached += 1;
                    failures = 0;
                    continue;
                }

                failures += 1;
                if failures >= budget {
                    bucket.push(park(tree, section, parent_path)?);
                    done[index] = true;
                    remaining -= 1;
                    failures = 0;
                }
            }

            if attached == 0 && remaining > 0 {
                debug!(pass, remaining, "no progress in pass, parking remaining nodes");
                for (index, &section) in pending.iter().enumerate() {
                    if !done[index] {
                        bucket.push(park(tree, section, parent_path_of(section)?)?);
                        done[index] = true;
                    }
                }
                remaining = 0;
            }
        }

        Ok(bucket)
    }

    /// Place parked nodes, shallowest parent path first.
    fn reconcile(&self, tree: &mut NodeTree, mut bucket: Vec<Parked>) -> Result<(), TscnError> {
        bucket.sort_by_key(|p| p.parent_path.split('/').count());

        let mut unresolved = Vec::new();
        for parked in bucket {
            let below_root = strip_root_qualifier(tree, &parked.parent_path);
            let editable = self
                .editables
                .iter()
                .find(|e| self.options.editable_match.matches(e, below_root));

            let parent = match editable {
                Some(editable) => {
                    trace!(editable = %editable, parent = %parked.parent_path, "matched editable");
                    Some(materialize_path(tree, below_root)?)
                }
                None => resolve_parent(tree, &parked.parent_path),
            };

            match parent {
                Some(parent) => {
                    tree.attach(parent, parked.id);
                    debug!(
                        node = %tree[parked.id].name,
                        parent = %parked.parent_path,
                        "reconciled parked node"
                    );
                }
                None => unresolved.push(parked),
            }
        }

        match unresolved.first() {
            Some(first) => Err(TscnError::UnresolvableNodeTree {
                node: tree
                    .get(first.id)
                    .map(|n| n.name.clone())
                    .unwrap_or_default(),
                parent_path: first.parent_path.clone(),
                remaining: unresolved.len(),
                position: first.position,
            }),
            None => Ok(()),
        }
    }
}

/// Plain lookup first; then, if the path starts with the root's own name,
/// the rest of the path below the root (`Root` is `.`, `Root/A` is `A`).
fn resolve_parent(tree: &NodeTree, path: &str) -> Option<NodeId> {
    if let Some(id) = tree.get_node(path) {
        return Some(id);
    }
    let (first, rest) = path.split_once('/').unwrap_or((path, "."));
    if first == tree.root_node().name {
        tree.get_node(rest)
    } else {
        None
    }
}

/// Convert a section and keep it in the arena without a parent.
fn park(tree: &mut NodeTree, section: &Section, parent_path: &str) -> Result<Parked, TscnError> {
    let id = tree.insert_detached(convert_section(section)?);
    debug!(
        node = %section_name(section),
        parent = %parent_path,
        "parking node with unresolved parent"
    );
    Ok(Parked {
        id,
        parent_path: parent_path.to_string(),
        position: section.position,
    })
}

/// `path` without a leading root name (`Root/A/B` is `A/B`, `Root` is `.`),
/// unless the root has a real child of that name.
fn strip_root_qualifier<'p>(tree: &NodeTree, path: &'p str) -> &'p str {
    let (first, rest) = path.split_once('/').unwrap_or((path, "."));
    let root = tree.root_node();
    if first == root.name && root.child(first).is_none() {
        rest
    } else {
        path
    }
}

/// Walk `path` from the root, creating volatile placeholders for missing segments.
fn materialize_path(tree: &mut NodeTree, path: &str) -> Result<NodeId, TscnError> {
    let mut current = tree.root();
    if path == "." {
        return Ok(current);
    }

    for segment in path.split('/') {
        current = match tree.get(current).and_then(|n| n.child(segment)) {
            Some(child) => child,
            None => {
                let volatile = Node::new(segment).with_type(VOLATILE_NODE_TYPE);
                let id = tree.add_node(current, volatile)?;
                debug!(node = %segment, path = %path, "created volatile node");
                id
            }
        };
    }

    Ok(current)
}

fn section_name(section: &Section) -> &str {
    section.attribute_str("name").unwrap_or("<unnamed>")
}

fn parent_path_of(section: &Section) -> Result<&str, TscnError> {
    match section.attribute("parent") {
        Some(value) => value.as_str().ok_or_else(|| TscnError::InvalidParentType {
            node: section_name(section).to_string(),
            found: value.kind_name().to_string(),
            position: value.position,
        }),
        None => Err(TscnError::MissingAttribute {
            section: NODE_TAG.into(),
            attribute: "parent".into(),
            position: section.position,
        }),
    }
}

/// Convert a `[node]` section into a detached [`Node`].
fn convert_section(section: &Section) -> Result<Node, TscnError> {
    let name = match section.attribute("name") {
        Some(value) => value.as_str().ok_or_else(|| TscnError::InvalidAttributeType {
            section: NODE_TAG.into(),
            attribute: "name".into(),
            expected: "string".into(),
            found: value.kind_name().into(),
            position: value.position,
        })?,
        None => {
            return Err(TscnError::MissingAttribute {
                section: NODE_TAG.into(),
                attribute: "name".into(),
                position: section.position,
            });
        }
    };

    let mut node = Node::new(name).with_position(section.position);

    if let Some(value) = section.attribute("type") {
        let node_type = value.as_str().ok_or_else(|| TscnError::InvalidAttributeType {
            section: NODE_TAG.into(),
            attribute: "type".into(),
            expected: "string".into(),
            found: value.kind_name().into(),
            position: value.position,
        })?;
        node.node_type = Some(node_type.to_string());
    }

    if let Some(value) = section.attribute("instance") {
        match &value.kind {
            ValueKind::Call(call) if call.params.len() == 1 => {
                node.instance = Some(call.clone());
            }
            _ => {
                return Err(TscnError::InvalidInstance {
                    node: name.to_string(),
                    found: value.to_string(),
                    position: value.position,
                });
            }
        }
    }

    for field in &section.fields {
        node.fields.insert(field.key.clone(), field.value.clone());
    }

    Ok(node)
}
