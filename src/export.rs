// Author: godot-tscn contributors
// License: MIT

use std::path::Path;

use serde::{Serialize, Serializer};
use serde_json::json;

use crate::ast::{Document, Field, MapEntry, Value, ValueKind};
use crate::loader;
use crate::tree::{NodeId, NodeTree};
use crate::TscnError;

/// JSON form of a single value.
///
/// - strings, numbers, booleans and `null` map directly
/// - arrays stay arrays
/// - maps become arrays of `{"key", "value"}` entries so order and duplicate
///   keys survive
/// - a bare pair becomes one such entry
/// - constructor calls become `{"call": name, "params": [...]}`
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match &value.kind {
        ValueKind::String(s) => json!(s),
        ValueKind::Int(i) => json!(i),
        ValueKind::Float(f) => json!(f),
        ValueKind::Bool(b) => json!(b),
        ValueKind::Null => serde_json::Value::Null,
        ValueKind::Array(items) => json!(items.iter().map(value_to_json).collect::<Vec<_>>()),
        ValueKind::Map(entries) => {
            serde_json::Value::Array(entries.iter().map(entry_to_json).collect())
        }
        ValueKind::Pair(entry) => entry_to_json(entry),
        ValueKind::Call(call) => json!({
            "call": call.name,
            "params": call.params.iter().map(value_to_json).collect::<Vec<_>>(),
        }),
    }
}

fn entry_to_json(entry: &MapEntry) -> serde_json::Value {
    json!({
        "key": entry.key,
        "value": value_to_json(&entry.value),
    })
}

fn fields_to_json<'a>(fields: impl IntoIterator<Item = (&'a String, &'a Value)>) -> serde_json::Value {
    serde_json::Value::Array(
        fields
            .into_iter()
            .map(|(key, value)| json!({ "key": key, "value": value_to_json(value) }))
            .collect(),
    )
}

fn field_list_to_json(fields: &[Field]) -> serde_json::Value {
    fields_to_json(fields.iter().map(|f| (&f.key, &f.value)))
}

/// Export a parsed document to pretty-printed JSON.
///
/// Header attributes, fields and sections keep file order; duplicate keys
/// are kept as separate entries.
///
/// # Examples
/// ```
/// let doc = godot_tscn::parse("[gd_scene format=2]\n[node name=\"Root\" type=\"Node\"]").unwrap();
/// let json = godot_tscn::export::document_to_json(&doc);
/// assert!(json.contains("\"tag\": \"node\""));
/// ```
pub fn document_to_json(doc: &Document) -> String {
    let header = doc.header.as_ref().map(|h| {
        json!({
            "key": h.key,
            "attributes": field_list_to_json(&h.attributes),
        })
    });

    let sections: Vec<serde_json::Value> = doc
        .sections
        .iter()
        .map(|s| {
            json!({
                "tag": s.tag,
                "attributes": field_list_to_json(&s.attributes),
                "fields": field_list_to_json(&s.fields),
            })
        })
        .collect();

    let top = json!({
        "header": header,
        "fields": field_list_to_json(&doc.fields),
        "sections": sections,
    });
    format!("{:#}", top)
}

fn node_to_json(tree: &NodeTree, id: NodeId) -> serde_json::Value {
    let Some(node) = tree.get(id) else {
        return serde_json::Value::Null;
    };
    let children: Vec<serde_json::Value> = node
        .children()
        .map(|child| node_to_json(tree, child))
        .collect();

    json!({
        "name": node.name,
        "type": node.node_type,
        "instance": node.instance.as_ref().map(|call| json!({
            "call": call.name,
            "params": call.params.iter().map(value_to_json).collect::<Vec<_>>(),
        })),
        "fields": fields_to_json(&node.fields),
        "children": children,
    })
}

/// JSON value of an assembled node tree, nested from the root.
pub fn tree_to_value(tree: &NodeTree) -> serde_json::Value {
    node_to_json(tree, tree.root())
}

/// Export an assembled node tree to pretty-printed JSON.
pub fn tree_to_json(tree: &NodeTree) -> String {
    format!("{:#}", tree_to_value(tree))
}

/// Read, parse and export a file in one call.
///
/// # Errors
/// Returns an error if the file can't be read or does not parse.
pub fn export_file<P: AsRef<Path>>(path: P) -> Result<String, TscnError> {
    let doc = loader::load_document(path)?;
    Ok(document_to_json(&doc))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        value_to_json(self).serialize(serializer)
    }
}

impl Serialize for NodeTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        tree_to_value(self).serialize(serializer)
    }
}
