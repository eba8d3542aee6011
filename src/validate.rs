// Author: godot-tscn contributors
// License: MIT

//! Structural checks for scene documents, run before conversion.

use std::collections::HashSet;

use tracing::debug;

use crate::ast::{Document, Field, Position, TypedCall, Value, ValueKind};
use crate::godot::{EXT_RESOURCE_TAG, ResourceId, SUB_RESOURCE_TAG};
use crate::TscnError;

/// Scene format versions this crate understands.
pub const SUPPORTED_FORMATS: [i64; 2] = [2, 3];

type Check = fn(&Document) -> Result<(), (String, Position)>;

/// Validators in the order [`validate_scene`] runs them.
pub const VALIDATORS: [(&str, Check); 5] = [
    ("ExtResource has required attributes", ext_resource_required_attributes),
    ("Scene root must not have a parent attribute", first_node_has_no_parent),
    ("Scene must not have multiple root nodes", only_one_root_node),
    ("Scene must be set to supported version", supported_format),
    ("All references to ExtResource/SubResource must exist", references_exist),
];

/// Run every validator, stopping at the first failure.
pub fn validate_scene(document: &Document) -> Result<(), TscnError> {
    for (name, check) in VALIDATORS {
        if let Err((message, position)) = check(document) {
            debug!(validator = name, %position, "scene validation failed");
            return Err(TscnError::Validation {
                validator: name.to_string(),
                message,
                position,
            });
        }
    }
    Ok(())
}

fn ext_resource_required_attributes(document: &Document) -> Result<(), (String, Position)> {
    for section in document.sections_tagged(EXT_RESOURCE_TAG) {
        for attribute in ["path", "type"] {
            match section.attribute(attribute) {
                None => {
                    return Err((
                        format!("ext_resource is missing required attribute '{}'", attribute),
                        section.position,
                    ));
                }
                Some(value) if value.as_str().is_none() => {
                    return Err((
                        format!("ext_resource attribute '{}' must be a string", attribute),
                        value.position,
                    ));
                }
                Some(_) => {}
            }
        }

        match section.attribute("id") {
            None => {
                return Err((
                    "ext_resource is missing required attribute 'id'".into(),
                    section.position,
                ));
            }
            Some(value) if ResourceId::from_value(value).is_none() => {
                return Err((
                    "ext_resource attribute 'id' must be an integer or a string".into(),
                    value.position,
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn first_node_has_no_parent(document: &Document) -> Result<(), (String, Position)> {
    match document.sections_tagged("node").next() {
        Some(first) if first.has_attribute("parent") => Err((
            "the first node in the file is the scene root and must not have a 'parent' attribute".into(),
            first.position,
        )),
        _ => Ok(()),
    }
}

fn only_one_root_node(document: &Document) -> Result<(), (String, Position)> {
    let mut roots = document
        .sections_tagged("node")
        .filter(|s| !s.has_attribute("parent"));
    roots.next();
    match roots.next() {
        Some(second) => Err((
            "found a second root node (a node without parent)".into(),
            second.position,
        )),
        None => Ok(()),
    }
}

fn supported_format(document: &Document) -> Result<(), (String, Position)> {
    let Some(format) = document.header_attribute("format") else {
        return Ok(());
    };
    match format.as_int() {
        Some(version) if SUPPORTED_FORMATS.contains(&version) => Ok(()),
        Some(version) => Err((
            format!(
                "gd_scene format {} is unsupported, expected one of {:?}",
                version, SUPPORTED_FORMATS
            ),
            format.position,
        )),
        None => Err((
            format!("gd_scene format must be an integer, got {}", format.kind_name()),
            format.position,
        )),
    }
}

fn references_exist(document: &Document) -> Result<(), (String, Position)> {
    let ext_ids = declared_ids(document, EXT_RESOURCE_TAG)?;
    let sub_ids = declared_ids(document, SUB_RESOURCE_TAG)?;

    let mut calls = Vec::new();
    if let Some(header) = &document.header {
        collect_calls(&header.attributes, &mut calls);
    }
    collect_calls(&document.fields, &mut calls);
    for section in &document.sections {
        collect_calls(&section.attributes, &mut calls);
        collect_calls(&section.fields, &mut calls);
    }

    for call in calls {
        let declared = match call.name.as_str() {
            "ExtResource" => &ext_ids,
            "SubResource" => &sub_ids,
            _ => continue,
        };

        let id = match call.params.as_slice() {
            [param] => ResourceId::from_value(param),
            _ => None,
        };
        match id {
            Some(id) if declared.contains(&id) => {}
            Some(_) => {
                return Err((format!("could not find resource referenced by {}", call), call.position));
            }
            None => {
                return Err((format!("{} is not a valid resource reference", call), call.position));
            }
        }
    }
    Ok(())
}

fn declared_ids(document: &Document, tag: &str) -> Result<HashSet<ResourceId>, (String, Position)> {
    let mut ids = HashSet::new();
    for section in document.sections_tagged(tag) {
        let Some(value) = section.attribute("id") else {
            return Err((format!("{} is missing required attribute 'id'", tag), section.position));
        };
        let Some(id) = ResourceId::from_value(value) else {
            return Err((
                format!("{} attribute 'id' must be an integer or a string", tag),
                value.position,
            ));
        };
        ids.insert(id);
    }
    Ok(ids)
}

fn collect_calls<'a>(fields: &'a [Field], out: &mut Vec<&'a TypedCall>) {
    for field in fields {
        collect_value_calls(&field.value, out);
    }
}

fn collect_value_calls<'a>(value: &'a Value, out: &mut Vec<&'a TypedCall>) {
    match &value.kind {
        ValueKind::Call(call) => {
            out.push(call);
            for param in &call.params {
                collect_value_calls(param, out);
            }
        }
        ValueKind::Array(items) => {
            for item in items {
                collect_value_calls(item, out);
            }
        }
        ValueKind::Map(entries) => {
            for entry in entries {
                collect_value_calls(&entry.value, out);
            }
        }
        ValueKind::Pair(entry) => collect_value_calls(&entry.value, out),
        _ => {}
    }
}
