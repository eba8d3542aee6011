use indexmap::IndexMap;
use serde::Serialize;

use super::*;

const RESOURCE_HEADER: &str = "gd_resource";
const RESOURCE_TAG: &str = "resource";

/// A `.tres` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub format: Option<i64>,
    pub ext_resources: IndexMap<ResourceId, ExtResource>,
    pub sub_resources: IndexMap<ResourceId, SubResource>,
    /// Body of the `[resource]` section.
    pub fields: IndexMap<String, Value>,
    pub position: Position,
}

impl Resource {
    pub fn from_document(document: &Document) -> Result<Self, TscnError> {
        expect_header(document, RESOURCE_HEADER)?;

        let header_position = document
            .header
            .as_ref()
            .map_or(document.position, |h| h.position);
        let resource_type = match document.header_attribute("type") {
            Some(value) => value.as_str().ok_or_else(|| TscnError::InvalidAttributeType {
                section: RESOURCE_HEADER.into(),
                attribute: "type".into(),
                expected: "a string".into(),
                found: value.kind_name().into(),
                position: value.position,
            })?,
            None => {
                return Err(TscnError::MissingAttribute {
                    section: RESOURCE_HEADER.into(),
                    attribute: "type".into(),
                    position: header_position,
                });
            }
        };

        let mut resources = ResourceTables::default();
        let mut fields = IndexMap::new();

        for section in &document.sections {
            if resources.absorb(section)? {
                continue;
            }
            if section.tag != RESOURCE_TAG {
                return Err(TscnError::InvalidResourceType {
                    tag: section.tag.clone(),
                    position: section.position,
                });
            }
            fields.extend(field_map(&section.fields));
        }

        Ok(Resource {
            resource_type: resource_type.to_string(),
            format: document.header_attribute("format").and_then(Value::as_int),
            ext_resources: resources.ext_resources,
            sub_resources: resources.sub_resources,
            fields,
            position: document.position,
        })
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
