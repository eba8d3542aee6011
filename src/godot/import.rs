use super::*;

const REMAP_HEADER: &str = "remap";

/// A `*.import` sidecar file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Import {
    /// Attributes and fields of the leading `[remap]` block.
    pub remap: IndexMap<String, Value>,
    pub deps: IndexMap<String, Value>,
    pub params: IndexMap<String, Value>,
    /// Every other section, keyed by tag.
    pub rest: IndexMap<String, IndexMap<String, Value>>,
    pub position: Position,
}

impl Import {
    pub fn from_document(document: &Document) -> Result<Self, TscnError> {
        let mut import = Import {
            position: document.position,
            ..Import::default()
        };

        if let Some(header) = &document.header {
            if header.key != REMAP_HEADER {
                return Err(TscnError::WrongFileKind {
                    expected: REMAP_HEADER.into(),
                    found: header.key.clone(),
                });
            }
            import.remap.extend(field_map(&header.attributes));
        }
        import.remap.extend(field_map(&document.fields));

        for section in &document.sections {
            let target = match section.tag.as_str() {
                "deps" => &mut import.deps,
                "params" => &mut import.params,
                other => import.rest.entry(other.to_string()).or_default(),
            };
            target.extend(field_map(&section.fields));
        }

        Ok(import)
    }

    pub fn remap_path(&self) -> Option<&str> {
        self.remap.get("path").and_then(Value::as_str)
    }

    pub fn importer(&self) -> Option<&str> {
        self.remap.get("importer").and_then(Value::as_str)
    }
}
