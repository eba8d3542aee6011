use super::*;

pub type Settings = IndexMap<String, Value>;

/// `project.godot`: top-level fields plus one settings map per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Project {
    pub fields: Settings,
    pub sections: IndexMap<String, Settings>,
}

impl Project {
    pub fn from_document(document: &Document) -> Result<Self, TscnError> {
        if let Some(key) = document.header_key() {
            return Err(TscnError::WrongFileKind {
                expected: "project settings".into(),
                found: key.to_string(),
            });
        }

        let mut project = Project {
            fields: field_map(&document.fields),
            sections: IndexMap::new(),
        };

        // A section tag seen twice merges into one map.
        for section in &document.sections {
            project
                .sections
                .entry(section.tag.clone())
                .or_default()
                .extend(field_map(&section.fields));
        }

        Ok(project)
    }

    pub fn section(&self, name: &str) -> Option<&Settings> {
        self.sections.get(name)
    }

    /// `setting("application", "config/name")`
    pub fn setting(&self, section: &str, key: &str) -> Option<&Value> {
        self.section(section)?.get(key)
    }

    pub fn config_version(&self) -> Option<i64> {
        self.fields.get("config_version").and_then(Value::as_int)
    }
}
