/// Consecutive failed parent lookups tolerated before a node section is parked.
pub const DEFAULT_RETRY_BUDGET: usize = 1_000_000;

/// Node type given to placeholder ancestors synthesized for editable subscenes.
pub const VOLATILE_NODE_TYPE: &str = "VolatileNode";

/// How an `[editable path="..."]` declaration is matched against a parked
/// node's parent path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditableMatch {
    /// The editable path must equal the parent path or be a leading run of its
    /// `/`-separated segments. `Hazards` matches `Hazards/Spikes` but not
    /// `Hazards2/Spikes`.
    #[default]
    Segments,
    /// Plain string prefix, so `Hazards` also matches `Hazards2/Spikes`.
    StringPrefix,
}

impl EditableMatch {
    pub fn matches(self, editable: &str, parent_path: &str) -> bool {
        match self {
            EditableMatch::StringPrefix => parent_path.starts_with(editable),
            EditableMatch::Segments => {
                let mut wanted = editable.split('/');
                let mut have = parent_path.split('/');
                loop {
                    match (wanted.next(), have.next()) {
                        (None, _) => return true,
                        (Some(w), Some(h)) if w == h => continue,
                        _ => return false,
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    pub retry_budget: usize,
    pub editable_match: EditableMatch,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            editable_match: EditableMatch::default(),
        }
    }
}

impl AssembleOptions {
    /// Zero is treated as one: every failed lookup parks immediately.
    pub fn with_retry_budget(mut self, budget: usize) -> Self {
        self.retry_budget = budget.max(1);
        self
    }

    pub fn with_editable_match(mut self, editable_match: EditableMatch) -> Self {
        self.editable_match = editable_match;
        self
    }
}
