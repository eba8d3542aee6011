use thiserror::Error;

use crate::ast::Position;

/// The main error type for lexing, parsing, tree assembly and conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TscnError {
    /// Raised for unterminated strings, unexpected characters and bad numbers.
    #[error("[TSCN] Lex Error at {position}: {message}{}", hint_suffix(.hint))]
    LexError {
        message: String,
        position: Position,
        hint: Option<String>,
    },

    #[error("[TSCN] Syntax Error at {position}: expected {expected}, found {found}")]
    SyntaxError {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("[TSCN] Missing root node at {position}: every node section declares a 'parent'")]
    MissingRoot { position: Position },

    #[error("[TSCN] Multiple root nodes at {position}: '{first}' and '{second}' both lack a 'parent'")]
    MultipleRoots {
        first: String,
        second: String,
        position: Position,
    },

    #[error("[TSCN] Invalid parent of node '{node}' at {position}: expected a string, got {found}")]
    InvalidParentType {
        node: String,
        found: String,
        position: Position,
    },

    #[error("[TSCN] Invalid instance of node '{node}' at {position}: expected a reference with one parameter, got {found}")]
    InvalidInstance {
        node: String,
        found: String,
        position: Position,
    },

    /// Nodes stayed parked after editable reconciliation.
    #[error(
        "[TSCN] Unresolvable node tree at {position}: parent '{parent_path}' of node '{node}' does not exist ({remaining} unresolved node(s))"
    )]
    UnresolvableNodeTree {
        node: String,
        parent_path: String,
        remaining: usize,
        position: Position,
    },

    #[error("[TSCN] Missing attribute '{attribute}' on [{section}] at {position}")]
    MissingAttribute {
        section: String,
        attribute: String,
        position: Position,
    },

    #[error("[TSCN] Attribute '{attribute}' on [{section}] at {position} must be {expected}, got {found}")]
    InvalidAttributeType {
        section: String,
        attribute: String,
        expected: String,
        found: String,
        position: Position,
    },

    #[error("[TSCN] Can't convert '{found}' to {expected}")]
    WrongFileKind { expected: String, found: String },

    #[error("[TSCN] Invalid resource type [{tag}] at {position}")]
    InvalidResourceType { tag: String, position: Position },

    #[error("[TSCN] Node path '{path}': {message}")]
    NodePath { path: String, message: String },

    #[error("[TSCN] Validation '{validator}' failed at {position}: {message}")]
    Validation {
        validator: String,
        message: String,
        position: Position,
    },

    #[error("[TSCN] File Error '{path}': {message}")]
    FileError { path: String, message: String },
}

impl TscnError {
    /// Stable numeric code per error kind.
    pub fn code(&self) -> u32 {
        match self {
            TscnError::LexError { .. } => 101,
            TscnError::SyntaxError { .. } => 201,
            TscnError::MissingAttribute { .. } => 301,
            TscnError::InvalidAttributeType { .. } => 302,
            TscnError::WrongFileKind { .. } => 303,
            TscnError::InvalidResourceType { .. } => 304,
            TscnError::Validation { .. } => 401,
            TscnError::MissingRoot { .. } => 501,
            TscnError::MultipleRoots { .. } => 502,
            TscnError::InvalidParentType { .. } => 503,
            TscnError::UnresolvableNodeTree { .. } => 504,
            TscnError::InvalidInstance { .. } => 505,
            TscnError::NodePath { .. } => 506,
            TscnError::FileError { .. } => 601,
        }
    }

    /// Source position of the offending construct, when there is one.
    pub fn position(&self) -> Option<Position> {
        match self {
            TscnError::LexError { position, .. }
            | TscnError::SyntaxError { position, .. }
            | TscnError::MissingRoot { position }
            | TscnError::MultipleRoots { position, .. }
            | TscnError::InvalidParentType { position, .. }
            | TscnError::InvalidInstance { position, .. }
            | TscnError::UnresolvableNodeTree { position, .. }
            | TscnError::MissingAttribute { position, .. }
            | TscnError::InvalidAttributeType { position, .. }
            | TscnError::InvalidResourceType { position, .. }
            | TscnError::Validation { position, .. } => Some(*position),
            TscnError::WrongFileKind { .. }
            | TscnError::NodePath { .. }
            | TscnError::FileError { .. } => None,
        }
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h))
}
