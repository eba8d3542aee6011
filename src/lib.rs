//! Reader for Godot's text formats: scenes (`.tscn`), resources (`.tres`),
//! `project.godot` and `.import` files.
//!
//! [`parse`] turns text into a [`Document`]; [`assemble_tree`] builds the scene's
//! [`NodeTree`] from its `[node]` sections; the [`godot`] module wraps documents
//! in typed records.
//!
//! ```
//! let doc = godot_tscn::parse(r#"
//! [gd_scene format=2]
//! [node name="Main" type="Node2D"]
//! [node name="Player" type="KinematicBody2D" parent="."]
//! speed = 200
//! "#)?;
//! let tree = godot_tscn::assemble_tree(&doc)?;
//! let player = tree.get_node("Player").unwrap();
//! assert_eq!(tree[player].field("speed").and_then(|v| v.as_int()), Some(200));
//! # Ok::<(), godot_tscn::TscnError>(())
//! ```

pub mod ast;
pub mod error;
pub mod export;
pub mod godot;
pub mod lexer;
pub mod loader;
pub mod options;
pub mod parser;
pub mod tree;
pub mod validate;

pub use ast::{Document, Field, Header, MapEntry, Position, Section, TypedCall, Value, ValueKind};
pub use error::TscnError;
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use options::{AssembleOptions, DEFAULT_RETRY_BUDGET, EditableMatch, VOLATILE_NODE_TYPE};
pub use parser::{Parser, parse};
pub use tree::{Node, NodeId, NodeTree, TreeAssembler, assemble_tree, assemble_tree_with};
