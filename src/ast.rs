use std::fmt;

use serde::Serialize;

/// A location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// Byte offset from the start of the input.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in chars.
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }

    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed scene, resource, project or import file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header: Option<Header>,
    /// Fields following the header (or opening a header-less file).
    pub fields: Vec<Field>,
    pub sections: Vec<Section>,
    pub position: Position,
}

/// The file descriptor, e.g. `[gd_scene load_steps=4 format=3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub key: String,
    pub attributes: Vec<Field>,
    pub position: Position,
}

/// A bracketed block: `[tag attr=value ...]` followed by its body fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub tag: String,
    pub attributes: Vec<Field>,
    pub fields: Vec<Field>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub value: Value,
    pub position: Position,
}

/// A `"key": value` entry, inside a map or standing alone as a value.
#[derive(Debug, Clone)]
pub struct MapEntry {
    pub key: String,
    pub value: Value,
    pub position: Position,
}

/// Constructor syntax such as `Vector2( 1, 2 )`, `ExtResource( 3 )` or a bare `InputEventKey`.
#[derive(Debug, Clone)]
pub struct TypedCall {
    pub name: String,
    pub params: Vec<Value>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Array(Vec<Value>),
    Map(Vec<MapEntry>),
    /// A bare key-value pair, used for named constructor arguments.
    Pair(Box<MapEntry>),
    Call(TypedCall),
}

/// Borrowed view of the single payload a [`Value`] carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Raw<'a> {
    String(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Array(&'a [Value]),
    Map(&'a [MapEntry]),
    Pair(&'a MapEntry),
    Call(&'a TypedCall),
}

// Positions are diagnostics only; equality is structural.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl PartialEq for MapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl PartialEq for TypedCall {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl From<ValueKind> for Value {
    fn from(kind: ValueKind) -> Self {
        Value { kind, position: Position::default() }
    }
}

impl Value {
    pub fn new(kind: ValueKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn raw(&self) -> Raw<'_> {
        match &self.kind {
            ValueKind::String(s) => Raw::String(s),
            ValueKind::Int(i) => Raw::Int(*i),
            ValueKind::Float(f) => Raw::Float(*f),
            ValueKind::Bool(b) => Raw::Bool(*b),
            ValueKind::Null => Raw::Null,
            ValueKind::Array(items) => Raw::Array(items),
            ValueKind::Map(entries) => Raw::Map(entries),
            ValueKind::Pair(entry) => Raw::Pair(entry),
            ValueKind::Call(call) => Raw::Call(call),
        }
    }

    /// Short name of the populated variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ValueKind::String(_) => "string",
            ValueKind::Int(_) => "integer",
            ValueKind::Float(_) => "float",
            ValueKind::Bool(_) => "bool",
            ValueKind::Null => "null",
            ValueKind::Array(_) => "array",
            ValueKind::Map(_) => "map",
            ValueKind::Pair(_) => "key-value pair",
            ValueKind::Call(_) => "typed value",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let ValueKind::String(s) = &self.kind {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        if let ValueKind::Int(i) = self.kind {
            Some(i)
        } else {
            None
        }
    }

    /// Floats, with integers widened.
    pub fn as_float(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Float(f) => Some(f),
            ValueKind::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let ValueKind::Bool(b) = self.kind {
            Some(b)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        if let ValueKind::Array(items) = &self.kind {
            Some(items)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&[MapEntry]> {
        if let ValueKind::Map(entries) = &self.kind {
            Some(entries)
        } else {
            None
        }
    }

    pub fn as_pair(&self) -> Option<&MapEntry> {
        if let ValueKind::Pair(entry) = &self.kind {
            Some(entry)
        } else {
            None
        }
    }

    pub fn as_call(&self) -> Option<&TypedCall> {
        if let ValueKind::Call(call) = &self.kind {
            Some(call)
        } else {
            None
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    /// First map entry with the given key.
    pub fn map_get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }
}

impl TypedCall {
    /// `ExtResource( id )` or `SubResource( id )`.
    pub fn is_resource_reference(&self) -> bool {
        (self.name == "ExtResource" || self.name == "SubResource") && self.params.len() == 1
    }

    /// The id parameter of a resource reference.
    pub fn reference_id(&self) -> Option<&Value> {
        if self.is_resource_reference() {
            self.params.first()
        } else {
            None
        }
    }
}

pub(crate) fn find_field<'a>(fields: &'a [Field], key: &str) -> Option<&'a Value> {
    fields.iter().find(|f| f.key == key).map(|f| &f.value)
}

impl Document {
    pub fn header_key(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.key.as_str())
    }

    pub fn header_attribute(&self, key: &str) -> Option<&Value> {
        self.header.as_ref().and_then(|h| find_field(&h.attributes, key))
    }

    /// First top-level field with the given key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        find_field(&self.fields, key)
    }

    pub fn sections_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |s| s.tag == tag)
    }
}

impl Section {
    /// First attribute with the given key.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        find_field(&self.attributes, key)
    }

    /// First body field with the given key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        find_field(&self.fields, key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    pub fn attribute_int(&self, key: &str) -> Option<i64> {
        self.attribute(key).and_then(Value::as_int)
    }
}

/// Renders floats fixed-point, always with a decimal point so they lex back as floats.
fn format_float(f: f64) -> String {
    let s = f.to_string();
    if s.contains('.') || !f.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.key, self.value)
    }
}

impl fmt::Display for TypedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, join(&self.params))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::String(s) => write!(f, "\"{}\"", s),
            ValueKind::Int(i) => write!(f, "{}", i),
            ValueKind::Float(x) => f.write_str(&format_float(*x)),
            ValueKind::Bool(b) => write!(f, "{}", b),
            ValueKind::Null => f.write_str("null"),
            ValueKind::Array(items) => write!(f, "[{}]", join(items)),
            ValueKind::Map(entries) => write!(f, "{{{}}}", join(entries)),
            ValueKind::Pair(entry) => write!(f, "{}", entry),
            ValueKind::Call(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(kind: ValueKind) -> Value {
        Value::from(kind)
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(v(ValueKind::String("Test".into())).to_string(), "\"Test\"");
        assert_eq!(v(ValueKind::Int(-10)).to_string(), "-10");
        assert_eq!(v(ValueKind::Float(13.37)).to_string(), "13.37");
        assert_eq!(v(ValueKind::Float(-69.0)).to_string(), "-69.0");
        assert_eq!(v(ValueKind::Float(1e-5)).to_string(), "0.00001");
        assert_eq!(v(ValueKind::Bool(false)).to_string(), "false");
        assert_eq!(v(ValueKind::Null).to_string(), "null");
    }

    #[test]
    fn test_display_compound() {
        let call = v(ValueKind::Call(TypedCall {
            name: "Vector2".into(),
            params: vec![v(ValueKind::Int(1)), v(ValueKind::Float(2.5))],
            position: Position::default(),
        }));
        assert_eq!(call.to_string(), "Vector2 (1, 2.5)");

        let map = v(ValueKind::Map(vec![MapEntry {
            key: "k".into(),
            value: v(ValueKind::Array(vec![])),
            position: Position::default(),
        }]));
        assert_eq!(map.to_string(), "{\"k\": []}");
        assert_eq!(v(ValueKind::Map(vec![])).to_string(), "{}");
    }

    #[test]
    fn test_equality_ignores_position() {
        let a = Value::new(ValueKind::Int(1), Position::new(0, 1, 1));
        let b = Value::new(ValueKind::Int(1), Position::new(10, 3, 7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_raw_and_accessors() {
        let value = v(ValueKind::Int(7));
        assert_eq!(value.raw(), Raw::Int(7));
        assert_eq!(value.as_float(), Some(7.0));
        assert_eq!(value.as_str(), None);
        assert!(v(ValueKind::Null).is_null());
        assert_eq!(v(ValueKind::Array(vec![])).raw(), Raw::Array(&[]));
    }
}
