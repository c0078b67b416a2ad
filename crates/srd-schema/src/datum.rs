//! Decoded values
//!
//! A [`Datum`] is a value tree shaped by the schema it was decoded or
//! resolved with. Unions keep the index of the branch they took so a
//! datum can be re-encoded or resolved without guessing.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Schema-shaped value
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Datum>),
    Map(BTreeMap<String, Datum>),
    /// Fields in schema declaration order
    Record(IndexMap<String, Datum>),
    /// Enum symbol
    Enum(String),
    Fixed(Vec<u8>),
    /// Branch index into the union and the branch value
    Union(usize, Box<Datum>),
}

impl Datum {
    /// Record field by name, looking through a union wrapper
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Datum> {
        match self {
            Self::Record(fields) => fields.get(name),
            Self::Union(_, inner) => inner.field(name),
            _ => None,
        }
    }

    /// Value with any union wrapper removed
    #[must_use]
    pub fn unwrap_union(&self) -> &Datum {
        match self {
            Self::Union(_, inner) => inner.unwrap_union(),
            other => other,
        }
    }

    /// Text content of a string datum
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.unwrap_union() {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON view of the datum
    ///
    /// Unions are flattened to their branch value, enums become their symbol
    /// and bytes become ISO-8859-1 strings. This is the shape typed models
    /// deserialize from; it is not the Avro JSON encoding.
    #[must_use]
    pub fn to_plain_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Long(l) => Value::from(*l),
            Self::Float(f) => float_value(f64::from(*f)),
            Self::Double(d) => float_value(*d),
            Self::Bytes(b) | Self::Fixed(b) => Value::String(latin1_string(b)),
            Self::String(s) | Self::Enum(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Datum::to_plain_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_plain_json()))
                    .collect::<Map<_, _>>(),
            ),
            Self::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_plain_json()))
                    .collect::<Map<_, _>>(),
            ),
            Self::Union(_, inner) => inner.to_plain_json(),
        }
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

/// Bytes as ISO-8859-1 text (one char per byte)
pub(crate) fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// ISO-8859-1 text back to bytes, `None` if a char exceeds U+00FF
pub(crate) fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}
