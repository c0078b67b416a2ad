//! Avro JSON encoding of datums
//!
//! Decodes a JSON payload against the schema it was written with, and
//! encodes a datum back. Non-null union values are wrapped in a single-key
//! object naming the branch: `{"string": "vpc-1"}`. Bytes and fixed values
//! are ISO-8859-1 strings.
//!
//! Field defaults use a different JSON form (unions are not wrapped and take
//! the first branch); [`decode_default`] handles that form.

use crate::datum::{latin1_bytes, latin1_string, Datum};
use crate::error::{child_path, index_path, PayloadError, ROOT_PATH};
use crate::schema::{RecordSchema, Schema};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Decode payload JSON text written with `schema`
pub fn decode_json_str(schema: &Schema, text: &str) -> Result<Datum, PayloadError> {
    let value: Value = serde_json::from_str(text).map_err(PayloadError::InvalidJson)?;
    decode_json(schema, &value)
}

/// Decode a payload JSON value written with `schema`
pub fn decode_json(schema: &Schema, value: &Value) -> Result<Datum, PayloadError> {
    decode(schema, value, ROOT_PATH)
}

/// Encode a datum with `schema`
///
/// # Errors
/// Returns [`PayloadError`] if the datum does not conform to the schema.
pub fn encode_json(schema: &Schema, datum: &Datum) -> Result<Value, PayloadError> {
    encode(schema, datum, ROOT_PATH)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: &str, schema: &Schema, found: impl Into<String>) -> PayloadError {
    PayloadError::TypeMismatch {
        path: path.to_string(),
        expected: schema.kind_name(),
        found: found.into(),
    }
}

fn decode_bytes(text: &str, path: &str) -> Result<Vec<u8>, PayloadError> {
    latin1_bytes(text).ok_or_else(|| PayloadError::InvalidBytes {
        path: path.to_string(),
    })
}

/// Find the union branch a JSON branch key names
///
/// Named branches are matched by full name, falling back to the simple name.
fn find_branch<'a>(branches: &'a [Schema], key: &str) -> Option<(usize, &'a Schema)> {
    branches
        .iter()
        .enumerate()
        .find(|(_, b)| b.branch_name() == key)
        .or_else(|| {
            branches
                .iter()
                .enumerate()
                .find(|(_, b)| b.name().is_some_and(|n| n.name == key))
        })
}

fn decode(schema: &Schema, value: &Value, path: &str) -> Result<Datum, PayloadError> {
    match (schema, value) {
        (Schema::Null, Value::Null) => Ok(Datum::Null),
        (Schema::Boolean, Value::Bool(b)) => Ok(Datum::Boolean(*b)),
        (Schema::Int, Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Datum::Int)
            .ok_or_else(|| out_of_range(path, "int", n)),
        (Schema::Long, Value::Number(n)) => n
            .as_i64()
            .map(Datum::Long)
            .ok_or_else(|| out_of_range(path, "long", n)),
        (Schema::Float, Value::Number(n)) => n
            .as_f64()
            .map(|f| Datum::Float(narrow(f)))
            .ok_or_else(|| out_of_range(path, "float", n)),
        (Schema::Double, Value::Number(n)) => n
            .as_f64()
            .map(Datum::Double)
            .ok_or_else(|| out_of_range(path, "double", n)),
        (Schema::Bytes, Value::String(s)) => decode_bytes(s, path).map(Datum::Bytes),
        (Schema::String, Value::String(s)) => Ok(Datum::String(s.clone())),
        (Schema::Array(items), Value::Array(values)) => values
            .iter()
            .enumerate()
            .map(|(i, v)| decode(items, v, &index_path(path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::Array),
        (Schema::Map(values), Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), decode(values, v, &child_path(path, k))?)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Datum::Map),
        (Schema::Record(record), Value::Object(entries)) => decode_record(record, entries, path),
        (Schema::Enum(e), Value::String(symbol)) => {
            if e.symbols.contains(symbol) {
                Ok(Datum::Enum(symbol.clone()))
            } else {
                Err(PayloadError::UnknownSymbol {
                    path: path.to_string(),
                    name: e.name.fullname(),
                    symbol: symbol.clone(),
                })
            }
        }
        (Schema::Fixed(f), Value::String(s)) => {
            let bytes = decode_bytes(s, path)?;
            if bytes.len() == f.size {
                Ok(Datum::Fixed(bytes))
            } else {
                Err(PayloadError::FixedSize {
                    path: path.to_string(),
                    name: f.name.fullname(),
                    expected: f.size,
                    found: bytes.len(),
                })
            }
        }
        (Schema::Union(branches), Value::Null) => branches
            .iter()
            .position(Schema::is_null)
            .map(|idx| Datum::Union(idx, Box::new(Datum::Null)))
            .ok_or_else(|| PayloadError::UnknownBranch {
                path: path.to_string(),
                branch: "null".into(),
            }),
        (Schema::Union(branches), Value::Object(wrapper)) if wrapper.len() == 1 => {
            let (key, inner) = wrapper.iter().next().ok_or_else(|| mismatch(path, schema, "object"))?;
            let (idx, branch) = find_branch(branches, key).ok_or_else(|| PayloadError::UnknownBranch {
                path: path.to_string(),
                branch: key.clone(),
            })?;
            Ok(Datum::Union(idx, Box::new(decode(branch, inner, path)?)))
        }
        (schema, value) => Err(mismatch(path, schema, json_kind(value))),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(f: f64) -> f32 {
    f as f32
}

fn out_of_range(path: &str, expected: &'static str, n: &Number) -> PayloadError {
    PayloadError::OutOfRange {
        path: path.to_string(),
        expected,
        value: n.to_string(),
    }
}

fn decode_record(
    record: &RecordSchema,
    entries: &Map<String, Value>,
    path: &str,
) -> Result<Datum, PayloadError> {
    let mut fields = IndexMap::with_capacity(record.fields.len());
    for field in &record.fields {
        let field_path = child_path(path, &field.name);
        let datum = match (entries.get(&field.name), &field.default) {
            (Some(value), _) => decode(&field.schema, value, &field_path)?,
            (None, Some(default)) => decode_default_at(&field.schema, default, &field_path)?,
            (None, None) => {
                return Err(PayloadError::MissingField {
                    path: path.to_string(),
                    field: field.name.clone(),
                })
            }
        };
        fields.insert(field.name.clone(), datum);
    }

    if entries.len() > fields.len() {
        let unknown: Vec<&String> = entries.keys().filter(|k| !fields.contains_key(*k)).collect();
        tracing::debug!(
            record = %record.name,
            ?unknown,
            "ignoring payload keys not declared by the writer schema"
        );
    }
    Ok(Datum::Record(fields))
}

/// Decode a field default (Avro default-value JSON form) against `schema`
pub fn decode_default(schema: &Schema, value: &Value) -> Result<Datum, PayloadError> {
    decode_default_at(schema, value, ROOT_PATH)
}

pub(crate) fn decode_default_at(
    schema: &Schema,
    value: &Value,
    path: &str,
) -> Result<Datum, PayloadError> {
    match (schema, value) {
        (Schema::Union(branches), _) => {
            let first = branches.first().ok_or_else(|| mismatch(path, schema, json_kind(value)))?;
            Ok(Datum::Union(0, Box::new(decode_default_at(first, value, path)?)))
        }
        (Schema::Array(items), Value::Array(values)) => values
            .iter()
            .enumerate()
            .map(|(i, v)| decode_default_at(items, v, &index_path(path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::Array),
        (Schema::Map(values), Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), decode_default_at(values, v, &child_path(path, k))?)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Datum::Map),
        (Schema::Record(record), Value::Object(entries)) => {
            let mut fields = IndexMap::with_capacity(record.fields.len());
            for field in &record.fields {
                let field_path = child_path(path, &field.name);
                let value = entries
                    .get(&field.name)
                    .or(field.default.as_ref())
                    .ok_or_else(|| PayloadError::MissingField {
                        path: path.to_string(),
                        field: field.name.clone(),
                    })?;
                fields.insert(
                    field.name.clone(),
                    decode_default_at(&field.schema, value, &field_path)?,
                );
            }
            Ok(Datum::Record(fields))
        }
        _ => decode(schema, value, path),
    }
}

fn float_number(f: f64, path: &str) -> Result<Value, PayloadError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| PayloadError::NonFinite {
            path: path.to_string(),
        })
}

fn datum_kind(datum: &Datum) -> &'static str {
    match datum {
        Datum::Null => "null",
        Datum::Boolean(_) => "boolean",
        Datum::Int(_) => "int",
        Datum::Long(_) => "long",
        Datum::Float(_) => "float",
        Datum::Double(_) => "double",
        Datum::Bytes(_) => "bytes",
        Datum::String(_) => "string",
        Datum::Array(_) => "array",
        Datum::Map(_) => "map",
        Datum::Record(_) => "record",
        Datum::Enum(_) => "enum",
        Datum::Fixed(_) => "fixed",
        Datum::Union(..) => "union",
    }
}

fn encode(schema: &Schema, datum: &Datum, path: &str) -> Result<Value, PayloadError> {
    match (schema, datum) {
        (Schema::Null, Datum::Null) => Ok(Value::Null),
        (Schema::Boolean, Datum::Boolean(b)) => Ok(Value::Bool(*b)),
        (Schema::Int, Datum::Int(i)) => Ok(Value::from(*i)),
        (Schema::Long, Datum::Long(l)) => Ok(Value::from(*l)),
        (Schema::Float, Datum::Float(f)) => float_number(f64::from(*f), path),
        (Schema::Double, Datum::Double(d)) => float_number(*d, path),
        (Schema::Bytes, Datum::Bytes(b)) => Ok(Value::String(latin1_string(b))),
        (Schema::String, Datum::String(s)) => Ok(Value::String(s.clone())),
        (Schema::Array(items), Datum::Array(values)) => values
            .iter()
            .enumerate()
            .map(|(i, d)| encode(items, d, &index_path(path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (Schema::Map(values), Datum::Map(entries)) => entries
            .iter()
            .map(|(k, d)| Ok((k.clone(), encode(values, d, &child_path(path, k))?)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        (Schema::Record(record), Datum::Record(fields)) => {
            let mut out = Map::new();
            for field in &record.fields {
                let datum = fields.get(&field.name).ok_or_else(|| PayloadError::MissingField {
                    path: path.to_string(),
                    field: field.name.clone(),
                })?;
                out.insert(
                    field.name.clone(),
                    encode(&field.schema, datum, &child_path(path, &field.name))?,
                );
            }
            Ok(Value::Object(out))
        }
        (Schema::Enum(e), Datum::Enum(symbol)) => {
            if e.symbols.contains(symbol) {
                Ok(Value::String(symbol.clone()))
            } else {
                Err(PayloadError::UnknownSymbol {
                    path: path.to_string(),
                    name: e.name.fullname(),
                    symbol: symbol.clone(),
                })
            }
        }
        (Schema::Fixed(f), Datum::Fixed(bytes)) => {
            if bytes.len() == f.size {
                Ok(Value::String(latin1_string(bytes)))
            } else {
                Err(PayloadError::FixedSize {
                    path: path.to_string(),
                    name: f.name.fullname(),
                    expected: f.size,
                    found: bytes.len(),
                })
            }
        }
        (Schema::Union(branches), Datum::Union(idx, inner)) => {
            let branch = branches.get(*idx).ok_or_else(|| PayloadError::UnknownBranch {
                path: path.to_string(),
                branch: idx.to_string(),
            })?;
            if branch.is_null() {
                return encode(branch, inner, path);
            }
            let mut wrapper = Map::new();
            wrapper.insert(branch.branch_name(), encode(branch, inner, path)?);
            Ok(Value::Object(wrapper))
        }
        (schema, datum) => Err(mismatch(path, schema, datum_kind(datum))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record_schema() -> Schema {
        Schema::parse_str(
            r#"{
                "type": "record", "name": "Bucket", "namespace": "srd.test",
                "fields": [
                    {"name": "name", "type": "string"},
                    {"name": "vpc", "type": ["null", "string"], "default": null},
                    {"name": "tier", "type": {"type": "enum", "name": "Tier", "symbols": ["HOT", "COLD"]}},
                    {"name": "sizes", "type": {"type": "array", "items": "long"}, "default": []}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn decode_wrapped_union_and_defaults() {
        let schema = record_schema();
        let datum = decode_json(
            &schema,
            &json!({"name": "b", "vpc": {"string": "vpc-1"}, "tier": "HOT"}),
        )
        .unwrap();

        assert_eq!(
            datum.field("vpc"),
            Some(&Datum::Union(1, Box::new(Datum::String("vpc-1".into()))))
        );
        assert_eq!(datum.field("sizes"), Some(&Datum::Array(Vec::new())));
    }

    #[test]
    fn decode_null_union() {
        let schema = record_schema();
        let datum =
            decode_json(&schema, &json!({"name": "b", "vpc": null, "tier": "COLD"})).unwrap();
        assert_eq!(datum.field("vpc"), Some(&Datum::Union(0, Box::new(Datum::Null))));
    }

    #[test]
    fn unwrapped_union_value_is_rejected() {
        let schema = record_schema();
        let err = decode_json(&schema, &json!({"name": "b", "vpc": "vpc-1", "tier": "HOT"}))
            .unwrap_err();
        assert!(matches!(err, PayloadError::TypeMismatch { path, .. } if path == "$.vpc"));
    }

    #[test]
    fn missing_required_field() {
        let schema = record_schema();
        let err = decode_json(&schema, &json!({"name": "b"})).unwrap_err();
        assert!(matches!(err, PayloadError::MissingField { field, .. } if field == "tier"));
    }

    #[test]
    fn unknown_enum_symbol() {
        let schema = record_schema();
        let err = decode_json(&schema, &json!({"name": "b", "tier": "WARM"})).unwrap_err();
        assert!(matches!(err, PayloadError::UnknownSymbol { symbol, .. } if symbol == "WARM"));
    }

    #[test]
    fn int_out_of_range() {
        let err = decode_json(&Schema::Int, &json!(4_294_967_296_i64)).unwrap_err();
        assert!(matches!(err, PayloadError::OutOfRange { expected: "int", .. }));
    }

    #[test]
    fn named_branch_matches_simple_name() {
        let schema = Schema::parse_str(
            r#"["null", {"type": "fixed", "name": "Id", "namespace": "srd", "size": 2}]"#,
        )
        .unwrap();
        let datum = decode_json(&schema, &json!({"Id": "ab"})).unwrap();
        assert_eq!(datum, Datum::Union(1, Box::new(Datum::Fixed(b"ab".to_vec()))));
    }

    #[test]
    fn encode_then_decode_preserves_datum() {
        let schema = record_schema();
        let payload = json!({"name": "b", "vpc": {"string": "vpc-1"}, "tier": "HOT", "sizes": [1, 2]});
        let datum = decode_json(&schema, &payload).unwrap();
        assert_eq!(encode_json(&schema, &datum).unwrap(), payload);
    }

    #[test]
    fn default_union_uses_first_branch() {
        let schema = Schema::parse_str(r#"["string", "null"]"#).unwrap();
        let datum = decode_default(&schema, &json!("fallback")).unwrap();
        assert_eq!(datum, Datum::Union(0, Box::new(Datum::String("fallback".into()))));
    }

    #[test]
    fn encode_rejects_non_finite() {
        let err = encode_json(&Schema::Double, &Datum::Double(f64::NAN)).unwrap_err();
        assert!(matches!(err, PayloadError::NonFinite { .. }));
    }
}
