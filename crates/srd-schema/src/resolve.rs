//! Writer/reader schema resolution
//!
//! Converts a datum decoded with the writer schema into the shape of the
//! reader schema:
//! - Record fields are matched by exact name; writer-only fields are dropped
//!   and reader-only fields take the reader default
//! - Named types match on their unqualified name
//! - Numeric promotion `int → long → float → double`, plus `string ↔ bytes`
//! - Enum symbols unknown to the reader fall back to the reader enum default
//! - A writer union resolves the branch it took; a reader union takes the
//!   first branch that matches exactly, else the first the writer promotes to

use crate::datum::Datum;
use crate::error::{child_path, index_path, ResolutionError, ROOT_PATH};
use crate::json::decode_default_at;
use crate::schema::{EnumSchema, RecordSchema, Schema};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Resolve `datum`, written with `writer`, into the shape of `reader`
///
/// # Errors
/// Returns [`ResolutionError`] naming the path of the first value that cannot
/// be resolved.
pub fn resolve(writer: &Schema, reader: &Schema, datum: &Datum) -> Result<Datum, ResolutionError> {
    resolve_at(writer, reader, datum, ROOT_PATH)
}

fn incompatible(writer: &Schema, reader: &Schema, path: &str) -> ResolutionError {
    ResolutionError::Incompatible {
        path: path.to_string(),
        writer: writer.kind_name(),
        reader: reader.kind_name(),
    }
}

fn same_name(writer: &Schema, reader: &Schema) -> bool {
    match (writer.name(), reader.name()) {
        (Some(w), Some(r)) => w.name == r.name,
        _ => false,
    }
}

/// Whether `writer` and `reader` are the same kind of type
///
/// Named types also need the same unqualified name.
fn matches_exactly(writer: &Schema, reader: &Schema) -> bool {
    match (writer, reader) {
        (Schema::Record(_), Schema::Record(_))
        | (Schema::Enum(_), Schema::Enum(_))
        | (Schema::Fixed(_), Schema::Fixed(_)) => same_name(writer, reader),
        (Schema::Array(_), Schema::Array(_)) | (Schema::Map(_), Schema::Map(_)) => true,
        _ => std::mem::discriminant(writer) == std::mem::discriminant(reader)
            && !matches!(writer, Schema::Union(_)),
    }
}

fn promotes_to(writer: &Schema, reader: &Schema) -> bool {
    matches!(
        (writer, reader),
        (Schema::Int, Schema::Long | Schema::Float | Schema::Double)
            | (Schema::Long, Schema::Float | Schema::Double)
            | (Schema::Float, Schema::Double)
            | (Schema::String, Schema::Bytes)
            | (Schema::Bytes, Schema::String)
    )
}

/// Reader union branch for a non-union writer type
fn select_branch<'a>(writer: &Schema, branches: &'a [Schema]) -> Option<(usize, &'a Schema)> {
    branches
        .iter()
        .enumerate()
        .find(|(_, b)| matches_exactly(writer, b))
        .or_else(|| branches.iter().enumerate().find(|(_, b)| promotes_to(writer, b)))
}

#[allow(clippy::cast_precision_loss)]
fn promote(datum: &Datum, reader: &Schema, path: &str) -> Option<Result<Datum, ResolutionError>> {
    let promoted = match (datum, reader) {
        (Datum::Int(i), Schema::Long) => Datum::Long(i64::from(*i)),
        (Datum::Int(i), Schema::Float) => Datum::Float(*i as f32),
        (Datum::Int(i), Schema::Double) => Datum::Double(f64::from(*i)),
        (Datum::Long(l), Schema::Float) => Datum::Float(*l as f32),
        (Datum::Long(l), Schema::Double) => Datum::Double(*l as f64),
        (Datum::Float(f), Schema::Double) => Datum::Double(f64::from(*f)),
        (Datum::String(s), Schema::Bytes) => Datum::Bytes(s.as_bytes().to_vec()),
        (Datum::Bytes(b), Schema::String) => {
            return Some(
                String::from_utf8(b.clone())
                    .map(Datum::String)
                    .map_err(|_| ResolutionError::InvalidUtf8 {
                        path: path.to_string(),
                    }),
            )
        }
        _ => return None,
    };
    Some(Ok(promoted))
}

fn resolve_at(
    writer: &Schema,
    reader: &Schema,
    datum: &Datum,
    path: &str,
) -> Result<Datum, ResolutionError> {
    if let Schema::Union(branches) = writer {
        let Datum::Union(idx, inner) = datum else {
            return Err(incompatible(writer, reader, path));
        };
        let branch = branches
            .get(*idx)
            .ok_or_else(|| incompatible(writer, reader, path))?;
        return resolve_at(branch, reader, inner, path);
    }

    if let Schema::Union(branches) = reader {
        let (idx, branch) =
            select_branch(writer, branches).ok_or_else(|| ResolutionError::NoMatchingBranch {
                path: path.to_string(),
                writer: writer.kind_name(),
            })?;
        return Ok(Datum::Union(idx, Box::new(resolve_at(writer, branch, datum, path)?)));
    }

    match (writer, reader, datum) {
        (Schema::Record(w), Schema::Record(r), Datum::Record(fields)) if same_name(writer, reader) => {
            resolve_record(w, r, fields, path)
        }
        (Schema::Enum(_), Schema::Enum(r), Datum::Enum(symbol)) if same_name(writer, reader) => {
            resolve_enum(r, symbol, path)
        }
        (Schema::Fixed(w), Schema::Fixed(r), Datum::Fixed(_))
            if same_name(writer, reader) && w.size == r.size =>
        {
            Ok(datum.clone())
        }
        (Schema::Array(w), Schema::Array(r), Datum::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| resolve_at(w, r, item, &index_path(path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::Array),
        (Schema::Map(w), Schema::Map(r), Datum::Map(entries)) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), resolve_at(w, r, v, &child_path(path, k))?)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Datum::Map),
        (
            Schema::Null | Schema::Boolean | Schema::Int | Schema::Long | Schema::Float
            | Schema::Double | Schema::Bytes | Schema::String,
            _,
            _,
        ) if writer == reader => Ok(datum.clone()),
        _ if promotes_to(writer, reader) => {
            promote(datum, reader, path).unwrap_or_else(|| Err(incompatible(writer, reader, path)))
        }
        _ => Err(incompatible(writer, reader, path)),
    }
}

fn resolve_record(
    writer: &RecordSchema,
    reader: &RecordSchema,
    fields: &IndexMap<String, Datum>,
    path: &str,
) -> Result<Datum, ResolutionError> {
    let mut resolved = IndexMap::with_capacity(reader.fields.len());
    for field in &reader.fields {
        let field_path = child_path(path, &field.name);
        let value = match (writer.field(&field.name), fields.get(&field.name)) {
            (Some(writer_field), Some(value)) => {
                resolve_at(&writer_field.schema, &field.schema, value, &field_path)?
            }
            _ => match &field.default {
                Some(default) => decode_default_at(&field.schema, default, &field_path).map_err(
                    |source| ResolutionError::InvalidDefault {
                        path: field_path.clone(),
                        source: Box::new(source),
                    },
                )?,
                None => {
                    return Err(ResolutionError::MissingField {
                        path: field_path,
                        record: reader.name.fullname(),
                    })
                }
            },
        };
        resolved.insert(field.name.clone(), value);
    }

    for dropped in writer.fields.iter().filter(|f| reader.field(&f.name).is_none()) {
        tracing::debug!(
            record = %reader.name,
            field = %dropped.name,
            path,
            "dropping writer field unknown to the reader"
        );
    }
    Ok(Datum::Record(resolved))
}

fn resolve_enum(reader: &EnumSchema, symbol: &str, path: &str) -> Result<Datum, ResolutionError> {
    if reader.symbols.iter().any(|s| s == symbol) {
        return Ok(Datum::Enum(symbol.to_string()));
    }
    match &reader.default {
        Some(default) => {
            tracing::debug!(
                name = %reader.name,
                symbol,
                default = %default,
                path,
                "enum symbol unknown to the reader, using reader default"
            );
            Ok(Datum::Enum(default.clone()))
        }
        None => Err(ResolutionError::UnknownSymbol {
            path: path.to_string(),
            symbol: symbol.to_string(),
        }),
    }
}
