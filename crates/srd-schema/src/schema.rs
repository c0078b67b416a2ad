//! Schema model and parser
//!
//! Parses Avro schema JSON into a [`Schema`] tree. Named types (records,
//! enums, fixed) may be referenced by name after their definition; the
//! reference is expanded in place, so recursive types are not supported.

use crate::error::SchemaError;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

/// Parsed schema
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Array(Box<Schema>),
    Map(Box<Schema>),
    Union(Vec<Schema>),
    Record(RecordSchema),
    Enum(EnumSchema),
    Fixed(FixedSchema),
}

/// Name of a record, enum or fixed type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub name: String,
    pub namespace: Option<String>,
}

impl Name {
    /// Resolve a declared name against an explicit and an enclosing namespace
    ///
    /// A dotted `name` is already a full name and ignores both namespaces.
    fn resolve(
        name: &str,
        explicit: Option<&str>,
        enclosing: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let (namespace, simple) = match name.rsplit_once('.') {
            Some((ns, simple)) => (Some(ns), simple),
            None => (explicit.or(enclosing), name),
        };
        if !is_valid_name(simple) {
            return Err(SchemaError::InvalidName(name.to_string()));
        }
        let namespace = namespace.filter(|ns| !ns.is_empty());
        if let Some(ns) = namespace {
            if !ns.split('.').all(is_valid_name) {
                return Err(SchemaError::InvalidName(ns.to_string()));
            }
        }
        Ok(Self {
            name: simple.to_string(),
            namespace: namespace.map(str::to_string),
        })
    }

    /// Namespace-qualified name
    #[must_use]
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub fields: Vec<RecordField>,
}

impl RecordSchema {
    /// Field by exact name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Record field
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub doc: Option<String>,
    pub schema: Schema,
    /// Default in Avro default-value JSON encoding
    pub default: Option<Value>,
}

/// Enum type
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: Name,
    pub symbols: Vec<String>,
    /// Symbol used by readers for writer symbols they do not know
    pub default: Option<String>,
}

/// Fixed-size byte type
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: Name,
    pub size: usize,
}

impl Schema {
    /// Parse schema JSON text
    ///
    /// # Errors
    /// Returns [`SchemaError`] if the text is not JSON or not a valid schema.
    pub fn parse_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text).map_err(SchemaError::InvalidJson)?;
        Self::parse_value(&value)
    }

    /// Parse an already-decoded schema JSON value
    pub fn parse_value(value: &Value) -> Result<Self, SchemaError> {
        Parser::default().parse(value, None)
    }

    /// Short description used in error messages
    #[must_use]
    pub fn kind_name(&self) -> String {
        match self {
            Self::Record(r) => format!("record {}", r.name),
            Self::Enum(e) => format!("enum {}", e.name),
            Self::Fixed(f) => format!("fixed {}", f.name),
            Self::Union(branches) => {
                let names: Vec<_> = branches.iter().map(Schema::branch_name).collect();
                format!("union [{}]", names.join(", "))
            }
            other => other.branch_name(),
        }
    }

    /// Name identifying this schema as a union branch in JSON encoding
    #[must_use]
    pub fn branch_name(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Boolean => "boolean".into(),
            Self::Int => "int".into(),
            Self::Long => "long".into(),
            Self::Float => "float".into(),
            Self::Double => "double".into(),
            Self::Bytes => "bytes".into(),
            Self::String => "string".into(),
            Self::Array(_) => "array".into(),
            Self::Map(_) => "map".into(),
            Self::Union(_) => "union".into(),
            Self::Record(r) => r.name.fullname(),
            Self::Enum(e) => e.name.fullname(),
            Self::Fixed(f) => f.name.fullname(),
        }
    }

    /// Name of a named type, `None` for anonymous types
    #[must_use]
    pub fn name(&self) -> Option<&Name> {
        match self {
            Self::Record(r) => Some(&r.name),
            Self::Enum(e) => Some(&e.name),
            Self::Fixed(f) => Some(&f.name),
            _ => None,
        }
    }

    /// Whether this is the `null` type
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

fn primitive(name: &str) -> Option<Schema> {
    Some(match name {
        "null" => Schema::Null,
        "boolean" => Schema::Boolean,
        "int" => Schema::Int,
        "long" => Schema::Long,
        "float" => Schema::Float,
        "double" => Schema::Double,
        "bytes" => Schema::Bytes,
        "string" => Schema::String,
        _ => return None,
    })
}

/// Parser state: named types defined so far, keyed by full name
#[derive(Default)]
struct Parser {
    names: HashMap<String, Schema>,
}

impl Parser {
    fn parse(&mut self, value: &Value, namespace: Option<&str>) -> Result<Schema, SchemaError> {
        match value {
            Value::String(name) => self.parse_reference(name, namespace),
            Value::Array(branches) => self.parse_union(branches, namespace),
            Value::Object(map) => self.parse_complex(map, namespace),
            other => Err(SchemaError::NotASchema(other.to_string())),
        }
    }

    fn parse_reference(&self, name: &str, namespace: Option<&str>) -> Result<Schema, SchemaError> {
        if let Some(schema) = primitive(name) {
            return Ok(schema);
        }
        let qualified = match namespace {
            Some(ns) if !name.contains('.') => Some(format!("{ns}.{name}")),
            _ => None,
        };
        qualified
            .as_deref()
            .and_then(|q| self.names.get(q))
            .or_else(|| self.names.get(name))
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    fn parse_union(
        &mut self,
        branches: &[Value],
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaError> {
        let mut seen = HashSet::new();
        let mut parsed = Vec::with_capacity(branches.len());
        for branch in branches {
            let schema = self.parse(branch, namespace)?;
            if matches!(schema, Schema::Union(_)) {
                return Err(SchemaError::InvalidUnion(
                    "unions may not immediately contain other unions".into(),
                ));
            }
            if !seen.insert(schema.branch_name()) {
                return Err(SchemaError::InvalidUnion(format!(
                    "duplicate branch '{}'",
                    schema.branch_name()
                )));
            }
            parsed.push(schema);
        }
        Ok(Schema::Union(parsed))
    }

    fn parse_complex(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaError> {
        let type_value = map
            .get("type")
            .ok_or_else(|| SchemaError::missing("type", Value::Object(map.clone()).to_string()))?;

        let Value::String(type_name) = type_value else {
            // {"type": {...}} or {"type": [...]}
            return self.parse(type_value, namespace);
        };

        match type_name.as_str() {
            "record" | "error" => self.parse_record(map, namespace),
            "enum" => self.parse_enum(map, namespace),
            "fixed" => self.parse_fixed(map, namespace),
            "array" => {
                let items = map.get("items").ok_or_else(|| SchemaError::missing("items", "array"))?;
                Ok(Schema::Array(Box::new(self.parse(items, namespace)?)))
            }
            "map" => {
                let values = map.get("values").ok_or_else(|| SchemaError::missing("values", "map"))?;
                Ok(Schema::Map(Box::new(self.parse(values, namespace)?)))
            }
            // Primitive or reference in object form, possibly with a logicalType
            other => self.parse_reference(other, namespace),
        }
    }

    fn declared_name(
        map: &Map<String, Value>,
        namespace: Option<&str>,
        kind: &'static str,
    ) -> Result<Name, SchemaError> {
        let name = map
            .get("name")
            .ok_or_else(|| SchemaError::missing("name", kind))?
            .as_str()
            .ok_or_else(|| SchemaError::invalid("name", kind, "must be a string"))?;
        let explicit = match map.get("namespace") {
            None | Some(Value::Null) => None,
            Some(Value::String(ns)) => Some(ns.as_str()),
            Some(_) => return Err(SchemaError::invalid("namespace", name, "must be a string")),
        };
        Name::resolve(name, explicit, namespace)
    }

    fn register(&mut self, schema: &Schema) -> Result<(), SchemaError> {
        if let Some(name) = schema.name() {
            let fullname = name.fullname();
            if self.names.contains_key(&fullname) {
                return Err(SchemaError::DuplicateName(fullname));
            }
            self.names.insert(fullname, schema.clone());
        }
        Ok(())
    }

    fn parse_record(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaError> {
        let name = Self::declared_name(map, namespace, "record")?;
        let fullname = name.fullname();
        if self.names.contains_key(&fullname) {
            return Err(SchemaError::DuplicateName(fullname));
        }

        let fields_value = map
            .get("fields")
            .ok_or_else(|| SchemaError::missing("fields", fullname.clone()))?
            .as_array()
            .ok_or_else(|| SchemaError::invalid("fields", fullname.clone(), "must be an array"))?;

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(fields_value.len());
        for field_value in fields_value {
            let field_map = field_value
                .as_object()
                .ok_or_else(|| SchemaError::invalid("fields", fullname.clone(), "field must be an object"))?;
            let field_name = field_map
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| SchemaError::missing("name", format!("field of {fullname}")))?;
            if !is_valid_name(field_name) {
                return Err(SchemaError::InvalidName(field_name.to_string()));
            }
            if !seen.insert(field_name.to_string()) {
                return Err(SchemaError::DuplicateField {
                    record: fullname.clone(),
                    field: field_name.to_string(),
                });
            }
            let type_value = field_map
                .get("type")
                .ok_or_else(|| SchemaError::missing("type", format!("{fullname}.{field_name}")))?;
            let schema = self.parse(type_value, name.namespace.as_deref())?;

            fields.push(RecordField {
                name: field_name.to_string(),
                doc: doc_of(field_map),
                schema,
                default: field_map.get("default").cloned(),
            });
        }

        let schema = Schema::Record(RecordSchema {
            name,
            doc: doc_of(map),
            fields,
        });
        self.register(&schema)?;
        Ok(schema)
    }

    fn parse_enum(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaError> {
        let name = Self::declared_name(map, namespace, "enum")?;
        let fullname = name.fullname();
        let symbols_value = map
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::missing("symbols", fullname.clone()))?;

        let mut symbols = Vec::with_capacity(symbols_value.len());
        for symbol in symbols_value {
            let symbol = symbol
                .as_str()
                .ok_or_else(|| SchemaError::invalid("symbols", fullname.clone(), "symbols must be strings"))?;
            if !is_valid_name(symbol) {
                return Err(SchemaError::InvalidName(symbol.to_string()));
            }
            if symbols.iter().any(|s| s == symbol) {
                return Err(SchemaError::DuplicateSymbol {
                    name: fullname,
                    symbol: symbol.to_string(),
                });
            }
            symbols.push(symbol.to_string());
        }

        let default = match map.get("default") {
            None | Some(Value::Null) => None,
            Some(Value::String(d)) if symbols.contains(d) => Some(d.clone()),
            Some(other) => {
                return Err(SchemaError::invalid(
                    "default",
                    fullname,
                    format!("{other} is not a declared symbol"),
                ))
            }
        };

        let schema = Schema::Enum(EnumSchema {
            name,
            symbols,
            default,
        });
        self.register(&schema)?;
        Ok(schema)
    }

    fn parse_fixed(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaError> {
        let name = Self::declared_name(map, namespace, "fixed")?;
        let size = map
            .get("size")
            .and_then(Value::as_u64)
            .and_then(|s| usize::try_from(s).ok())
            .ok_or_else(|| SchemaError::missing("size", name.fullname()))?;

        let schema = Schema::Fixed(FixedSchema { name, size });
        self.register(&schema)?;
        Ok(schema)
    }
}

fn doc_of(map: &Map<String, Value>) -> Option<String> {
    map.get("doc").and_then(Value::as_str).map(str::to_string)
}
