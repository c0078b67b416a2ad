//! Schema-Evolving Record Decoding
//!
//! Avro-style schemas for JSON-encoded records, and resolution of a payload
//! written with one schema version against the schema a reader expects.
//!
//! # Core Types
//!
//! - [`Schema`]: Parsed schema tree
//! - [`Datum`]: Value shaped by a schema
//! - [`RecordDecoder`]: Decodes `(writer schema, payload)` pairs into the reader shape
//!
//! # Example
//!
//! ```
//! use srd_schema::RecordDecoder;
//!
//! let decoder = RecordDecoder::from_schema_text(
//!     r#"{"type": "record", "name": "R", "fields": [
//!         {"name": "a", "type": "long"},
//!         {"name": "b", "type": "string", "default": "none"}
//!     ]}"#,
//! ).unwrap();
//!
//! let writer = r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int"}]}"#;
//! let datum = decoder.decode(writer, r#"{"a": 1}"#).unwrap();
//! assert_eq!(datum.field("b").and_then(|d| d.as_str()), Some("none"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod datum;
mod decoder;
mod error;
mod json;
mod resolve;
mod schema;

pub use datum::Datum;
pub use decoder::RecordDecoder;
pub use error::{DecoderError, DecoderResult, PayloadError, ResolutionError, SchemaError};
pub use json::{decode_default, decode_json, decode_json_str, encode_json};
pub use resolve::resolve;
pub use schema::{EnumSchema, FixedSchema, Name, RecordField, RecordSchema, Schema};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
