//! Config Record Codec
//!
//! Storage holds each record as a JSON envelope whose two fields carry
//! base64 text:
//!
//! ```json
//! {"schema": "<base64 writer schema JSON>", "payload": "<base64 datum JSON>"}
//! ```
//!
//! Decoding yields the two UTF-8 texts; nothing here interprets them.

use crate::error::DecodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

/// Raw envelope as stored
#[derive(Debug, Default, Deserialize)]
struct ConfigEnvelope {
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    payload: Option<String>,
}

/// Writer schema and payload texts of one stored record
///
/// Lives only for the duration of a discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    writer_schema: String,
    payload: String,
}

impl ConfigRecord {
    /// Create a record from its writer schema and payload texts
    pub fn new(writer_schema: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            writer_schema: writer_schema.into(),
            payload: payload.into(),
        }
    }

    /// Decode an envelope
    ///
    /// # Errors
    /// Returns [`DecodeError`] if the envelope is not a JSON object, a field
    /// is missing, or a field is not base64-encoded UTF-8.
    pub fn from_envelope(bytes: &[u8]) -> Result<Self, DecodeError> {
        let envelope: ConfigEnvelope =
            serde_json::from_slice(bytes).map_err(DecodeError::InvalidEnvelope)?;

        let writer_schema = decode_field("schema", envelope.schema)?;
        let payload = decode_field("payload", envelope.payload)?;
        Ok(Self {
            writer_schema,
            payload,
        })
    }

    /// Encode as an envelope (standard padded base64); infallible
    #[must_use]
    pub fn to_envelope(&self) -> String {
        json!({
            "schema": STANDARD.encode(&self.writer_schema),
            "payload": STANDARD.encode(&self.payload),
        })
        .to_string()
    }

    /// Writer schema JSON text
    #[inline]
    #[must_use]
    pub fn writer_schema(&self) -> &str {
        &self.writer_schema
    }

    /// Payload datum JSON text
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

fn decode_field(field: &'static str, value: Option<String>) -> Result<String, DecodeError> {
    let encoded = value.ok_or(DecodeError::MissingField(field))?;
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|source| DecodeError::InvalidBase64 { field, source })?;
    String::from_utf8(bytes).map_err(|source| DecodeError::InvalidUtf8 { field, source })
}
