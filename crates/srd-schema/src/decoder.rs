//! Schema-evolving record decoder
//!
//! A [`RecordDecoder`] holds one reader schema and decodes payloads written
//! with any compatible writer schema. The writer schema travels with each
//! payload, so records written before or after a schema change decode into
//! the same reader shape.

use crate::datum::Datum;
use crate::error::{DecoderError, DecoderResult};
use crate::json::decode_json_str;
use crate::resolve::resolve;
use crate::schema::Schema;
use serde::de::DeserializeOwned;

/// Decoder bound to a reader schema
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    reader: Schema,
}

impl RecordDecoder {
    /// Create a decoder for `reader`
    #[must_use]
    pub fn new(reader: Schema) -> Self {
        Self { reader }
    }

    /// Create a decoder from reader schema text
    ///
    /// # Errors
    /// Returns [`SchemaError`](crate::SchemaError) if the text is not a valid schema.
    pub fn from_schema_text(text: &str) -> Result<Self, crate::SchemaError> {
        Schema::parse_str(text).map(Self::new)
    }

    /// Reader schema
    #[inline]
    #[must_use]
    pub fn reader(&self) -> &Schema {
        &self.reader
    }

    /// Decode a payload using its writer schema text
    ///
    /// # Errors
    /// Returns [`DecoderError`] if the writer schema does not parse, the
    /// payload does not match it, or the writer cannot be resolved against
    /// the reader.
    pub fn decode(&self, writer_schema: &str, payload: &str) -> DecoderResult<Datum> {
        let writer = Schema::parse_str(writer_schema)?;
        self.decode_with(&writer, payload)
    }

    /// Decode a payload using an already parsed writer schema
    pub fn decode_with(&self, writer: &Schema, payload: &str) -> DecoderResult<Datum> {
        let written = decode_json_str(writer, payload)?;
        let datum = resolve(writer, &self.reader, &written)?;
        tracing::trace!(writer = %writer.kind_name(), "resolved payload against reader schema");
        Ok(datum)
    }

    /// Decode a payload and deserialize the resolved record into `T`
    ///
    /// `T` sees the plain JSON view of the record: unions flattened, enums as
    /// their symbol.
    pub fn decode_into<T: DeserializeOwned>(
        &self,
        writer_schema: &str,
        payload: &str,
    ) -> DecoderResult<T> {
        let datum = self.decode(writer_schema, payload)?;
        serde_json::from_value(datum.to_plain_json()).map_err(DecoderError::Model)
    }
}
