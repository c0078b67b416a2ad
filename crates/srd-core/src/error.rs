//! Error types for Support Resource discovery
//!
//! Provides error handling for:
//! - Envelope decoding (storage bytes → [`ConfigRecord`](crate::ConfigRecord))
//! - Storage access (filesystem and object store)
//! - Assembly of decoded records into the domain model
//!
//! Every failure is fatal to the discovery call that raised it;
//! [`DiscoveryError`] is the root of the taxonomy.

use srd_model::{RegionId, ValidationError};
use srd_schema::{DecoderError, PayloadError, ResolutionError, SchemaError};
use std::path::PathBuf;

/// Errors decoding a storage envelope or its payload
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Envelope is not a JSON object
    #[error("envelope is not a JSON object: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    /// Envelope lacks `schema` or `payload`
    #[error("envelope is missing field '{0}'")]
    MissingField(&'static str),

    /// Envelope field is not valid base64
    #[error("envelope field '{field}' is not valid base64: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// Envelope field decodes to bytes that are not UTF-8
    #[error("envelope field '{field}' is not UTF-8 text: {source}")]
    InvalidUtf8 {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Writer schema text does not parse
    #[error("malformed writer schema: {0}")]
    WriterSchema(#[from] SchemaError),

    /// Compiled-in reader schema does not parse
    #[error("malformed reader schema: {0}")]
    ReaderSchema(#[source] SchemaError),

    /// Payload does not conform to its own writer schema
    #[error("payload does not match writer schema: {0}")]
    Payload(#[from] PayloadError),

    /// Reader-shaped record does not fit the record model
    #[error("decoded record does not fit model: {0}")]
    Model(#[source] serde_json::Error),
}

/// Required storage container or object does not exist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    /// Filesystem root is missing or not a directory
    #[error("root directory not found: {}", .0.display())]
    RootDirectory(PathBuf),

    /// Object-store bucket does not exist
    #[error("bucket not found: '{0}'")]
    Bucket(String),

    /// Environment record is absent under the root
    #[error("environment config not found at '{0}'")]
    EnvironmentConfig(String),
}

/// Storage I/O failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem I/O error
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Object-store request failed
    #[error("object store error on bucket '{bucket}': {message}")]
    Backend { bucket: String, message: String },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create object-store error for bucket
    pub fn backend(bucket: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            bucket: bucket.into(),
            message: message.into(),
        }
    }
}

/// Errors loading [`DiscoveryConfig`](crate::DiscoveryConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for the expected shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Source settings are inconsistent
    #[error("invalid source: {0}")]
    InvalidSource(String),
}

/// Root of the discovery error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Malformed envelope, schema or payload
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Writer schema cannot be resolved against the reader schema
    #[error("schema resolution error: {0}")]
    SchemaResolution(#[from] ResolutionError),

    /// Root container or environment record missing
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Lifecycle configuration ARN and name lists differ in length
    #[error(
        "landing zone {region}: {arns} lifecycle configuration ARNs but {names} names"
    )]
    CountMismatch {
        region: RegionId,
        arns: usize,
        names: usize,
    },

    /// Required metadata missing or region unrecognized
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// ARN or UUID text does not parse
    #[error("invalid identifier at {field}: '{value}': {reason}")]
    Identifier {
        field: String,
        value: String,
        reason: String,
    },

    /// Storage I/O failure
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Storage key pattern does not compile
    #[error("invalid storage layout: {0}")]
    Layout(#[from] regex::Error),
}

impl DiscoveryError {
    /// Create identifier error
    pub fn identifier(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::Identifier {
            field: field.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is a [`NotFoundError`]
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this is a [`DecodeError`]
    #[inline]
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Whether this is a schema resolution failure
    #[inline]
    #[must_use]
    pub fn is_schema_resolution(&self) -> bool {
        matches!(self, Self::SchemaResolution(_))
    }

    /// Whether this is a lifecycle count mismatch
    #[inline]
    #[must_use]
    pub fn is_count_mismatch(&self) -> bool {
        matches!(self, Self::CountMismatch { .. })
    }

    /// Whether this is a validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<DecoderError> for DiscoveryError {
    fn from(err: DecoderError) -> Self {
        match err {
            DecoderError::WriterSchema(e) => Self::Decode(DecodeError::WriterSchema(e)),
            DecoderError::Payload(e) => Self::Decode(DecodeError::Payload(e)),
            DecoderError::Model(e) => Self::Decode(DecodeError::Model(e)),
            DecoderError::Resolution(e) => Self::SchemaResolution(e),
        }
    }
}

/// Result type alias for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_errors_map_to_taxonomy() {
        let err: DiscoveryError = DecoderError::Resolution(ResolutionError::MissingField {
            path: "$.metadata.region".into(),
            record: "bio.terra.aws.resource.discovery.avro.LandingZoneMetadataModel".into(),
        })
        .into();
        assert!(err.is_schema_resolution());

        let err: DiscoveryError = DecoderError::WriterSchema(SchemaError::UnknownType("X".into())).into();
        assert!(err.is_decode());
    }

    #[test]
    fn count_mismatch_display() {
        let err = DiscoveryError::CountMismatch {
            region: RegionId::US_EAST_1,
            arns: 2,
            names: 1,
        };
        assert!(err.is_count_mismatch());
        assert_eq!(
            err.to_string(),
            "landing zone us-east-1: 2 lifecycle configuration ARNs but 1 names"
        );
    }

    #[test]
    fn not_found_is_transparent() {
        let err: DiscoveryError = NotFoundError::Bucket("env-config".into()).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "bucket not found: 'env-config'");
    }
}
