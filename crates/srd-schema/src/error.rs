//! Error types for schema handling
//!
//! Provides error handling for:
//! - Schema parsing (schema text → [`Schema`](crate::Schema))
//! - Payload decoding (JSON datum → [`Datum`](crate::Datum)) against the writer schema
//! - Schema resolution (writer-shaped datum → reader-shaped datum)

/// Errors while parsing schema text
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema text is not JSON
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Required attribute absent from a complex type
    #[error("{context}: missing attribute '{attribute}'")]
    MissingAttribute {
        attribute: &'static str,
        context: String,
    },

    /// Attribute present with the wrong shape
    #[error("{context}: invalid attribute '{attribute}': {reason}")]
    InvalidAttribute {
        attribute: &'static str,
        context: String,
        reason: String,
    },

    /// Reference to a type that is neither primitive nor previously defined
    #[error("unknown type: '{0}'")]
    UnknownType(String),

    /// Name does not follow `[A-Za-z_][A-Za-z0-9_]*`
    #[error("invalid name: '{0}'")]
    InvalidName(String),

    /// Named type defined twice
    #[error("type '{0}' is already defined")]
    DuplicateName(String),

    /// Record declares the same field twice
    #[error("record '{record}' declares field '{field}' more than once")]
    DuplicateField { record: String, field: String },

    /// Enum declares the same symbol twice
    #[error("enum '{name}' declares symbol '{symbol}' more than once")]
    DuplicateSymbol { name: String, symbol: String },

    /// Union nests a union or repeats a branch
    #[error("invalid union: {0}")]
    InvalidUnion(String),

    /// JSON value that cannot denote a schema
    #[error("not a schema: {0}")]
    NotASchema(String),
}

impl SchemaError {
    /// Create missing-attribute error
    pub fn missing(attribute: &'static str, context: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute,
            context: context.into(),
        }
    }

    /// Create invalid-attribute error
    pub fn invalid(
        attribute: &'static str,
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            attribute,
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Errors while decoding or encoding a datum against its own schema
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// Payload text is not JSON
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Value has the wrong JSON shape for its schema
    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// Record field absent and without a default
    #[error("{path}: missing field '{field}' with no default")]
    MissingField { path: String, field: String },

    /// Number does not fit the declared numeric type
    #[error("{path}: value {value} out of range for {expected}")]
    OutOfRange {
        path: String,
        expected: &'static str,
        value: String,
    },

    /// Enum symbol not declared by the schema
    #[error("{path}: '{symbol}' is not a symbol of enum '{name}'")]
    UnknownSymbol {
        path: String,
        name: String,
        symbol: String,
    },

    /// Union value names no branch of the union
    #[error("{path}: '{branch}' is not a branch of the union")]
    UnknownBranch { path: String, branch: String },

    /// Byte string contains characters above U+00FF
    #[error("{path}: byte string contains characters outside ISO-8859-1")]
    InvalidBytes { path: String },

    /// Fixed value of the wrong length
    #[error("{path}: fixed '{name}' expects {expected} bytes, found {found}")]
    FixedSize {
        path: String,
        name: String,
        expected: usize,
        found: usize,
    },

    /// NaN or infinity cannot be represented in JSON
    #[error("{path}: non-finite floating point value")]
    NonFinite { path: String },
}

/// Errors while resolving a writer-shaped datum against the reader schema
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Reader field absent from the writer and without a default
    #[error("{path}: field required by reader record '{record}' has no writer value and no default")]
    MissingField { path: String, record: String },

    /// Writer and reader types cannot be reconciled
    #[error("{path}: writer type '{writer}' is incompatible with reader type '{reader}'")]
    Incompatible {
        path: String,
        writer: String,
        reader: String,
    },

    /// No reader union branch accepts the writer's type
    #[error("{path}: no reader union branch accepts writer type '{writer}'")]
    NoMatchingBranch { path: String, writer: String },

    /// Enum symbol unknown to the reader, which declares no default
    #[error("{path}: enum symbol '{symbol}' is unknown to the reader")]
    UnknownSymbol { path: String, symbol: String },

    /// Reader default does not conform to the reader field schema
    #[error("{path}: invalid reader default: {source}")]
    InvalidDefault {
        path: String,
        #[source]
        source: Box<PayloadError>,
    },

    /// Bytes promoted to string are not UTF-8
    #[error("{path}: bytes are not valid UTF-8")]
    InvalidUtf8 { path: String },
}

impl ResolutionError {
    /// Dotted path where resolution failed
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path, .. }
            | Self::Incompatible { path, .. }
            | Self::NoMatchingBranch { path, .. }
            | Self::UnknownSymbol { path, .. }
            | Self::InvalidDefault { path, .. }
            | Self::InvalidUtf8 { path } => path,
        }
    }
}

/// Combined error for [`RecordDecoder`](crate::RecordDecoder)
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("writer schema: {0}")]
    WriterSchema(#[from] SchemaError),

    #[error("payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("schema resolution: {0}")]
    Resolution(#[from] ResolutionError),

    /// Resolved datum does not deserialize into the requested model
    #[error("resolved record does not fit model: {0}")]
    Model(#[source] serde_json::Error),
}

/// Result type alias for decoder operations
pub type DecoderResult<T> = Result<T, DecoderError>;

/// Root of every datum path
pub(crate) const ROOT_PATH: &str = "$";

/// Path of a record field or map entry below `path`
pub(crate) fn child_path(path: &str, name: &str) -> String {
    format!("{path}.{name}")
}

/// Path of an array element below `path`
pub(crate) fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}
