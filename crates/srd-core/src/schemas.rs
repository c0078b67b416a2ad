//! Reader schemas of the running build
//!
//! The reader schemas are the latest this build knows for its major version.
//! They are compiled into the binary and parsed once on first use.

use once_cell::sync::OnceCell;
use srd_schema::{RecordDecoder, SchemaError};

/// Schema generation of the records this build reads
pub const MAJOR_VERSION: u32 = 0;

/// Reader schema text for Environment records
pub const ENVIRONMENT_SCHEMA: &str = include_str!("../schemas/v0/environment.avsc");

/// Reader schema text for Landing Zone records
pub const LANDING_ZONE_SCHEMA: &str = include_str!("../schemas/v0/landing_zone.avsc");

/// Storage path segment of the major version, e.g. `v0`
#[must_use]
pub fn version_prefix() -> String {
    format!("v{MAJOR_VERSION}")
}

static ENVIRONMENT: OnceCell<RecordDecoder> = OnceCell::new();
static LANDING_ZONE: OnceCell<RecordDecoder> = OnceCell::new();

/// Decoders for the two record kinds
#[derive(Debug, Clone, Copy)]
pub struct ReaderSchemas {
    environment: &'static RecordDecoder,
    landing_zone: &'static RecordDecoder,
}

impl ReaderSchemas {
    /// Load the compiled-in reader schemas
    ///
    /// # Errors
    /// Returns [`SchemaError`] if a compiled-in schema does not parse.
    pub fn load() -> Result<Self, SchemaError> {
        let environment =
            ENVIRONMENT.get_or_try_init(|| RecordDecoder::from_schema_text(ENVIRONMENT_SCHEMA))?;
        let landing_zone =
            LANDING_ZONE.get_or_try_init(|| RecordDecoder::from_schema_text(LANDING_ZONE_SCHEMA))?;
        Ok(Self {
            environment,
            landing_zone,
        })
    }

    /// Decoder for Environment records
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &'static RecordDecoder {
        self.environment
    }

    /// Decoder for Landing Zone records
    #[inline]
    #[must_use]
    pub fn landing_zone(&self) -> &'static RecordDecoder {
        self.landing_zone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srd_schema::Schema;

    #[test]
    fn compiled_schemas_parse() {
        let schemas = ReaderSchemas::load().unwrap();
        let Schema::Record(env) = schemas.environment().reader() else {
            panic!("environment schema is not a record");
        };
        assert_eq!(env.name.name, "EnvironmentModel");
        assert!(env.field("metadata").is_some());

        let Schema::Record(lz) = schemas.landing_zone().reader() else {
            panic!("landing zone schema is not a record");
        };
        assert!(lz.field("notebookLifecycleConfigurationNames").is_some());
    }

    #[test]
    fn prefix_names_major_version() {
        assert_eq!(version_prefix(), "v0");
    }
}
