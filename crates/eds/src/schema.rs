//! Loading the element type schema.
//!
//! A schema table is compiled into the crate; configuration may replace it
//! with an external YAML file of the same shape.

use std::{fs, path::Path};

use log::{debug, info};

use eds_core::schema::Schema;

use crate::error::EdsError;

/// The bundled schema document.
pub const BUNDLED_SCHEMA: &str = include_str!("../schema/schema.yaml");

/// Parses the bundled schema.
pub fn bundled() -> Result<Schema, EdsError> {
    debug!("Using bundled schema");
    parse(BUNDLED_SCHEMA)
}

/// Reads and parses a schema file.
pub fn load(path: &Path) -> Result<Schema, EdsError> {
    info!(path:? = path; "Loading schema file");
    let text = fs::read_to_string(path).map_err(|err| {
        EdsError::Schema(format!("cannot read schema `{}`: {err}", path.display()))
    })?;
    parse(&text).map_err(|err| match err {
        EdsError::Schema(message) => EdsError::Schema(format!("{}: {message}", path.display())),
        other => other,
    })
}

/// Parses a schema document.
pub fn parse(text: &str) -> Result<Schema, EdsError> {
    let schema: Schema =
        serde_yaml::from_str(text).map_err(|err| EdsError::Schema(err.to_string()))?;
    debug!(
        version = schema.version(),
        types = schema.known_type_names().count();
        "Schema parsed"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use eds_core::AttrValue;

    use super::*;

    #[test]
    fn test_bundled_schema_parses() {
        let schema = bundled().unwrap();

        assert_eq!(schema.version(), "1.0.0");
        assert!(schema.is_known("Kring"));
        assert_eq!(schema.default_of("Kring", "naam"), Some(&AttrValue::text("")));
        assert_eq!(
            schema.default_of("Contactdoos", "aantal"),
            Some(&AttrValue::text("1"))
        );
        assert_eq!(
            schema.default_of("Contactdoos", "is_geaard"),
            Some(&AttrValue::Bool(true))
        );
    }

    #[test]
    fn test_type_names_with_spaces() {
        let schema = bundled().unwrap();
        assert!(schema.is_known("Vrije tekst"));
        assert!(schema.is_known("Warmtepomp/airco"));
    }

    #[test]
    fn test_parse_error_is_schema_error() {
        let err = parse("types: [1, 2]").unwrap_err();
        assert!(matches!(err, EdsError::Schema(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/schema.yaml")).unwrap_err();
        assert!(err.to_string().contains("cannot read schema"));
    }
}
