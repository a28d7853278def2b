//! Declarative schema documents for textargs.
//!
//! A document lists specs in declaration order and is compiled into a
//! [`textargs::Parser`] using the converters from [`textargs::simple`]:
//!
//! ```json
//! {
//!   "name": "remind",
//!   "specs": [
//!     { "kind": "argument", "type": "number" },
//!     { "kind": "argument", "type": "string", "rest": true, "name": "message" },
//!     { "kind": "flag", "key": "silent", "alt": "s" },
//!     { "kind": "option", "type": "string", "key": "channel", "alt": "c" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use textargs::{ArgumentSpec, OptionSpec, Parser, SchemaError, Spec, simple};

/// Environment variable naming the default schema document.
pub const SCHEMA_ENV: &str = "TEXTARGS_SCHEMA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Number,
    Boolean,
    String,
}

fn default_required() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SpecDef {
    Argument {
        #[serde(rename = "type")]
        value_type: ValueType,
        #[serde(default = "default_required", skip_serializing_if = "is_true")]
        required: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        rest: bool,
    },
    Option {
        #[serde(rename = "type")]
        value_type: ValueType,
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Flag {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
}

impl SpecDef {
    /// Build the spec with the matching [`textargs::simple`] converter.
    pub fn to_spec<C>(&self) -> Spec<C> {
        match self {
            Self::Argument {
                value_type,
                required,
                name,
                rest,
            } => {
                let mut spec: ArgumentSpec<C> = match value_type {
                    ValueType::Number => simple::number(),
                    ValueType::Boolean => simple::boolean(),
                    ValueType::String => simple::string(),
                }
                .required(*required);
                if let Some(name) = name {
                    spec = spec.named(name.clone());
                }
                if *rest {
                    spec = spec.rest();
                }
                spec.into()
            }
            Self::Option {
                value_type,
                key,
                alt,
            } => {
                let mut spec: OptionSpec<C> = match value_type {
                    ValueType::Number => simple::number_option(key.clone()),
                    ValueType::Boolean => simple::boolean_option(key.clone()),
                    ValueType::String => simple::string_option(key.clone()),
                };
                if let Some(alt) = alt {
                    spec = spec.alt(alt.clone());
                }
                spec.into()
            }
            Self::Flag { key, alt } => {
                let mut spec = simple::flag(key.clone());
                if let Some(alt) = alt {
                    spec = spec.alt(alt.clone());
                }
                spec.into()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub specs: Vec<SpecDef>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read schema {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid schema")]
    Schema(#[from] SchemaError),
}

impl SchemaDocument {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded schema document");
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compile the document into a parser.
    pub fn compile<C>(&self) -> Result<Parser<C>, DocumentError> {
        let specs = self.specs.iter().map(SpecDef::to_spec).collect();
        Ok(Parser::new(specs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textargs::{OMITTED, Slot, Value};

    const REMIND: &str = r#"{
        "name": "remind",
        "specs": [
            { "kind": "argument", "type": "number" },
            { "kind": "argument", "type": "string", "rest": true, "name": "message" },
            { "kind": "flag", "key": "silent", "alt": "s" },
            { "kind": "option", "type": "string", "key": "channel", "alt": "c" }
        ]
    }"#;

    #[test]
    fn parses_document_with_defaults() {
        let doc = SchemaDocument::from_json(REMIND).unwrap();
        assert_eq!(doc.name, "remind");
        assert_eq!(doc.specs.len(), 4);
        assert_eq!(
            doc.specs[0],
            SpecDef::Argument {
                value_type: ValueType::Number,
                required: true,
                name: None,
                rest: false,
            }
        );
    }

    #[test]
    fn serializes_without_default_fields() {
        let doc = SchemaDocument::from_json(REMIND).unwrap();
        let json = doc.to_json_pretty().unwrap();
        assert!(!json.contains("\"required\""));
        assert!(json.contains("\"rest\": true"));
        assert_eq!(SchemaDocument::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = SchemaDocument::from_json(r#"{ "specs": [{ "kind": "switch", "key": "x" }] }"#)
            .unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn compile_reports_schema_errors() {
        let doc = SchemaDocument::from_json(
            r#"{ "specs": [
                { "kind": "argument", "type": "string", "required": false },
                { "kind": "argument", "type": "string" }
            ] }"#,
        )
        .unwrap();
        let err = doc.compile::<()>().unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Schema(SchemaError::RequiredAfterOptional(1))
        ));
    }

    #[tokio::test]
    async fn compiled_document_parses_text() {
        let parser: Parser = SchemaDocument::from_json(REMIND).unwrap().compile().unwrap();

        let m = parser.parse("10 stretch your legs -c=general").await.unwrap();
        assert_eq!(m.arguments().get(0), Some(&Slot::from(Value::from(10.0))));
        assert_eq!(
            m.arguments().named("message").and_then(Slot::as_str),
            Some("stretch your legs")
        );
        assert_eq!(m.option("channel").and_then(Slot::as_str), Some("general"));
        assert!(!m.flag("silent"));

        let m = parser.parse("5 water the plants -s").await.unwrap();
        assert_eq!(m.option("c"), Some(&OMITTED));
        assert!(m.flag("s"));
    }
}
