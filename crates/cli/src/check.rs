use serde::Serialize;
use std::path::Path;
use textargs::Parser;
use textargs_schema::SchemaDocument;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub schema: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub arguments: Vec<ArgumentReport>,
    pub options: Vec<OptionReport>,
    pub rest_position: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ArgumentReport {
    pub position: usize,
    pub required: bool,
    pub rest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionReport {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    pub flag: bool,
}

/// Describe a compiled schema, with option names as they will be looked up.
pub fn report<C>(path: &Path, doc: &SchemaDocument, parser: &Parser<C>) -> CheckReport {
    let arguments = parser
        .arguments()
        .iter()
        .enumerate()
        .map(|(position, spec)| ArgumentReport {
            position,
            required: spec.is_required(),
            rest: spec.is_rest(),
            name: spec.name().map(str::to_string),
        })
        .collect();

    let options = parser
        .options()
        .iter()
        .map(|option| OptionReport {
            key: option.key().to_string(),
            alt: option.alt().map(str::to_string),
            flag: option.is_flag(),
        })
        .collect();

    CheckReport {
        schema: path.display().to_string(),
        name: doc.name.clone(),
        arguments,
        options,
        rest_position: parser.rest_position(),
    }
}

impl ArgumentReport {
    pub fn describe(&self) -> String {
        let mut line = format!("#{}", self.position);
        if let Some(name) = &self.name {
            line.push_str(&format!(" {name}"));
        }
        line.push_str(if self.required { " required" } else { " optional" });
        if self.rest {
            line.push_str(" rest");
        }
        line
    }
}

impl OptionReport {
    pub fn describe(&self) -> String {
        let kind = if self.flag { "flag" } else { "option" };
        match &self.alt {
            Some(alt) => format!("{} ({alt}) {kind}", self.key),
            None => format!("{} {kind}", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_normalized_names() {
        let doc = SchemaDocument::from_json(
            r#"{
                "name": "greet",
                "specs": [
                    { "kind": "argument", "type": "string", "name": "who" },
                    { "kind": "argument", "type": "string", "required": false, "rest": true },
                    { "kind": "option", "type": "number", "key": "times!", "alt": "t" },
                    { "kind": "flag", "key": "lo ud" }
                ]
            }"#,
        )
        .unwrap();
        let parser: Parser = doc.compile().unwrap();
        let report = report(Path::new("greet.json"), &doc, &parser);

        assert_eq!(report.name, "greet");
        assert_eq!(report.rest_position, Some(1));
        assert_eq!(report.arguments[0].describe(), "#0 who required");
        assert_eq!(report.arguments[1].describe(), "#1 optional rest");
        assert_eq!(report.options[0].describe(), "times (t) option");
        assert_eq!(report.options[1].describe(), "loud flag");
    }
}
