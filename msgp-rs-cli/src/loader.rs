//! Schema document loading.
//!
//! Parses every scanned file and merges the documents into one, so that a
//! type in one file may delegate to a type declared in another.

use msgp_rs_gen::SchemaDocument;

use crate::error::{CliResult, SchemaError};
use crate::scanner::SchemaFile;

/// Parse and merge schema files.
///
/// Every file is parsed before any error is returned, so a single run
/// reports all invalid documents at once.
pub fn load_documents(files: &[SchemaFile]) -> CliResult<SchemaDocument> {
    let mut merged = SchemaDocument::default();
    let mut errors = Vec::new();

    for file in files {
        match SchemaDocument::from_json(&file.content) {
            Ok(doc) => {
                tracing::debug!(
                    file = %file.relative_path.display(),
                    types = doc.types.len(),
                    "parsed schema"
                );
                merged.merge(doc);
            }
            Err(err) => {
                tracing::warn!(file = %file.relative_path.display(), error = %err, "invalid schema");
                errors.push(SchemaError::invalid(file.path.clone(), err));
            }
        }
    }

    match errors.len() {
        0 => Ok(merged),
        1 => Err(errors.remove(0).into()),
        _ => Err(SchemaError::Multiple(errors).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use msgp_rs_gen::KeyCase;
    use std::path::PathBuf;

    fn file(name: &str, content: &str) -> SchemaFile {
        SchemaFile {
            path: PathBuf::from(name),
            relative_path: PathBuf::from(name),
            content: content.to_string(),
        }
    }

    const POINT: &str = r#"{"types": [{"name": "Point", "shape": {"type": "struct", "fields": [
        {"name": "x", "shape": {"type": "base", "kind": "f64"}}
    ]}}]}"#;

    const LINE: &str = r#"{"rename_all": "camelCase", "types": [{"name": "Line", "shape": {"type": "struct", "fields": [
        {"name": "start_point", "shape": {"type": "base", "kind": {"ident": "Point"}}}
    ]}}]}"#;

    #[test]
    fn test_load_merges_in_order() {
        let doc = load_documents(&[file("point.json", POINT), file("line.json", LINE)]).unwrap();
        let names: Vec<_> = doc.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Point", "Line"]);
    }

    #[test]
    fn test_load_keeps_document_key_rule() {
        let doc = load_documents(&[file("point.json", POINT), file("line.json", LINE)]).unwrap();
        let line = &doc.types[1];
        let msgp_rs_gen::Shape::Struct(st) = &line.shape else {
            panic!("expected struct");
        };
        assert_eq!(st.fields[0].wire_key(KeyCase::Verbatim), "startPoint");
        assert_eq!(doc.rename_all, None);
    }

    #[test]
    fn test_load_single_error() {
        let result = load_documents(&[file("point.json", POINT), file("bad.json", "{")]);
        assert!(matches!(
            result,
            Err(CliError::Schema(SchemaError::Invalid { file, .. })) if file == PathBuf::from("bad.json")
        ));
    }

    #[test]
    fn test_load_collects_all_errors() {
        let result = load_documents(&[file("a.json", "{"), file("b.json", r#"{"types": 1}"#)]);
        match result {
            Err(CliError::Schema(SchemaError::Multiple(errors))) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {:?}", other),
        }
    }
}
