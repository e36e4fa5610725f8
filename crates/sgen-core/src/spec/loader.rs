use std::fs;
use std::path::Path;

use serde_json::Value;

use super::document::Document;
use crate::error::ParseError;
use crate::parse;

/// Read a spec document from disk.
///
/// `.yaml` / `.yml` files are decoded as YAML; everything else is JSON.
pub fn load(path: impl AsRef<Path>) -> Result<Document, ParseError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let location = path.display().to_string();
    log::debug!("loading spec {location}");
    let tree =
        decode(&content, is_yaml_path(&location)).map_err(|e| e.in_file(location.as_str()))?;
    let document = Document::from_value(tree, "")
        .map_err(|e| e.in_file(location.as_str()))?
        .with_path(path);

    log::info!(
        "loaded {} ({} path(s), {} definition(s))",
        location,
        document.spec().paths.len(),
        document.spec().definitions.len()
    );
    Ok(document)
}

/// Decode document text into the canonical JSON object graph.
pub fn decode(content: &str, is_yaml: bool) -> Result<Value, ParseError> {
    if is_yaml {
        parse::yaml_to_value(content)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Whether a location names a YAML document. Any URL query or fragment is
/// ignored, and the extension match is case-sensitive.
pub fn is_yaml_path(location: &str) -> bool {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    matches!(
        Path::new(path).extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yaml_path() {
        assert!(is_yaml_path("spec.yaml"));
        assert!(is_yaml_path("dir/spec.yml"));
        assert!(is_yaml_path("http://host/spec.yml?raw=1"));
        assert!(is_yaml_path("models.yaml#/definitions/Pet"));
        assert!(!is_yaml_path("spec.json"));
        assert!(!is_yaml_path("spec.YAML"));
        assert!(!is_yaml_path("spec"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }
}
