use std::path::{Path, PathBuf};

use serde_json::Value;

use super::analysis::Analysis;
use super::expand::{self, DocLoader};
use super::loader;
use crate::error::{ParseError, SpecError};
use crate::parse::spec::Swagger;
use crate::parse::{self, SUPPORTED_VERSION};

/// A loaded Swagger document: raw bytes, object graph, typed model, and analysis.
#[derive(Debug, Clone)]
pub struct Document {
    raw: Vec<u8>,
    tree: Value,
    spec: Swagger,
    path: Option<PathBuf>,
    analysis: Analysis,
}

impl Document {
    /// Build a document from a decoded object graph.
    ///
    /// `version` is the version the caller expects; empty means the default.
    pub fn from_value(tree: Value, version: &str) -> Result<Self, ParseError> {
        parse::check_version(version)?;
        let spec = parse::from_value(tree.clone())?;
        let raw = serde_json::to_vec(&tree)?;
        let analysis = Analysis::new(&spec);

        Ok(Self {
            raw,
            tree,
            spec,
            path: None,
            analysis,
        })
    }

    pub fn from_json_bytes(bytes: &[u8], version: &str) -> Result<Self, ParseError> {
        Self::from_value(serde_json::from_slice(bytes)?, version)
    }

    /// Build a document from in-memory text.
    pub fn load_str(content: &str, is_yaml: bool) -> Result<Self, ParseError> {
        Self::from_value(loader::decode(content, is_yaml)?, "")
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// A new document with every reference replaced by its target.
    ///
    /// External references go through `loader`; without one they are an error.
    pub fn expanded(&self, loader: Option<&dyn DocLoader>) -> Result<Document, SpecError> {
        let location = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let tree = expand::expand(&self.tree, &location, loader)?;
        let mut document = Document::from_value(tree, self.version())?;
        document.path = self.path.clone();
        Ok(document)
    }

    /// Canonical JSON encoding of the document.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn spec(&self) -> &Swagger {
        &self.spec
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn version(&self) -> &str {
        if self.spec.swagger.is_empty() {
            SUPPORTED_VERSION
        } else {
            &self.spec.swagger
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.spec.host.as_deref()
    }

    /// Base path, `/` when absent.
    pub fn base_path(&self) -> &str {
        match self.spec.base_path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => "/",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    const PETS: &str = r##"
swagger: "2.0"
info: {title: pets, version: "1"}
basePath: /api
paths:
  /pets:
    get:
      responses:
        200:
          description: ok
          schema: {$ref: "#/definitions/Pet"}
definitions:
  Pet:
    type: object
    properties:
      name: {type: string}
"##;

    #[test]
    fn test_load_str_accessors() {
        let doc = Document::load_str(PETS, true).unwrap();
        assert_eq!(doc.version(), "2.0");
        assert_eq!(doc.base_path(), "/api");
        assert_eq!(doc.host(), None);
        assert_eq!(doc.analysis().operation_count(), 1);
        let reparsed: Value = serde_json::from_slice(doc.raw()).unwrap();
        assert_eq!(&reparsed, doc.tree());
    }

    #[test]
    fn test_version_gate() {
        let tree = serde_json::json!({"swagger": "2.0", "info": {"title": "t", "version": "1"}});
        assert!(Document::from_value(tree.clone(), "").is_ok());
        assert!(Document::from_value(tree.clone(), "2.0").is_ok());
        assert!(matches!(
            Document::from_value(tree, "3.0"),
            Err(ParseError::UnsupportedVersion(v)) if v == "3.0"
        ));

        let openapi = serde_json::json!({"swagger": "1.2"});
        assert!(matches!(
            Document::from_value(openapi, ""),
            Err(ParseError::UnsupportedVersion(v)) if v == "1.2"
        ));

        let no_version = serde_json::json!({"info": {"title": "t", "version": "1"}});
        assert_eq!(Document::from_value(no_version, "").unwrap().version(), "2.0");
    }

    #[test]
    fn test_expanded_leaves_original_alone() {
        let doc = Document::load_str(PETS, true).unwrap();
        let expanded = doc.expanded(None).unwrap();

        let schema = &expanded.tree()["paths"]["/pets"]["get"]["responses"]["200"]["schema"];
        assert_eq!(schema["properties"]["name"]["type"], "string");
        let original = &doc.tree()["paths"]["/pets"]["get"]["responses"]["200"]["schema"];
        assert_eq!(original["$ref"], "#/definitions/Pet");
    }

    #[test]
    fn test_expanded_reports_cycle() {
        let cyclic = r##"
swagger: "2.0"
info: {title: t, version: "1"}
paths: {}
definitions:
  Node:
    properties:
      next: {$ref: "#/definitions/Node"}
"##;
        let doc = Document::load_str(cyclic, true).unwrap();
        assert!(matches!(
            doc.expanded(None),
            Err(SpecError::Resolve(ResolveError::CircularRef(_)))
        ));
    }
}
