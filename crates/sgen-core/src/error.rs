use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML document cannot be represented as JSON: {0}")]
    NotJson(String),

    #[error("spec version {0:?} is not supported")]
    UnsupportedVersion(String),

    #[error("{path}: {source}")]
    InFile {
        path: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Attach the offending spec location to an error.
    pub fn in_file(self, path: impl Into<String>) -> Self {
        match self {
            err @ (ParseError::Io { .. } | ParseError::InFile { .. }) => err,
            err => ParseError::InFile {
                path: path.into(),
                source: Box::new(err),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("external reference {0} needs a document loader")]
    ExternalRefUnsupported(String),

    #[error("failed to load external document {location}: {message}")]
    ExternalLoad { location: String, message: String },
}

/// Errors raised while turning a spec document into a usable `Document`.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

/// Every structural problem found in a spec, reported together.
#[derive(Debug, Error)]
#[error("spec validation failed with {} finding(s):\n  - {}", .findings.len(), .findings.join("\n  - "))]
pub struct ValidationError {
    pub findings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no operations were selected")]
    NoOperationsSelected,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unresolved reference(s): {}", .0.join(", "))]
    UnresolvedRefs(Vec<String>),

    #[error("{method} {path} is routed to both {first:?} and {second:?}")]
    DuplicateRoute {
        method: String,
        path: String,
        first: String,
        second: String,
    },
}

/// Defects in the generator's own templates. These are never caused by user
/// input, so they are kept apart from render and input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateDefect {
    #[error("template {0:?} is not registered")]
    Unregistered(String),

    #[error("template {name:?} failed to parse: {message}")]
    Parse { name: String, message: String },
}

#[derive(Debug, Error)]
#[error("failed to render template {name:?}: {source}")]
pub struct RenderError {
    pub name: String,
    #[source]
    pub source: minijinja::Error,
}

#[derive(Debug, Error)]
#[error("failed to format {file}: {message}")]
pub struct FormatError {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Umbrella error for a full generation run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("internal defect: {0}")]
    Defect(#[from] TemplateDefect),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl GeneratorError {
    /// Whether this error points at a broken generator rather than bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, GeneratorError::Defect(_))
    }
}
