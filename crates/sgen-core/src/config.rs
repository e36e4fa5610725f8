use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Generation options, loaded from `.sgen.yaml` and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenOpts {
    pub spec: String,
    pub target: String,
    /// Application name; falls back to the spec title, then `swagger`.
    pub name: Option<String>,
    /// Go module path used in imports; falls back to the application name.
    pub module_path: Option<String>,
    pub api_package: String,
    pub model_package: String,
    pub server_package: String,
    pub client_package: String,
    /// Type of the authenticated principal handed to handlers.
    pub principal: Option<String>,
    pub default_scheme: String,
    pub default_produces: String,
    pub default_consumes: String,
    /// Keep only operations carrying at least one of these tags.
    pub tags: Vec<String>,
    /// Keep only operations with one of these ids.
    pub operations: Vec<String>,
    pub include_model: bool,
    pub include_validator: bool,
    pub include_handler: bool,
    pub include_parameters: bool,
    pub include_responses: bool,
    pub include_support: bool,
    pub include_main: bool,
    pub exclude_spec: bool,
    pub dump_data: bool,
    pub validate_spec: bool,
}

impl Default for GenOpts {
    fn default() -> Self {
        Self {
            spec: "swagger.yaml".to_string(),
            target: ".".to_string(),
            name: None,
            module_path: None,
            api_package: DEFAULT_API_PACKAGE.to_string(),
            model_package: DEFAULT_MODEL_PACKAGE.to_string(),
            server_package: DEFAULT_SERVER_PACKAGE.to_string(),
            client_package: DEFAULT_CLIENT_PACKAGE.to_string(),
            principal: None,
            default_scheme: DEFAULT_SCHEME.to_string(),
            default_produces: DEFAULT_MEDIA_TYPE.to_string(),
            default_consumes: DEFAULT_MEDIA_TYPE.to_string(),
            tags: Vec::new(),
            operations: Vec::new(),
            include_model: true,
            include_validator: true,
            include_handler: true,
            include_parameters: true,
            include_responses: true,
            include_support: true,
            include_main: false,
            exclude_spec: false,
            dump_data: false,
            validate_spec: true,
        }
    }
}

pub const DEFAULT_API_PACKAGE: &str = "operations";
pub const DEFAULT_MODEL_PACKAGE: &str = "models";
pub const DEFAULT_SERVER_PACKAGE: &str = "restapi";
pub const DEFAULT_CLIENT_PACKAGE: &str = "client";
pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

impl GenOpts {
    /// Fill in package names and media types left empty by a config file or caller.
    pub fn ensure_defaults(&mut self) {
        fill(&mut self.api_package, DEFAULT_API_PACKAGE);
        fill(&mut self.model_package, DEFAULT_MODEL_PACKAGE);
        fill(&mut self.server_package, DEFAULT_SERVER_PACKAGE);
        fill(&mut self.client_package, DEFAULT_CLIENT_PACKAGE);
        fill(&mut self.default_scheme, DEFAULT_SCHEME);
        fill(&mut self.default_produces, DEFAULT_MEDIA_TYPE);
        fill(&mut self.default_consumes, DEFAULT_MEDIA_TYPE);
        if self.name.as_deref().is_some_and(str::is_empty) {
            self.name = None;
        }
        if self.principal.as_deref().is_some_and(str::is_empty) {
            self.principal = None;
        }
    }
}

fn fill(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".sgen.yaml";

/// Load options from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<GenOpts>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut opts: GenOpts =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    opts.ensure_defaults();
    Ok(Some(opts))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# sgen configuration
spec: swagger.yaml
target: .
# name: todo-list            # defaults to info.title
# module_path: github.com/you/todo-list

api_package: operations
model_package: models
server_package: restapi
# principal: models.Principal

default_scheme: http
default_consumes: application/json
default_produces: application/json

tags: []                     # only generate operations with these tags
operations: []               # only generate these operation ids

include_model: true
include_handler: true
include_parameters: true
include_responses: true
include_support: true
include_main: false
exclude_spec: false
validate_spec: true
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_opts() {
        let opts = GenOpts::default();
        assert_eq!(opts.api_package, "operations");
        assert_eq!(opts.model_package, "models");
        assert_eq!(opts.server_package, "restapi");
        assert_eq!(opts.client_package, "client");
        assert_eq!(opts.default_scheme, "http");
        assert!(opts.include_model);
        assert!(opts.include_support);
        assert!(!opts.include_main);
        assert!(!opts.exclude_spec);
        assert!(opts.tags.is_empty());
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
spec: api/swagger.yml
target: out
name: todo-list
tags: [search]
operations: [searchTasks]
principal: models.User
include_main: true
exclude_spec: true
"#;
        let opts: GenOpts = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(opts.spec, "api/swagger.yml");
        assert_eq!(opts.target, "out");
        assert_eq!(opts.name.as_deref(), Some("todo-list"));
        assert_eq!(opts.tags, vec!["search"]);
        assert_eq!(opts.operations, vec!["searchTasks"]);
        assert_eq!(opts.principal.as_deref(), Some("models.User"));
        assert!(opts.include_main);
        assert!(opts.exclude_spec);
        // Defaults applied
        assert_eq!(opts.api_package, "operations");
        assert!(opts.include_handler);
    }

    #[test]
    fn test_ensure_defaults_fills_blanks() {
        let mut opts: GenOpts =
            serde_yaml_ng::from_str("api_package: ''\ndefault_consumes: ' '\nname: ''\n").unwrap();
        opts.ensure_defaults();
        assert_eq!(opts.api_package, "operations");
        assert_eq!(opts.default_consumes, "application/json");
        assert_eq!(opts.name, None);
    }

    #[test]
    fn test_default_content_parses() {
        let opts: GenOpts = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(opts, GenOpts::default());
    }

    #[test]
    fn test_load_config_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(load_config(&path).unwrap().is_none());

        std::fs::write(&path, "target: gen\n").unwrap();
        let opts = load_config(&path).unwrap().unwrap();
        assert_eq!(opts.target, "gen");
    }
}
