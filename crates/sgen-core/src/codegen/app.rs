use indexmap::IndexMap;
use serde::Serialize;

use super::media::MediaTypeEntry;
use crate::ir::NormalizedName;

/// Everything a template needs to render one server application.
///
/// Built once per run by [`build_app`](super::build_app) and only read afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct CodegenApp {
    pub name: NormalizedName,
    /// Language package name derived from the app name.
    pub package: String,
    /// Application name with dashes, used for binary and directory names.
    pub kebab_name: String,
    pub receiver: String,
    pub module_path: String,
    pub api_package: String,
    pub model_package: String,
    pub server_package: String,
    pub client_package: String,
    pub principal: String,
    pub default_scheme: String,
    pub default_consumes: String,
    pub default_produces: String,
    pub info: CodegenInfo,
    pub host: Option<String>,
    pub base_path: String,
    pub schemes: Vec<String>,
    pub operations: Vec<CodegenOperation>,
    pub operation_groups: Vec<CodegenOperationGroup>,
    pub consumers: Vec<MediaTypeEntry>,
    pub producers: Vec<MediaTypeEntry>,
    /// `METHOD → path → route`. A trailing slash makes a distinct path.
    pub routes: IndexMap<String, IndexMap<String, CodegenRoute>>,
    pub security_schemes: Vec<CodegenSecurityScheme>,
    pub models: Vec<CodegenModel>,
    pub flags: InclusionFlags,
    /// The document as loaded, pretty-printed JSON.
    pub spec_json: Option<String>,
    /// The document with references expanded, when expansion succeeds.
    pub flat_spec_json: Option<String>,
}

impl CodegenApp {
    pub fn operation(&self, id: &str) -> Option<&CodegenOperation> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn route(&self, method: &str, path: &str) -> Option<&CodegenRoute> {
        self.routes.get(method)?.get(path)
    }

    pub fn route_count(&self) -> usize {
        self.routes.values().map(IndexMap::len).sum()
    }

    pub fn has_security(&self) -> bool {
        !self.security_schemes.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CodegenInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

/// Which file categories a generator should emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InclusionFlags {
    pub model: bool,
    pub validator: bool,
    pub handler: bool,
    pub parameters: bool,
    pub responses: bool,
    pub support: bool,
    pub main: bool,
    pub spec: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenOperation {
    pub id: String,
    pub name: NormalizedName,
    /// Exported identifier of the handler, e.g. `SearchTasks`.
    pub handler_name: String,
    /// Field holding the handler on the API type, e.g. `SearchSearchTasksHandler`.
    pub handler_field: String,
    /// Handler name as seen from the API package, e.g. `search.SearchTasks`.
    pub qualified_name: String,
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Package (and directory) name of the group this operation lives in.
    pub package: String,
    /// Directory relative to the server package.
    pub dir: String,
    /// File stem for the operation's files.
    pub file_name: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub params: Vec<CodegenParameter>,
    pub has_body: bool,
    pub has_form: bool,
    pub has_file: bool,
    pub responses: Vec<CodegenResponse>,
    pub default_response: Option<CodegenResponse>,
    /// Scheme names of each security requirement; any one requirement suffices.
    pub security: Vec<Vec<String>>,
    pub authenticated: bool,
    pub deprecated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenParameter {
    pub name: String,
    /// Exported field name.
    pub field_name: String,
    /// Local variable name.
    pub var_name: String,
    pub location: String,
    pub description: Option<String>,
    pub required: bool,
    pub type_name: String,
    pub is_query: bool,
    pub is_header: bool,
    pub is_path: bool,
    pub is_form: bool,
    pub is_body: bool,
    pub is_file: bool,
    pub is_array: bool,
    pub collection_format: Option<String>,
    /// Default value as JSON text.
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenResponse {
    /// Status code key as declared (`200`, `default`).
    pub status: String,
    pub code: Option<u16>,
    /// Exported type name, e.g. `SearchTasksOK`.
    pub name: String,
    pub description: String,
    pub type_name: Option<String>,
    pub is_default: bool,
    pub headers: Vec<CodegenHeader>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenHeader {
    pub name: String,
    pub field_name: String,
    pub type_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenOperationGroup {
    pub name: String,
    pub package: String,
    pub dir: String,
    /// Ids of the operations in this group, in document order.
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenRoute {
    pub method: String,
    pub path: String,
    pub operation_id: String,
    pub handler_name: String,
    pub handler_field: String,
    pub qualified_name: String,
    pub package: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenSecurityScheme {
    pub name: String,
    /// Exported identifier, e.g. `APIKeyAuth`.
    pub id: String,
    pub kind: String,
    pub is_basic: bool,
    pub is_api_key: bool,
    pub is_oauth2: bool,
    pub description: Option<String>,
    /// Header or query parameter carrying an API key.
    pub key_name: Option<String>,
    pub location: Option<String>,
    pub flow: Option<String>,
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenModel {
    pub name: String,
    pub original_name: String,
    pub file_name: String,
    pub kind: String,
    pub description: Option<String>,
    pub fields: Vec<CodegenField>,
    pub extends: Vec<String>,
    pub discriminator: Option<String>,
    /// Underlying type for enums and aliases.
    pub base_type: Option<String>,
    pub enum_values: Vec<CodegenEnumValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenField {
    pub name: String,
    pub json_name: String,
    pub type_name: String,
    pub required: bool,
    pub read_only: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodegenEnumValue {
    /// Constant name, e.g. `PetStatusAvailable`.
    pub name: String,
    /// Literal as it appears in the source language.
    pub literal: String,
}
