use indexmap::{IndexMap, IndexSet};

use crate::ir::HttpMethod;
use crate::parse::operation::Operation;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::SchemaOrRef;
use crate::parse::security::SecurityRequirement;
use crate::parse::spec::Swagger;
use crate::transform::route_to_name;

/// One (path, method) pair with everything inherited from the document resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedOperation {
    pub id: String,
    /// `false` when `id` was derived from the method and path.
    pub id_declared: bool,
    pub method: HttpMethod,
    pub path: String,
    pub operation: Operation,
    pub tags: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Path-level parameters overridden by operation-level ones on `(name, in)`.
    pub parameters: Vec<Parameter>,
    pub responses: IndexMap<String, Response>,
    pub security: Vec<SecurityRequirement>,
}

impl AnalyzedOperation {
    pub fn body_param(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Indices derived from a parsed spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    operations: IndexMap<HttpMethod, IndexMap<String, AnalyzedOperation>>,
    operation_ids: IndexMap<String, (HttpMethod, String)>,
    /// Document order of every (method, path) pair.
    order: Vec<(HttpMethod, String)>,
    duplicate_ids: Vec<String>,
    /// Parameter and response references with no target, with their location.
    unresolved: Vec<String>,
    consumes: IndexSet<String>,
    produces: IndexSet<String>,
    security_schemes: IndexSet<String>,
    definitions: IndexMap<String, SchemaOrRef>,
}

impl Analysis {
    pub fn new(spec: &Swagger) -> Self {
        let mut analysis = Analysis {
            consumes: spec.consumes.iter().cloned().collect(),
            produces: spec.produces.iter().cloned().collect(),
            definitions: spec.definitions.clone(),
            ..Analysis::default()
        };

        for requirement in &spec.security {
            analysis.security_schemes.extend(requirement.keys().cloned());
        }

        for (path, item) in &spec.paths {
            let path_params =
                resolve_parameters(spec, &item.parameters, path, &mut analysis.unresolved);

            for (method, op) in item.operations() {
                let analyzed = analyze_operation(
                    spec,
                    method,
                    path,
                    op,
                    &path_params,
                    &mut analysis.unresolved,
                );

                analysis.consumes.extend(op.consumes.iter().cloned());
                analysis.produces.extend(op.produces.iter().cloned());
                if let Some(security) = &op.security {
                    for requirement in security {
                        analysis.security_schemes.extend(requirement.keys().cloned());
                    }
                }

                if analysis.operation_ids.contains_key(&analyzed.id) {
                    log::warn!("duplicate operation id {:?} at {method} {path}", analyzed.id);
                    analysis.duplicate_ids.push(analyzed.id.clone());
                } else {
                    analysis
                        .operation_ids
                        .insert(analyzed.id.clone(), (method, path.clone()));
                }

                analysis.order.push((method, path.clone()));
                analysis
                    .operations
                    .entry(method)
                    .or_default()
                    .insert(path.clone(), analyzed);
            }
        }

        log::debug!(
            "analyzed {} operation(s), {} definition(s)",
            analysis.operation_count(),
            analysis.definitions.len()
        );
        analysis
    }

    /// All operations in document order.
    pub fn operations(&self) -> impl Iterator<Item = &AnalyzedOperation> {
        self.order
            .iter()
            .filter_map(|(method, path)| self.operation(*method, path))
    }

    pub fn operation_count(&self) -> usize {
        self.operations.values().map(IndexMap::len).sum()
    }

    pub fn operation(&self, method: HttpMethod, path: &str) -> Option<&AnalyzedOperation> {
        self.operations.get(&method)?.get(path)
    }

    pub fn operation_by_id(&self, id: &str) -> Option<&AnalyzedOperation> {
        let (method, path) = self.operation_ids.get(id)?;
        self.operation(*method, path)
    }

    pub fn params_for(&self, method: HttpMethod, path: &str) -> Option<&[Parameter]> {
        self.operation(method, path).map(|op| op.parameters.as_slice())
    }

    /// Operation ids declared more than once. Only the first keeps its index entry.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicate_ids
    }

    /// Parameter and response references that point at nothing, as
    /// `<location>: <reference>`.
    pub fn unresolved_refs(&self) -> &[String] {
        &self.unresolved
    }

    /// Document-level media types plus every operation's declared ones.
    pub fn consumes(&self) -> &IndexSet<String> {
        &self.consumes
    }

    pub fn produces(&self) -> &IndexSet<String> {
        &self.produces
    }

    /// Scheme names referenced by any security requirement.
    pub fn security_schemes(&self) -> &IndexSet<String> {
        &self.security_schemes
    }

    pub fn definitions(&self) -> &IndexMap<String, SchemaOrRef> {
        &self.definitions
    }

    /// Tags used by any operation, in first-use order.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags = IndexSet::new();
        for op in self.operations() {
            tags.extend(op.tags.iter().cloned());
        }
        tags.into_iter().collect()
    }
}

fn analyze_operation(
    spec: &Swagger,
    method: HttpMethod,
    path: &str,
    op: &Operation,
    path_params: &[Parameter],
    unresolved: &mut Vec<String>,
) -> AnalyzedOperation {
    let (id, id_declared) = match op.operation_id.as_deref() {
        Some(id) if !id.is_empty() => (id.to_string(), true),
        _ => (route_to_name(method.as_str(), path), false),
    };

    let mut parameters: Vec<Parameter> = path_params.to_vec();
    let at = format!("{method} {path}");
    for param in resolve_parameters(spec, &op.parameters, &at, unresolved) {
        match parameters
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => parameters.push(param),
        }
    }

    let mut responses = IndexMap::new();
    for (status, response) in &op.responses {
        match response {
            ResponseOrRef::Response(r) => {
                responses.insert(status.clone(), r.clone());
            }
            ResponseOrRef::Ref { ref_path } => match lookup_local(ref_path, "responses")
                .and_then(|name| spec.responses.get(&name))
            {
                Some(r) => {
                    responses.insert(status.clone(), r.clone());
                }
                None => {
                    log::warn!("{at}: unresolved response {ref_path}");
                    unresolved.push(format!("{at}: {ref_path}"));
                }
            },
        }
    }

    AnalyzedOperation {
        id,
        id_declared,
        method,
        path: path.to_string(),
        operation: op.clone(),
        tags: op.tags.clone(),
        consumes: effective(&op.consumes, &spec.consumes),
        produces: effective(&op.produces, &spec.produces),
        parameters,
        responses,
        security: op.security.clone().unwrap_or_else(|| spec.security.clone()),
    }
}

fn effective(own: &[String], inherited: &[String]) -> Vec<String> {
    if own.is_empty() {
        inherited.to_vec()
    } else {
        own.to_vec()
    }
}

fn resolve_parameters(
    spec: &Swagger,
    params: &[ParameterOrRef],
    at: &str,
    unresolved: &mut Vec<String>,
) -> Vec<Parameter> {
    params
        .iter()
        .filter_map(|p| match p {
            ParameterOrRef::Parameter(param) => Some(param.clone()),
            ParameterOrRef::Ref { ref_path } => {
                let found = lookup_local(ref_path, "parameters")
                    .and_then(|name| spec.parameters.get(&name).cloned());
                if found.is_none() {
                    log::warn!("{at}: unresolved parameter {ref_path}");
                    unresolved.push(format!("{at}: {ref_path}"));
                }
                found
            }
        })
        .collect()
}

/// Name of the entry a `#/<section>/<name>` reference points at.
fn lookup_local(reference: &str, section: &str) -> Option<String> {
    let name = reference
        .strip_prefix("#/")?
        .strip_prefix(section)?
        .strip_prefix('/')?;
    Some(name.replace("~1", "/").replace("~0", "~"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::from_yaml;

    const SPEC: &str = r##"
swagger: "2.0"
info: {title: pets, version: "1"}
consumes: [application/json]
produces: [application/json]
security:
  - api_key: []
parameters:
  limit:
    name: limit
    in: query
    type: integer
paths:
  /pets:
    parameters:
      - name: X-Request-Id
        in: header
        type: string
    get:
      tags: [pets]
      parameters:
        - $ref: "#/parameters/limit"
        - name: X-Request-Id
          in: header
          type: string
          required: true
      responses:
        200: {description: ok}
    post:
      operationId: addPet
      consumes: [application/x-www-form-urlencoded]
      security: []
      parameters:
        - {name: name, in: formData, type: string}
      responses:
        201: {description: created}
  /pets/{id}:
    get:
      operationId: getPet
      produces: [application/xml]
      security:
        - oauth: [read]
      parameters:
        - {name: id, in: path, type: string, required: true}
      responses:
        default: {description: error}
"##;

    fn analysis() -> Analysis {
        Analysis::new(&from_yaml(SPEC).unwrap())
    }

    #[test]
    fn test_operation_index() {
        let a = analysis();
        assert_eq!(a.operation_count(), 3);
        let get = a.operation(HttpMethod::Get, "/pets").unwrap();
        assert_eq!(get.id, "getPets");
        assert!(!get.id_declared);
        assert_eq!(
            a.operation_by_id("addPet").map(|op| op.method),
            Some(HttpMethod::Post)
        );
        let order: Vec<&str> = a.operations().map(|op| op.id.as_str()).collect();
        assert_eq!(order, vec!["getPets", "addPet", "getPet"]);
    }

    #[test]
    fn test_parameter_merge() {
        let a = analysis();
        let params = a.params_for(HttpMethod::Get, "/pets").unwrap();
        assert_eq!(params.len(), 2);
        let header = params.iter().find(|p| p.name == "X-Request-Id").unwrap();
        assert!(header.required);
        assert!(params.iter().any(|p| p.name == "limit"));
    }

    #[test]
    fn test_effective_media_types() {
        let a = analysis();
        let get = a.operation(HttpMethod::Get, "/pets/{id}").unwrap();
        assert_eq!(get.consumes, vec!["application/json"]);
        assert_eq!(get.produces, vec!["application/xml"]);
        let consumes: Vec<&str> = a.consumes().iter().map(String::as_str).collect();
        assert_eq!(
            consumes,
            vec!["application/json", "application/x-www-form-urlencoded"]
        );
    }

    #[test]
    fn test_security() {
        let a = analysis();
        let schemes: Vec<&str> = a.security_schemes().iter().map(String::as_str).collect();
        assert_eq!(schemes, vec!["api_key", "oauth"]);
        assert_eq!(a.operation(HttpMethod::Get, "/pets").unwrap().security.len(), 1);
        assert!(a.operation_by_id("addPet").unwrap().security.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let spec = from_yaml(SPEC).unwrap();
        assert_eq!(Analysis::new(&spec), Analysis::new(&spec));
    }

    #[test]
    fn test_responses_keep_status_keys() {
        let a = analysis();
        let get = a.operation_by_id("getPet").unwrap();
        assert!(get.responses.contains_key("default"));
        let list = a.operation(HttpMethod::Get, "/pets").unwrap();
        assert!(list.responses.contains_key("200"));
    }

    #[test]
    fn test_unresolved_refs_recorded() {
        let spec = from_yaml(
            r##"
swagger: "2.0"
info: {title: t, version: "1"}
paths:
  /pets:
    get:
      parameters:
        - $ref: "#/parameters/missing"
      responses:
        200:
          $ref: "#/responses/Gone"
"##,
        )
        .unwrap();
        let a = Analysis::new(&spec);
        assert_eq!(
            a.unresolved_refs(),
            ["GET /pets: #/parameters/missing", "GET /pets: #/responses/Gone"]
        );
        assert!(analysis().unresolved_refs().is_empty());
    }

    #[test]
    fn test_document_order_kept() {
        let spec = from_yaml(
            r##"
swagger: "2.0"
info: {title: t, version: "1"}
paths:
  /zebras:
    get:
      operationId: listZebras
      responses:
        200: {description: ok}
  /apples:
    get:
      operationId: listApples
      responses:
        200: {description: ok}
"##,
        )
        .unwrap();
        let ids: Vec<String> = Analysis::new(&spec).operations().map(|op| op.id.clone()).collect();
        assert_eq!(ids, vec!["listZebras", "listApples"]);
    }
}
