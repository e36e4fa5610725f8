use indexmap::IndexMap;

use super::app::*;
use super::media::{build_entries, normalize_media_type};
use super::routes::normalize_route_path;
use crate::config::GenOpts;
use crate::error::BuildError;
use crate::ir::{IrSchema, IrType};
use crate::parse::parameter::{Items, ParameterLocation};
use crate::parse::response::Response;
use crate::parse::security::{ApiKeyLocation, SecuritySchemeType};
use crate::spec::{self, AnalyzedOperation, Document};
use crate::transform::schema_resolver::items_to_ir_type;
use crate::transform::{
    normalize_name, parameter_to_ir_type, schema_or_ref_to_ir_schema, schema_or_ref_to_ir_type,
};
use crate::{CodecKind, LanguageOpts, TypeContext};

/// Fallback application name when neither options nor spec provide one.
pub const DEFAULT_APP_NAME: &str = "swagger";

/// Receiver used for methods on the generated API type.
const RECEIVER: &str = "o";

/// Build the model handed to templates from an analyzed document.
///
/// Works on the document as loaded: references to definitions stay named so
/// they render as model types.
pub fn build_app(
    doc: &Document,
    opts: &GenOpts,
    lang: &dyn LanguageOpts,
) -> Result<CodegenApp, BuildError> {
    let mut opts = opts.clone();
    opts.ensure_defaults();

    if opts.validate_spec {
        spec::validate(doc)?;
    }
    let unresolved = doc.analysis().unresolved_refs();
    if !unresolved.is_empty() {
        return Err(BuildError::UnresolvedRefs(unresolved.to_vec()));
    }

    let selected: Vec<&AnalyzedOperation> = doc
        .analysis()
        .operations()
        .filter(|op| is_selected(op, &opts))
        .collect();
    if selected.is_empty() {
        return Err(BuildError::NoOperationsSelected);
    }
    log::info!(
        "selected {} of {} operation(s)",
        selected.len(),
        doc.analysis().operation_count()
    );

    let app_name = opts
        .name
        .clone()
        .or_else(|| Some(doc.spec().info.title.clone()).filter(|t| !t.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
    let name = normalize_name(&app_name);
    let module_path = opts
        .module_path
        .clone()
        .unwrap_or_else(|| name.snake_case.clone());

    let operations: Vec<CodegenOperation> = selected
        .iter()
        .map(|op| build_operation(op, &opts, lang))
        .collect();

    let consumer_types: Vec<String> = selected
        .iter()
        .flat_map(|op| effective_media(&op.consumes, &opts.default_consumes))
        .collect();
    let producer_types: Vec<String> = selected
        .iter()
        .flat_map(|op| effective_media(&op.produces, &opts.default_produces))
        .collect();

    let spec_json = if opts.exclude_spec {
        None
    } else {
        serde_json::to_string_pretty(doc.tree()).ok()
    };
    let flat_spec_json = if opts.exclude_spec {
        None
    } else {
        match doc.expanded(None) {
            Ok(expanded) => serde_json::to_string_pretty(expanded.tree()).ok(),
            Err(e) => {
                log::warn!("embedding unexpanded spec only: {e}");
                None
            }
        }
    };

    let app = CodegenApp {
        package: lang.package_name(&app_name),
        kebab_name: name.snake_case.replace('_', "-"),
        name,
        receiver: RECEIVER.to_string(),
        module_path,
        api_package: opts.api_package.clone(),
        model_package: opts.model_package.clone(),
        server_package: opts.server_package.clone(),
        client_package: opts.client_package.clone(),
        principal: opts
            .principal
            .clone()
            .unwrap_or_else(|| lang.default_principal()),
        default_scheme: opts.default_scheme.clone(),
        default_consumes: opts.default_consumes.clone(),
        default_produces: opts.default_produces.clone(),
        info: CodegenInfo {
            title: doc.spec().info.title.clone(),
            version: doc.spec().info.version.clone(),
            description: doc.spec().info.description.clone(),
        },
        host: doc.host().map(str::to_string),
        base_path: doc.base_path().to_string(),
        schemes: if doc.spec().schemes.is_empty() {
            vec![opts.default_scheme.clone()]
        } else {
            doc.spec().schemes.clone()
        },
        operation_groups: build_groups(&operations),
        routes: build_routes(&operations)?,
        consumers: build_entries(
            consumer_types.iter().map(String::as_str),
            CodecKind::Consumer,
            lang,
        ),
        producers: build_entries(
            producer_types.iter().map(String::as_str),
            CodecKind::Producer,
            lang,
        ),
        operations,
        security_schemes: build_security(doc, lang),
        models: if opts.include_model {
            build_models(doc, lang)
        } else {
            Vec::new()
        },
        flags: InclusionFlags {
            model: opts.include_model,
            validator: opts.include_validator,
            handler: opts.include_handler,
            parameters: opts.include_parameters,
            responses: opts.include_responses,
            support: opts.include_support,
            main: opts.include_main,
            spec: !opts.exclude_spec,
        },
        spec_json,
        flat_spec_json,
    };

    if opts.dump_data {
        match serde_json::to_string_pretty(&app) {
            Ok(json) => log::info!("codegen data:\n{json}"),
            Err(e) => log::warn!("failed to dump codegen data: {e}"),
        }
    }

    Ok(app)
}

fn is_selected(op: &AnalyzedOperation, opts: &GenOpts) -> bool {
    let tag_ok = opts.tags.is_empty() || opts.tags.iter().any(|t| op.has_tag(t));
    let id_ok = opts.operations.is_empty() || opts.operations.iter().any(|id| *id == op.id);
    if !(tag_ok && id_ok) {
        log::debug!("excluding {} {} ({})", op.method, op.path, op.id);
    }
    tag_ok && id_ok
}

fn effective_media(declared: &[String], default: &str) -> Vec<String> {
    if declared.is_empty() {
        vec![default.to_string()]
    } else {
        declared.to_vec()
    }
}

fn build_operation(
    op: &AnalyzedOperation,
    opts: &GenOpts,
    lang: &dyn LanguageOpts,
) -> CodegenOperation {
    let name = normalize_name(&op.id);
    let handler_name = lang.mangle_name(&op.id, "");
    let ctx = TypeContext::Operation {
        models_package: &opts.model_package,
    };

    let (package, dir, handler_field, qualified_name) = match op.tags.first() {
        Some(tag) => {
            let package = lang.package_name(tag);
            let dir = format!("{}/{}", opts.api_package, package);
            let field = lang.mangle_name(&format!("{tag} {}", op.id), "Handler");
            let qualified = format!("{package}.{handler_name}");
            (package, dir, field, qualified)
        }
        None => (
            opts.api_package.clone(),
            opts.api_package.clone(),
            lang.mangle_name(&op.id, "Handler"),
            handler_name.clone(),
        ),
    };

    let params: Vec<CodegenParameter> = op
        .parameters
        .iter()
        .map(|p| {
            let ty = parameter_to_ir_type(p);
            CodegenParameter {
                name: p.name.clone(),
                field_name: lang.mangle_name(&p.name, ""),
                var_name: lang.var_name(&p.name),
                location: p.location.as_str().to_string(),
                description: p.description.clone(),
                required: p.required,
                type_name: lang.type_name(&ty, ctx),
                is_query: p.location == ParameterLocation::Query,
                is_header: p.location == ParameterLocation::Header,
                is_path: p.location == ParameterLocation::Path,
                is_form: p.location == ParameterLocation::FormData,
                is_body: p.location == ParameterLocation::Body,
                is_file: ty == IrType::File,
                is_array: matches!(ty, IrType::Array(_)),
                collection_format: p.collection_format.clone(),
                default_value: p.default_value.as_ref().map(|v| v.to_string()),
            }
        })
        .collect();

    let mut responses = Vec::new();
    let mut default_response = None;
    for (status, response) in &op.responses {
        let built = build_response(&op.id, status, response, ctx, lang);
        if built.is_default {
            default_response = Some(built);
        } else {
            responses.push(built);
        }
    }
    responses.sort_by_key(|r| r.code);

    let security: Vec<Vec<String>> = op
        .security
        .iter()
        .map(|req| req.keys().cloned().collect::<Vec<_>>())
        .filter(|names| !names.is_empty())
        .collect();

    CodegenOperation {
        id: op.id.clone(),
        file_name: lang.file_name(&op.id),
        handler_name,
        handler_field,
        qualified_name,
        name,
        method: op.method.as_str().to_string(),
        path: normalize_route_path(&op.path),
        summary: op.operation.summary.clone(),
        description: op.operation.description.clone(),
        tags: op.tags.clone(),
        package,
        dir,
        consumes: op.consumes.iter().map(|m| normalize_media_type(m)).collect(),
        produces: op.produces.iter().map(|m| normalize_media_type(m)).collect(),
        has_body: params.iter().any(|p| p.is_body),
        has_form: params.iter().any(|p| p.is_form),
        has_file: params.iter().any(|p| p.is_file),
        params,
        responses,
        default_response,
        authenticated: !security.is_empty(),
        security,
        deprecated: op.operation.deprecated.unwrap_or(false),
    }
}

fn build_response(
    op_id: &str,
    status: &str,
    response: &Response,
    ctx: TypeContext<'_>,
    lang: &dyn LanguageOpts,
) -> CodegenResponse {
    let code = status.parse::<u16>().ok();
    let is_default = status == "default";
    let suffix = if is_default {
        "Default".to_string()
    } else {
        status_suffix(code, status)
    };

    let headers = response
        .headers
        .iter()
        .map(|(name, header)| {
            let ty = match &header.items {
                Some(items) if header.header_type == "array" => {
                    IrType::Array(Box::new(items_to_ir_type(items)))
                }
                _ => items_to_ir_type(&Items {
                    item_type: Some(header.header_type.clone()),
                    format: header.format.clone(),
                    ..Default::default()
                }),
            };
            CodegenHeader {
                name: name.clone(),
                field_name: lang.mangle_name(name, ""),
                type_name: lang.type_name(&ty, ctx),
                description: header.description.clone(),
            }
        })
        .collect();

    CodegenResponse {
        status: status.to_string(),
        code,
        name: lang.mangle_name(op_id, &suffix),
        description: response.description.clone(),
        type_name: response
            .schema
            .as_ref()
            .map(|s| lang.type_name(&schema_or_ref_to_ir_type(s), ctx)),
        is_default,
        headers,
    }
}

/// Response type suffix for a status code, e.g. `OK` or `NotFound`.
pub fn status_suffix(code: Option<u16>, status: &str) -> String {
    let text = match code {
        Some(200) => "OK",
        Some(201) => "Created",
        Some(202) => "Accepted",
        Some(204) => "NoContent",
        Some(301) => "MovedPermanently",
        Some(302) => "Found",
        Some(304) => "NotModified",
        Some(400) => "BadRequest",
        Some(401) => "Unauthorized",
        Some(403) => "Forbidden",
        Some(404) => "NotFound",
        Some(405) => "MethodNotAllowed",
        Some(409) => "Conflict",
        Some(422) => "UnprocessableEntity",
        Some(429) => "TooManyRequests",
        Some(500) => "InternalServerError",
        Some(501) => "NotImplemented",
        Some(503) => "ServiceUnavailable",
        _ => return format!("Status{}", status.trim()),
    };
    text.to_string()
}

fn build_groups(operations: &[CodegenOperation]) -> Vec<CodegenOperationGroup> {
    let mut groups: IndexMap<String, CodegenOperationGroup> = IndexMap::new();
    for op in operations {
        groups
            .entry(op.dir.clone())
            .or_insert_with(|| CodegenOperationGroup {
                name: op.tags.first().cloned().unwrap_or_else(|| op.package.clone()),
                package: op.package.clone(),
                dir: op.dir.clone(),
                operations: Vec::new(),
            })
            .operations
            .push(op.id.clone());
    }
    groups.into_values().collect()
}

fn build_routes(
    operations: &[CodegenOperation],
) -> Result<IndexMap<String, IndexMap<String, CodegenRoute>>, BuildError> {
    let mut routes: IndexMap<String, IndexMap<String, CodegenRoute>> = IndexMap::new();
    for op in operations {
        let by_path = routes.entry(op.method.clone()).or_default();
        if let Some(existing) = by_path.get(&op.path) {
            return Err(BuildError::DuplicateRoute {
                method: op.method.clone(),
                path: op.path.clone(),
                first: existing.operation_id.clone(),
                second: op.id.clone(),
            });
        }
        by_path.insert(
            op.path.clone(),
            CodegenRoute {
                method: op.method.clone(),
                path: op.path.clone(),
                operation_id: op.id.clone(),
                handler_name: op.handler_name.clone(),
                handler_field: op.handler_field.clone(),
                qualified_name: op.qualified_name.clone(),
                package: op.package.clone(),
            },
        );
    }
    Ok(routes)
}

fn build_security(doc: &Document, lang: &dyn LanguageOpts) -> Vec<CodegenSecurityScheme> {
    doc.spec()
        .security_definitions
        .iter()
        .map(|(name, scheme)| CodegenSecurityScheme {
            name: name.clone(),
            id: lang.mangle_name(name, ""),
            kind: scheme.scheme_type.as_str().to_string(),
            is_basic: scheme.scheme_type == SecuritySchemeType::Basic,
            is_api_key: scheme.scheme_type == SecuritySchemeType::ApiKey,
            is_oauth2: scheme.scheme_type == SecuritySchemeType::OAuth2,
            description: scheme.description.clone(),
            key_name: scheme.name.clone(),
            location: scheme.location.map(|l| match l {
                ApiKeyLocation::Query => "query".to_string(),
                ApiKeyLocation::Header => "header".to_string(),
            }),
            flow: scheme.flow.clone(),
            authorization_url: scheme.authorization_url.clone(),
            token_url: scheme.token_url.clone(),
            scopes: scheme.scopes.keys().cloned().collect(),
        })
        .collect()
}

fn build_models(doc: &Document, lang: &dyn LanguageOpts) -> Vec<CodegenModel> {
    doc.analysis()
        .definitions()
        .iter()
        .map(|(original, schema)| {
            let ir = schema_or_ref_to_ir_schema(original, schema);
            let name = lang.mangle_name(original, "");
            let file_name = lang.file_name(original);
            match ir {
                IrSchema::Object(obj) => CodegenModel {
                    name,
                    original_name: original.clone(),
                    file_name,
                    kind: "object".to_string(),
                    description: obj.description,
                    fields: obj
                        .fields
                        .iter()
                        .map(|f| CodegenField {
                            name: lang.mangle_name(&f.original_name, ""),
                            json_name: f.original_name.clone(),
                            type_name: lang.type_name(&f.field_type, TypeContext::Model),
                            required: f.required,
                            read_only: f.read_only,
                            description: f.description.clone(),
                        })
                        .collect(),
                    extends: obj
                        .extends
                        .iter()
                        .map(|e| lang.type_name(&IrType::Ref(e.clone()), TypeContext::Model))
                        .collect(),
                    discriminator: obj.discriminator,
                    base_type: None,
                    enum_values: Vec::new(),
                },
                IrSchema::Enum(e) => CodegenModel {
                    enum_values: e
                        .variants
                        .iter()
                        .map(|v| CodegenEnumValue {
                            name: lang.mangle_name(&format!("{original} {v}"), ""),
                            literal: lang.enum_literal(v, &e.base),
                        })
                        .collect(),
                    name,
                    original_name: original.clone(),
                    file_name,
                    kind: "enum".to_string(),
                    description: e.description,
                    fields: Vec::new(),
                    extends: Vec::new(),
                    discriminator: None,
                    base_type: Some(lang.type_name(&e.base, TypeContext::Model)),
                },
                IrSchema::Alias(a) => CodegenModel {
                    name,
                    original_name: original.clone(),
                    file_name,
                    kind: "alias".to_string(),
                    description: a.description,
                    fields: Vec::new(),
                    extends: Vec::new(),
                    discriminator: None,
                    base_type: Some(lang.type_name(&a.target, TypeContext::Model)),
                    enum_values: Vec::new(),
                },
            }
        })
        .collect()
}
