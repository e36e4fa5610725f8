use std::collections::BTreeSet;

use minijinja::{Value, context};
use sgen_core::codegen::{CodegenModel, CodegenOperation};
use sgen_core::error::RenderError;
use sgen_core::{CodeGenerator, CodegenApp, Formatter, GeneratedFile, GeneratorError, TemplateRegistry};

use crate::formatter::GoFormatter;
use crate::templates::*;

const STRFMT: &str = "github.com/go-openapi/strfmt";
const ERRORS: &str = "github.com/go-openapi/errors";
const RUNTIME: &str = "github.com/go-openapi/runtime";
const MIDDLEWARE: &str = "github.com/go-openapi/runtime/middleware";
const SWAG: &str = "github.com/go-openapi/swag";

/// Go types whose query, path, header and form values go through a `swag` converter.
const CONVERTED: &[&str] = &["int32", "int64", "float32", "float64", "bool"];

/// go-swagger style server generator.
pub struct GoServerGenerator {
    formatter: Box<dyn Formatter>,
}

impl Default for GoServerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl GoServerGenerator {
    pub fn new() -> Self {
        Self {
            formatter: Box::new(GoFormatter),
        }
    }

    pub fn with_formatter(formatter: impl Formatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
        }
    }

    fn emit(
        &self,
        registry: &TemplateRegistry,
        name: &str,
        path: String,
        ctx: Value,
    ) -> Result<GeneratedFile, GeneratorError> {
        let rendered = registry
            .must_get(name)
            .render(ctx)
            .map_err(|source| RenderError {
                name: name.to_string(),
                source,
            })?;
        let content = self.formatter.format_content(&path, &rendered)?;
        log::debug!("rendered {name} into {path}");
        Ok(GeneratedFile { path, content })
    }
}

impl CodeGenerator for GoServerGenerator {
    fn generate(
        &self,
        app: &CodegenApp,
        registry: &TemplateRegistry,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let server = &app.server_package;
        let stem = &app.name.snake_case;
        let principal_imports = imports_for([app.principal.as_str()], app, &[STRFMT]);

        let mut files = vec![
            self.emit(
                registry,
                SERVER_BUILDER,
                format!("{server}/{}/{stem}_api.go", app.api_package),
                context! { app => app, imports => principal_imports.external.clone() },
            )?,
            self.emit(
                registry,
                SERVER_CONFIGURE_API,
                format!("{server}/configure_{stem}.go"),
                context! { app => app, imports => principal_imports.external.clone() },
            )?,
        ];

        if app.flags.support {
            files.push(self.emit(registry, SERVER_DOC, format!("{server}/doc.go"), context! { app => app })?);
            files.push(self.emit(
                registry,
                SERVER_SERVER,
                format!("{server}/server.go"),
                context! { app => app },
            )?);
        }
        if app.flags.spec && app.spec_json.is_some() {
            files.push(self.emit(
                registry,
                SERVER_EMBEDDED_SPEC,
                format!("{server}/embedded_spec.go"),
                context! { app => app },
            )?);
        }
        if app.flags.main {
            files.push(self.emit(
                registry,
                SERVER_MAIN,
                format!("cmd/{}-server/main.go", app.kebab_name),
                context! { app => app },
            )?);
        }

        for op in &app.operations {
            let base = format!("{server}/{}/{}", op.dir, op.file_name);
            if app.flags.handler {
                let principal = if op.authenticated {
                    principal_imports.external.clone()
                } else {
                    Vec::new()
                };
                files.push(self.emit(
                    registry,
                    SERVER_OPERATION,
                    format!("{base}.go"),
                    context! { app => app, op => op, imports => principal },
                )?);
            }
            if app.flags.parameters {
                let imports = parameter_imports(op, app);
                files.push(self.emit(
                    registry,
                    SERVER_PARAMETER,
                    format!("{base}_parameters.go"),
                    context! {
                        app => app,
                        op => op,
                        std_imports => imports.std,
                        imports => imports.external,
                        bind => context! {
                            has_query => op.params.iter().any(|p| p.is_query),
                            has_simple_form => op.params.iter().any(|p| p.is_form && !p.is_file),
                        },
                    },
                )?);
            }
            if app.flags.responses {
                let imports = response_imports(op, app);
                files.push(self.emit(
                    registry,
                    SERVER_RESPONSES,
                    format!("{base}_responses.go"),
                    context! {
                        app => app,
                        op => op,
                        std_imports => imports.std,
                        imports => imports.external,
                    },
                )?);
            }
        }

        if app.flags.model {
            for model in &app.models {
                let imports = model_imports(model, app);
                files.push(self.emit(
                    registry,
                    MODEL,
                    format!("{}/{}.go", app.model_package, model.file_name),
                    context! {
                        app => app,
                        model => model,
                        std_imports => imports.std,
                        imports => imports.external,
                    },
                )?);
            }
        }

        log::info!(
            "generated {} file(s) for {} operation(s) and {} model(s)",
            files.len(),
            app.operations.len(),
            app.models.len()
        );
        Ok(files)
    }
}

/// Import paths of one Go file, standard library first.
#[derive(Debug, Default, PartialEq, Eq)]
struct Imports {
    std: Vec<String>,
    external: Vec<String>,
}

#[derive(Default)]
struct ImportSet {
    std: BTreeSet<String>,
    external: BTreeSet<String>,
}

impl ImportSet {
    fn std(&mut self, path: &str) {
        self.std.insert(path.to_string());
    }

    fn external(&mut self, path: &str) {
        self.external.insert(path.to_string());
    }

    fn types<'a>(&mut self, types: impl IntoIterator<Item = &'a str>, app: &CodegenApp) {
        for ty in types {
            for qualifier in qualifiers(ty) {
                match qualifier {
                    "strfmt" => self.external(STRFMT),
                    "io" => self.std("io"),
                    q if q == app.model_package => {
                        self.external(&format!("{}/{}", app.module_path, app.model_package));
                    }
                    other => log::debug!("no import known for package {other:?}"),
                }
            }
        }
    }

    fn finish(self) -> Imports {
        Imports {
            std: self.std.into_iter().collect(),
            external: self.external.into_iter().collect(),
        }
    }
}

/// Package qualifiers used by a Go type expression: `[]*models.Pet` uses `models`.
fn qualifiers(ty: &str) -> Vec<&str> {
    ty.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
        .filter_map(|token| token.split_once('.').map(|(pkg, _)| pkg))
        .filter(|pkg| !pkg.is_empty())
        .collect()
}

/// Imports needed by `types`, minus those the template already carries.
fn imports_for<'a>(
    types: impl IntoIterator<Item = &'a str>,
    app: &CodegenApp,
    provided: &[&str],
) -> Imports {
    let mut set = ImportSet::default();
    set.types(types, app);
    for path in provided {
        set.std.remove(*path);
        set.external.remove(*path);
    }
    set.finish()
}

fn parameter_imports(op: &CodegenOperation, app: &CodegenApp) -> Imports {
    let mut set = ImportSet::default();
    set.std("net/http");
    set.external(ERRORS);
    set.external(MIDDLEWARE);

    let mut bound = false;
    for p in &op.params {
        if p.is_query || p.is_form || p.is_body || p.is_file {
            set.external(RUNTIME);
        }
        if p.is_body || p.is_file {
            continue;
        }
        bound = true;
        let elem = p.type_name.strip_prefix("[]").unwrap_or(&p.type_name);
        if p.is_array || CONVERTED.contains(&elem) {
            set.external(SWAG);
        }
    }
    if bound {
        set.external(STRFMT);
    }
    set.types(op.params.iter().map(|p| p.type_name.as_str()), app);
    set.finish()
}

fn response_imports(op: &CodegenOperation, app: &CodegenApp) -> Imports {
    let mut set = ImportSet::default();
    set.std("net/http");
    set.external(RUNTIME);

    let responses = op.responses.iter().chain(op.default_response.iter());
    for r in responses.clone() {
        if !r.headers.is_empty() {
            set.std("fmt");
        }
    }
    let types = responses.flat_map(|r| {
        r.type_name
            .iter()
            .map(String::as_str)
            .chain(r.headers.iter().map(|h| h.type_name.as_str()))
    });
    set.types(types, app);
    set.finish()
}

fn model_imports(model: &CodegenModel, app: &CodegenApp) -> Imports {
    let mut set = ImportSet::default();
    if model.kind == "enum" && app.flags.validator {
        set.std("fmt");
        set.external(STRFMT);
    }
    set.types(
        model
            .fields
            .iter()
            .map(|f| f.type_name.as_str())
            .chain(model.base_type.as_deref()),
        app,
    );
    set.finish()
}
