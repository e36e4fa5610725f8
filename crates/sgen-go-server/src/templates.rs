use sgen_core::{TemplateDefect, TemplateRegistry};

pub const SERVER_BUILDER: &str = "serverBuilder";
pub const SERVER_CONFIGURE_API: &str = "serverConfigureapi";
pub const SERVER_DOC: &str = "serverDoc";
pub const SERVER_EMBEDDED_SPEC: &str = "serverEmbeddedSpec";
pub const SERVER_MAIN: &str = "serverMain";
pub const SERVER_SERVER: &str = "serverServer";
pub const SERVER_OPERATION: &str = "serverOperation";
pub const SERVER_PARAMETER: &str = "serverParameter";
pub const SERVER_RESPONSES: &str = "serverResponses";
pub const MODEL: &str = "model";

/// Templates compiled into the binary, by registry name.
pub const BUNDLED: &[(&str, &str)] = &[
    (SERVER_BUILDER, include_str!("../templates/server/builder.go.j2")),
    (SERVER_CONFIGURE_API, include_str!("../templates/server/configureapi.go.j2")),
    (SERVER_DOC, include_str!("../templates/server/doc.go.j2")),
    (SERVER_EMBEDDED_SPEC, include_str!("../templates/server/embedded_spec.go.j2")),
    (SERVER_MAIN, include_str!("../templates/server/main.go.j2")),
    (SERVER_SERVER, include_str!("../templates/server/server.go.j2")),
    (SERVER_OPERATION, include_str!("../templates/server/operation.go.j2")),
    (SERVER_PARAMETER, include_str!("../templates/server/parameter.go.j2")),
    (SERVER_RESPONSES, include_str!("../templates/server/responses.go.j2")),
    (MODEL, include_str!("../templates/model.go.j2")),
];

/// Registry holding every bundled template.
pub fn try_registry() -> Result<TemplateRegistry, TemplateDefect> {
    load(BUNDLED)
}

/// Registry holding every bundled template.
///
/// # Panics
///
/// Panics when a bundled template fails to parse; that is a packaging defect.
pub fn registry() -> TemplateRegistry {
    load_or_abort(BUNDLED)
}

fn load(sources: &[(&'static str, &'static str)]) -> Result<TemplateRegistry, TemplateDefect> {
    let mut registry = TemplateRegistry::new();
    for &(name, source) in sources {
        registry.register(name, source)?;
    }
    log::debug!("registered {} bundled template(s)", sources.len());
    Ok(registry)
}

fn load_or_abort(sources: &[(&'static str, &'static str)]) -> TemplateRegistry {
    match load(sources) {
        Ok(registry) => registry,
        Err(defect) => panic!("bundled templates are broken: {defect}"),
    }
}
