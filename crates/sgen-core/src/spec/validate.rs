use std::collections::HashSet;

use super::document::Document;
use super::expand::{collect_refs, is_external, split_ref};
use crate::error::ValidationError;
use crate::parse::parameter::ParameterLocation;
use crate::transform::name_normalizer::path_template_params;

const FORM_MEDIA_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "multipart/form-data"];

/// Check a document for structural problems that would produce a broken server.
///
/// Every finding is collected before returning, so one run reports them all.
pub fn validate(doc: &Document) -> Result<(), ValidationError> {
    let mut findings = Vec::new();
    let analysis = doc.analysis();

    let mut reported = HashSet::new();
    for id in analysis.duplicate_ids() {
        if reported.insert(id.as_str()) {
            findings.push(format!("operation id {id:?} is declared more than once"));
        }
    }

    for op in analysis.operations() {
        let at = format!("{} {}", op.method, op.path);

        let template_params = path_template_params(&op.path);
        for name in &template_params {
            let declared = op
                .parameters
                .iter()
                .any(|p| p.location == ParameterLocation::Path && p.name == *name);
            if !declared {
                findings.push(format!("{at}: path parameter {name:?} is not declared"));
            }
        }

        for param in &op.parameters {
            if param.location != ParameterLocation::Path {
                continue;
            }
            if !param.required {
                findings.push(format!(
                    "{at}: path parameter {:?} must be required",
                    param.name
                ));
            }
            if !template_params.contains(&param.name.as_str()) {
                findings.push(format!(
                    "{at}: path parameter {:?} does not appear in the path",
                    param.name
                ));
            }
        }

        let bodies = op
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Body)
            .count();
        let has_form = op
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::FormData);
        if bodies > 1 {
            findings.push(format!("{at}: has {bodies} body parameters, at most one is allowed"));
        }
        if bodies > 0 && has_form {
            findings.push(format!("{at}: body and formData parameters cannot be mixed"));
        }
        if has_form && !op.consumes.is_empty() {
            let accepts_form = op.consumes.iter().any(|media| {
                let media = media.to_ascii_lowercase();
                FORM_MEDIA_TYPES.iter().any(|form| media.starts_with(form))
            });
            if !accepts_form {
                findings.push(format!(
                    "{at}: formData parameters need consumes to include {} or {}",
                    FORM_MEDIA_TYPES[0], FORM_MEDIA_TYPES[1]
                ));
            }
        }
    }

    for (at, reference) in collect_refs(doc.tree()) {
        if is_external(&reference) {
            continue;
        }
        match split_ref(&reference) {
            Ok((_, pointer)) => {
                if doc.tree().pointer(&pointer).is_none() {
                    findings.push(format!("{at}: reference {reference:?} does not resolve"));
                }
            }
            Err(_) => findings.push(format!("{at}: malformed reference {reference:?}")),
        }
    }

    for scheme in analysis.security_schemes() {
        if !doc.spec().security_definitions.contains_key(scheme) {
            findings.push(format!("security scheme {scheme:?} is not defined"));
        }
    }

    if findings.is_empty() {
        log::debug!("spec passed structural validation");
        Ok(())
    } else {
        Err(ValidationError { findings })
    }
}
