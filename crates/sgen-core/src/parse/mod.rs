pub mod operation;
pub mod parameter;
pub mod response;
pub mod schema;
pub mod security;
pub mod spec;

use serde_json::Value;

use crate::error::ParseError;
use spec::Swagger;

/// The only specification version this crate understands.
pub const SUPPORTED_VERSION: &str = "2.0";

/// Parse a Swagger spec from YAML.
pub fn from_yaml(input: &str) -> Result<Swagger, ParseError> {
    from_value(yaml_to_value(input)?)
}

/// Deserialize an already decoded object graph, checking its declared version.
pub fn from_value(mut tree: Value) -> Result<Swagger, ParseError> {
    let version = declared_version(&tree);
    check_version(&version)?;
    // An unquoted `swagger: 2.0` decodes as a number, and an absent one means the default.
    if let Some(object) = tree.as_object_mut() {
        object.insert(
            "swagger".to_string(),
            Value::String(SUPPORTED_VERSION.to_string()),
        );
    }
    Ok(serde_json::from_value(tree)?)
}

/// The `swagger` field of a raw document, stringified.
pub fn declared_version(tree: &Value) -> String {
    match tree.get("swagger") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Accept `version` when it is the supported one. Empty means the default.
pub fn check_version(version: &str) -> Result<(), ParseError> {
    if version.is_empty() || version == SUPPORTED_VERSION {
        Ok(())
    } else {
        Err(ParseError::UnsupportedVersion(version.to_string()))
    }
}

/// Decode YAML into the canonical JSON object graph.
///
/// YAML allows non-string mapping keys (`200:` under `responses` is an
/// integer), so keys are stringified the way a JSON re-encoding would.
pub fn yaml_to_value(input: &str) -> Result<Value, ParseError> {
    let yaml: serde_yaml_ng::Value = serde_yaml_ng::from_str(input)?;
    convert_yaml(yaml)
}

fn convert_yaml(yaml: serde_yaml_ng::Value) -> Result<Value, ParseError> {
    use serde_yaml_ng::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| ParseError::NotJson(format!("non-finite number {n}")))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(convert_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                object.insert(yaml_key(key)?, convert_yaml(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => convert_yaml(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml_ng::Value) -> Result<String, ParseError> {
    use serde_yaml_ng::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(ParseError::NotJson(format!(
            "unsupported mapping key {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_keys_become_strings() {
        let value = yaml_to_value("responses:\n  200:\n    description: ok\n").unwrap();
        assert_eq!(value["responses"]["200"]["description"], "ok");
    }

    #[test]
    fn test_empty_version_is_default() {
        assert!(check_version("").is_ok());
        assert!(check_version("2.0").is_ok());
    }

    #[test]
    fn test_other_versions_rejected() {
        let err = check_version("3.0.0").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "3.0.0"));
        assert!(err.to_string().contains("\"3.0.0\""));
    }

    #[test]
    fn test_from_yaml_minimal() {
        let spec = from_yaml("swagger: '2.0'\ninfo:\n  title: t\n  version: '1'\npaths: {}\n")
            .unwrap();
        assert_eq!(spec.swagger, "2.0");
        assert_eq!(spec.info.title, "t");
    }
}
