use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::ir::NormalizedName;

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    let sanitized = sanitize_identifier(name);

    NormalizedName {
        original: name.to_string(),
        pascal_case: sanitized.to_pascal_case(),
        camel_case: sanitized.to_lower_camel_case(),
        snake_case: sanitized.to_snake_case(),
        screaming_snake: sanitized.to_shouty_snake_case(),
    }
}

/// Operation id for an operation that does not declare one.
///
/// The method is lower-cased and followed by every path segment in
/// PascalCase; parameter segments become `By<Param>` and empty segments
/// become `Slash`, so distinct paths get distinct ids:
///
/// - `GET /pets` → `getPets`
/// - `GET /pets/{petId}` → `getPetsByPetId`
/// - `POST /stores/{id}/orders` → `postStoresByIdOrders`
/// - `GET /widgets/` → `getWidgetsSlash`
/// - `GET /` → `getRoot`
pub fn route_to_name(method: &str, path: &str) -> String {
    let mut name = method.to_ascii_lowercase();
    if path.is_empty() || path == "/" {
        name.push_str("Root");
        return name;
    }

    let rest = path.strip_prefix('/').unwrap_or(path);
    for segment in rest.split('/') {
        if segment.is_empty() {
            name.push_str("Slash");
            continue;
        }
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => {
                name.push_str("By");
                name.push_str(&sanitize_identifier(param).to_pascal_case());
            }
            None => name.push_str(&sanitize_identifier(segment).to_pascal_case()),
        }
    }
    name
}

/// Parameter names declared in a path template, in order of appearance.
///
/// `/stores/{storeId}/items/{item-id}.json` yields `["storeId", "item-id"]`.
pub fn path_template_params(path: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                params.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    params
}

/// Reduce a string to alphanumeric runs joined by `_`, prefixing a leading digit.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 1);
    let mut pending_separator = false;

    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            pending_separator = true;
            continue;
        }
        if result.is_empty() && ch.is_ascii_digit() {
            result.push('_');
        } else if pending_separator && !result.is_empty() {
            result.push('_');
        }
        result.push(ch);
        pending_separator = false;
    }

    if result.is_empty() {
        "unnamed".to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        let n = normalize_name("findPets");
        assert_eq!(n.pascal_case, "FindPets");
        assert_eq!(n.camel_case, "findPets");
        assert_eq!(n.snake_case, "find_pets");
        assert_eq!(n.screaming_snake, "FIND_PETS");
    }

    #[test]
    fn test_kebab_case() {
        let n = normalize_name("todo-list");
        assert_eq!(n.pascal_case, "TodoList");
        assert_eq!(n.snake_case, "todo_list");
    }

    #[test]
    fn test_media_type_name() {
        let n = normalize_name("application/vnd.api");
        assert_eq!(n.pascal_case, "ApplicationVndApi");
    }

    #[test]
    fn test_leading_digit() {
        assert_eq!(sanitize_identifier("3dModel"), "_3dModel");
        assert_eq!(sanitize_identifier("***"), "unnamed");
    }

    #[test]
    fn test_route_to_name_collection() {
        assert_eq!(route_to_name("GET", "/pets"), "getPets");
        assert_eq!(route_to_name("post", "/search"), "postSearch");
    }

    #[test]
    fn test_route_to_name_with_params() {
        assert_eq!(route_to_name("GET", "/pets/{petId}"), "getPetsByPetId");
        assert_eq!(
            route_to_name("DELETE", "/stores/{store-id}/orders"),
            "deleteStoresByStoreIdOrders"
        );
    }

    #[test]
    fn test_route_to_name_root_and_trailing_slash() {
        assert_eq!(route_to_name("GET", "/"), "getRoot");
        assert_eq!(route_to_name("GET", "/trailingslashpath/"), "getTrailingslashpathSlash");
        assert_ne!(
            route_to_name("GET", "/widgets/"),
            route_to_name("GET", "/widgets")
        );
        assert_eq!(route_to_name("GET", "/a//b"), "getASlashB");
    }

    #[test]
    fn test_path_template_params() {
        assert_eq!(
            path_template_params("/stores/{storeId}/items/{item-id}.json"),
            vec!["storeId", "item-id"]
        );
        assert!(path_template_params("/search").is_empty());
        assert!(path_template_params("/broken/{id").is_empty());
    }
}
