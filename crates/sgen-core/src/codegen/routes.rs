/// Route table key for a spec path.
///
/// The path is kept verbatim apart from a missing leading `/`, so
/// `/widgets`, `/widgets/` and `/a//b` are all distinct routes.
pub fn normalize_route_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_slash() {
        assert_eq!(normalize_route_path("widgets"), "/widgets");
        assert_eq!(normalize_route_path(""), "/");
    }

    #[test]
    fn test_repeated_slashes_kept() {
        assert_eq!(normalize_route_path("/a//b"), "/a//b");
        assert_ne!(normalize_route_path("/a//b"), normalize_route_path("/a/b"));
    }

    #[test]
    fn test_trailing_slash_kept() {
        assert_eq!(normalize_route_path("/widgets/"), "/widgets/");
        assert_ne!(normalize_route_path("/widgets/"), normalize_route_path("/widgets"));
    }
}
