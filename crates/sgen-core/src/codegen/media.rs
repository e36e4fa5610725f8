use indexmap::IndexMap;
use serde::Serialize;

use crate::transform::normalize_name;
use crate::{CodecKind, LanguageOpts};

/// One deduplicated consumer or producer binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaTypeEntry {
    /// Canonical name, e.g. `JSON` or `Urlform`.
    pub name: String,
    /// Every normalized media type that maps to this entry.
    pub media_types: Vec<String>,
    /// Language expression constructing the codec.
    pub implementation: String,
}

/// Lower-case a media type, drop its parameters, and trim it.
///
/// `Application/JSON; charset=utf-8` becomes `application/json`.
pub fn normalize_media_type(media_type: &str) -> String {
    let essence = media_type.split(';').next().unwrap_or_default();
    essence.trim().to_ascii_lowercase()
}

/// Canonical entry name for a normalized media type.
pub fn media_type_name(normalized: &str) -> String {
    let known = match normalized {
        "application/json" => Some("JSON"),
        "application/xml" | "text/xml" => Some("XML"),
        "application/x-yaml" | "application/yaml" | "text/yaml" | "text/x-yaml" => Some("YAML"),
        "text/plain" => Some("Txt"),
        "text/html" => Some("HTML"),
        "text/csv" => Some("CSV"),
        "application/octet-stream" => Some("Bin"),
        "application/x-www-form-urlencoded" => Some("Urlform"),
        "multipart/form-data" => Some("Multipartform"),
        m if m.ends_with("+json") => Some("JSON"),
        m if m.ends_with("+xml") => Some("XML"),
        _ => None,
    };
    match known {
        Some(name) => name.to_string(),
        None => normalize_name(normalized).pascal_case,
    }
}

/// Group media types into one entry per canonical name, sorted by name.
pub fn build_entries<'a>(
    media_types: impl IntoIterator<Item = &'a str>,
    kind: CodecKind,
    lang: &dyn LanguageOpts,
) -> Vec<MediaTypeEntry> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for media_type in media_types {
        let normalized = normalize_media_type(media_type);
        if normalized.is_empty() {
            continue;
        }
        let group = groups.entry(media_type_name(&normalized)).or_default();
        if !group.contains(&normalized) {
            group.push(normalized);
        }
    }

    let mut entries: Vec<MediaTypeEntry> = groups
        .into_iter()
        .map(|(name, mut media_types)| {
            media_types.sort();
            MediaTypeEntry {
                implementation: lang.media_codec(&name, kind),
                name,
                media_types,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PlainLanguage;

    #[test]
    fn test_normalize_media_type() {
        assert_eq!(
            normalize_media_type(" Application/JSON; charset=utf-8"),
            "application/json"
        );
        assert_eq!(normalize_media_type("text/plain"), "text/plain");
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(media_type_name("application/json"), "JSON");
        assert_eq!(media_type_name("application/vnd.api+json"), "JSON");
        assert_eq!(media_type_name("text/xml"), "XML");
        assert_eq!(media_type_name("application/x-www-form-urlencoded"), "Urlform");
        assert_eq!(media_type_name("multipart/form-data"), "Multipartform");
        assert_eq!(media_type_name("application/octet-stream"), "Bin");
        assert_eq!(media_type_name("application/pdf"), "ApplicationPdf");
    }

    #[test]
    fn test_entries_deduplicate() {
        let entries = build_entries(
            [
                "application/json",
                "application/json; charset=utf-8",
                "application/vnd.api+json",
                "application/x-www-form-urlencoded",
                "APPLICATION/JSON",
            ],
            CodecKind::Consumer,
            &PlainLanguage,
        );
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        insta::assert_snapshot!(names.join(","), @"JSON,Urlform");
        assert_eq!(
            entries[0].media_types,
            vec!["application/json", "application/vnd.api+json"]
        );
        assert_eq!(entries[1].implementation, "Urlform/consumer");
    }
}
