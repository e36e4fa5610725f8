use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};

use super::loader;
use crate::error::ResolveError;

/// Hook for fetching documents named by external references.
///
/// `location` is already resolved against the referencing document, so a
/// loader never has to know where the reference came from.
pub trait DocLoader {
    fn load(&self, location: &str) -> Result<Value, ResolveError>;
}

/// Loads external documents from the local file system, once per location.
#[derive(Debug, Default)]
pub struct FileDocLoader {
    cache: RefCell<HashMap<String, Value>>,
}

impl FileDocLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocLoader for FileDocLoader {
    fn load(&self, location: &str) -> Result<Value, ResolveError> {
        if let Some(cached) = self.cache.borrow().get(location) {
            return Ok(cached.clone());
        }

        let content = fs::read_to_string(location).map_err(|e| ResolveError::ExternalLoad {
            location: location.to_string(),
            message: e.to_string(),
        })?;
        let value = loader::decode(&content, loader::is_yaml_path(location)).map_err(|e| {
            ResolveError::ExternalLoad {
                location: location.to_string(),
                message: e.to_string(),
            }
        })?;

        log::debug!("loaded external document {location}");
        self.cache
            .borrow_mut()
            .insert(location.to_string(), value.clone());
        Ok(value)
    }
}

/// Replace every `$ref` node in `tree` with a deep copy of its target.
///
/// `location` names the document `tree` was read from (empty for in-memory
/// documents); relative external references resolve against it.
pub fn expand(
    tree: &Value,
    location: &str,
    loader: Option<&dyn DocLoader>,
) -> Result<Value, ResolveError> {
    let targets = collect_refs(tree)
        .into_iter()
        .filter_map(|(_, reference)| match split_ref(&reference) {
            Ok(("", pointer)) => Some(format!("{location}#{pointer}")),
            _ => None,
        })
        .collect();
    let mut expander = Expander {
        root: tree,
        root_location: location.to_string(),
        loader,
        externals: HashMap::new(),
        targets,
        active: vec![format!("{location}#")],
        replaced: 0,
    };
    let expanded = expander.expand_value(tree, location, &mut String::new())?;
    log::info!(
        "expanded {} reference(s) in {}",
        expander.replaced,
        display_location(location)
    );
    Ok(expanded)
}

struct Expander<'a> {
    root: &'a Value,
    root_location: String,
    loader: Option<&'a dyn DocLoader>,
    externals: HashMap<String, Value>,
    /// Locators of root-document nodes that some local `$ref` points at.
    targets: HashSet<String>,
    /// Canonical locators currently being expanded, outermost first. A ref
    /// target counts as active whether it was entered through a `$ref` or
    /// reached by walking the document.
    active: Vec<String>,
    replaced: usize,
}

impl Expander<'_> {
    /// Expand `value`, found at JSON pointer `at` inside `doc`.
    fn expand_value(
        &mut self,
        value: &Value,
        doc: &str,
        at: &mut String,
    ) -> Result<Value, ResolveError> {
        if let Some(reference) = value.as_object().and_then(|map| map.get("$ref")) {
            let reference = reference
                .as_str()
                .ok_or_else(|| ResolveError::InvalidRefFormat(reference.to_string()))?;
            return self.expand_ref(reference, doc);
        }

        let locator = format!("{doc}#{at}");
        let entered = doc == self.root_location
            && self.targets.contains(&locator)
            && !self.active.contains(&locator);
        if entered {
            self.active.push(locator);
        }
        let expanded = self.expand_children(value, doc, at);
        if entered {
            self.active.pop();
        }
        expanded
    }

    fn expand_children(
        &mut self,
        value: &Value,
        doc: &str,
        at: &mut String,
    ) -> Result<Value, ResolveError> {
        match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    let len = at.len();
                    at.push('/');
                    at.push_str(&key.replace('~', "~0").replace('/', "~1"));
                    let expanded = self.expand_value(child, doc, at);
                    at.truncate(len);
                    out.insert(key.clone(), expanded?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, child) in items.iter().enumerate() {
                    let len = at.len();
                    at.push('/');
                    at.push_str(&i.to_string());
                    let expanded = self.expand_value(child, doc, at);
                    at.truncate(len);
                    out.push(expanded?);
                }
                Ok(Value::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn expand_ref(&mut self, reference: &str, doc: &str) -> Result<Value, ResolveError> {
        let (doc_part, pointer) = split_ref(reference)?;
        let target_doc = if doc_part.is_empty() {
            doc.to_string()
        } else {
            join_location(doc, doc_part)
        };
        let locator = format!("{target_doc}#{pointer}");

        if let Some(start) = self.active.iter().position(|l| *l == locator) {
            let mut chain = self.active[start..].to_vec();
            chain.push(locator);
            return Err(ResolveError::CircularRef(chain.join(" -> ")));
        }

        let target = self.lookup(&target_doc, &pointer, &locator)?;
        log::debug!("resolving {locator}");

        self.active.push(locator);
        let expanded = self.expand_value(&target, &target_doc, &mut pointer.clone());
        self.active.pop();

        self.replaced += 1;
        expanded
    }

    fn lookup(&mut self, doc: &str, pointer: &str, locator: &str) -> Result<Value, ResolveError> {
        let document = if doc == self.root_location {
            self.root
        } else {
            if !self.externals.contains_key(doc) {
                let loader = self
                    .loader
                    .ok_or_else(|| ResolveError::ExternalRefUnsupported(locator.to_string()))?;
                let loaded = loader.load(doc)?;
                self.externals.insert(doc.to_string(), loaded);
            }
            &self.externals[doc]
        };

        document
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| ResolveError::RefTargetNotFound(locator.to_string()))
    }
}

/// Split a reference into its document part and its decoded JSON pointer.
pub fn split_ref(reference: &str) -> Result<(&str, String), ResolveError> {
    if reference.is_empty() {
        return Err(ResolveError::InvalidRefFormat(reference.to_string()));
    }
    let (doc, fragment) = match reference.split_once('#') {
        Some((doc, fragment)) => (doc, fragment),
        None => (reference, ""),
    };
    let pointer = percent_decode(fragment)
        .ok_or_else(|| ResolveError::InvalidRefFormat(reference.to_string()))?;
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(ResolveError::InvalidRefFormat(reference.to_string()));
    }
    Ok((doc, pointer))
}

/// Whether a reference points outside the document it appears in.
pub fn is_external(reference: &str) -> bool {
    !reference.starts_with('#')
}

/// Every `$ref` string in `tree`, paired with the JSON pointer of the node holding it.
pub fn collect_refs(tree: &Value) -> Vec<(String, String)> {
    let mut found = Vec::new();
    walk_refs(tree, &mut String::new(), &mut found);
    found
}

fn walk_refs(value: &Value, at: &mut String, found: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                found.push((at.clone(), reference.clone()));
                return;
            }
            for (key, child) in map {
                let len = at.len();
                at.push('/');
                at.push_str(&key.replace('~', "~0").replace('/', "~1"));
                walk_refs(child, at, found);
                at.truncate(len);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let len = at.len();
                at.push('/');
                at.push_str(&i.to_string());
                walk_refs(child, at, found);
                at.truncate(len);
            }
        }
        _ => {}
    }
}

/// Resolve `relative` against the location of the referencing document.
pub fn join_location(base: &str, relative: &str) -> String {
    if relative.contains("://") || Path::new(relative).is_absolute() {
        return relative.to_string();
    }
    if base.contains("://") {
        return match base.rfind('/') {
            Some(idx) => format!("{}/{}", &base[..idx], relative),
            None => relative.to_string(),
        };
    }
    let dir = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&dir.join(relative))
}

fn normalize_path(path: &Path) -> String {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out.to_string_lossy().into_owned()
}

fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_string());
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn display_location(location: &str) -> &str {
    if location.is_empty() {
        "<memory>"
    } else {
        location
    }
}
