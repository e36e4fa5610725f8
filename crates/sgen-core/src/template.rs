use std::io::Write;

use heck::{ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use minijinja::{Environment, ErrorKind, Template, UndefinedBehavior};
use serde::Serialize;

use crate::error::{GeneratorError, RenderError, TemplateDefect};

/// Named, parsed templates.
///
/// Populated once before generation starts and only read afterwards.
pub struct TemplateRegistry {
    env: Environment<'static>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.env.templates().map(|(name, _)| name).collect();
        f.debug_struct("TemplateRegistry")
            .field("templates", &names)
            .finish()
    }
}

impl TemplateRegistry {
    /// An empty registry with strict undefined handling and the helper filters.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_filter("pascal", |s: String| s.to_pascal_case());
        env.add_filter("camel", |s: String| s.to_lower_camel_case());
        env.add_filter("snake", |s: String| s.to_snake_case());
        env.add_filter("quote", quote);
        env.add_filter("go_comment", go_comment);
        env.add_filter("go_raw_string", go_raw_string);

        Self { env }
    }

    /// Parse and register a template. A second registration under the same
    /// name replaces the first.
    pub fn register(&mut self, name: &'static str, source: &'static str) -> Result<(), TemplateDefect> {
        if self.env.get_template(name).is_ok() {
            log::debug!("replacing template {name:?}");
        }
        self.env
            .add_template(name, source)
            .map_err(|e| TemplateDefect::Parse {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    pub fn get(&self, name: &str) -> Result<Template<'_, '_>, TemplateDefect> {
        self.env
            .get_template(name)
            .map_err(|_| TemplateDefect::Unregistered(name.to_string()))
    }

    /// Look up a template that is known to be compiled in.
    ///
    /// # Panics
    ///
    /// Panics, naming the template, when it is not registered.
    pub fn must_get(&self, name: &str) -> Template<'_, '_> {
        match self.get(name) {
            Ok(template) => template,
            Err(defect) => panic!("template {name:?} unavailable: {defect}"),
        }
    }

    /// Render `name` into `out`.
    pub fn execute<W: Write>(
        &self,
        name: &str,
        ctx: impl Serialize,
        out: &mut W,
    ) -> Result<(), GeneratorError> {
        let rendered = self.render(name, ctx)?;
        out.write_all(rendered.as_bytes()).map_err(|e| RenderError {
            name: name.to_string(),
            source: minijinja::Error::new(ErrorKind::WriteFailure, "failed to write output")
                .with_source(e),
        })?;
        Ok(())
    }

    pub fn render(&self, name: &str, ctx: impl Serialize) -> Result<String, GeneratorError> {
        let template = self.get(name)?;
        Ok(template.render(ctx).map_err(|source| RenderError {
            name: name.to_string(),
            source,
        })?)
    }
}

/// Double-quoted string literal with Go escapes.
pub fn quote(s: String) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Prefix every line with `// `.
pub fn go_comment(s: String) -> String {
    s.trim_end()
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Backtick string literal; backticks inside are spliced in as quoted strings.
pub fn go_raw_string(s: String) -> String {
    format!("`{}`", s.replace('`', "` + \"`\" + `"))
}
