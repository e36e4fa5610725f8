pub mod codegen;
pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod spec;
pub mod template;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use serde::Serialize;

pub use codegen::{CodegenApp, build_app};
pub use config::GenOpts;
pub use error::{GeneratorError, TemplateDefect};
pub use spec::Document;
pub use template::TemplateRegistry;

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from a built application model.
pub trait CodeGenerator {
    fn generate(
        &self,
        app: &CodegenApp,
        registry: &TemplateRegistry,
    ) -> Result<Vec<GeneratedFile>, GeneratorError>;
}

/// Canonicalizes rendered source text.
pub trait Formatter {
    fn format_content(&self, file_name: &str, content: &str) -> Result<String, error::FormatError>;
}

/// Where a type name is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeContext<'a> {
    /// Inside the models package.
    Model,
    /// Inside an operation package, where models need qualifying.
    Operation { models_package: &'a str },
}

/// Direction of a media-type codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    Consumer,
    Producer,
}

impl CodecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::Consumer => "consumer",
            CodecKind::Producer => "producer",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming and typing rules of the target language.
pub trait LanguageOpts {
    /// Exported identifier for `name` followed by `suffix`.
    fn mangle_name(&self, name: &str, suffix: &str) -> String;

    /// Unexported identifier for locals and arguments.
    fn var_name(&self, name: &str) -> String;

    /// Package name for `name`.
    fn package_name(&self, name: &str) -> String;

    /// File stem for `name`, without extension.
    fn file_name(&self, name: &str) -> String;

    fn type_name(&self, ty: &ir::IrType, ctx: TypeContext<'_>) -> String;

    /// Principal type used when none is configured.
    fn default_principal(&self) -> String;

    /// Expression constructing the codec for a canonical media-type name.
    fn media_codec(&self, name: &str, kind: CodecKind) -> String;

    /// Source literal for an enum value.
    fn enum_literal(&self, value: &str, base: &ir::IrType) -> String {
        match base {
            ir::IrType::String | ir::IrType::Date | ir::IrType::DateTime => format!("{value:?}"),
            _ => value.to_string(),
        }
    }
}
