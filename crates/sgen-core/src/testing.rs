use heck::{ToLowerCamelCase, ToPascalCase, ToSnakeCase};

use crate::ir::IrType;
use crate::{CodecKind, LanguageOpts, TypeContext};

/// Minimal naming rules for unit tests that need a `LanguageOpts`.
pub(crate) struct PlainLanguage;

impl LanguageOpts for PlainLanguage {
    fn mangle_name(&self, name: &str, suffix: &str) -> String {
        format!("{}{}", name.to_pascal_case(), suffix)
    }

    fn var_name(&self, name: &str) -> String {
        name.to_lower_camel_case()
    }

    fn package_name(&self, name: &str) -> String {
        name.to_snake_case()
    }

    fn file_name(&self, name: &str) -> String {
        name.to_snake_case()
    }

    fn type_name(&self, ty: &IrType, ctx: TypeContext<'_>) -> String {
        match (ty, ctx) {
            (IrType::Ref(name), TypeContext::Operation { models_package }) => {
                format!("{models_package}.{name}")
            }
            (IrType::Ref(name), TypeContext::Model) => name.clone(),
            (IrType::Array(inner), ctx) => format!("[{}]", self.type_name(inner, ctx)),
            (other, _) => format!("{other:?}").to_lowercase(),
        }
    }

    fn default_principal(&self) -> String {
        "any".to_string()
    }

    fn media_codec(&self, name: &str, kind: CodecKind) -> String {
        format!("{name}/{kind}")
    }
}
