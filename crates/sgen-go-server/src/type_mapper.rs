use heck::ToSnakeCase;
use sgen_core::ir::IrType;
use sgen_core::template::quote;
use sgen_core::{CodecKind, LanguageOpts, TypeContext};

/// Words rendered fully upper-case inside Go identifiers.
const INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "CSV", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "JWT", "LHS", "OK", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH",
    "TCP", "TLS", "TTL", "UDP", "UI", "UID", "URI", "URL", "UTF8", "UUID", "VM", "XML", "XSRF",
    "XSS",
];

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
    "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

/// Naming and typing rules for go-openapi based servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoLanguageOpts;

/// Split on anything that is not a letter or digit and on case changes.
fn words(name: &str) -> Vec<String> {
    name.to_snake_case()
        .split('_')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn go_word(word: &str) -> String {
    let upper = word.to_ascii_uppercase();
    if INITIALISMS.contains(&upper.as_str()) {
        return upper;
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Exported Go identifier, e.g. `petId` becomes `PetID`.
pub fn to_go_name(name: &str) -> String {
    let joined: String = words(name).iter().map(|w| go_word(w)).collect();
    match joined.chars().next() {
        None => "Empty".to_string(),
        Some(c) if c.is_ascii_digit() => format!("Nr{joined}"),
        Some(_) => joined,
    }
}

/// Unexported Go identifier, e.g. `PetID` becomes `petID`.
pub fn to_var_name(name: &str) -> String {
    let parts = words(name);
    let Some((first, rest)) = parts.split_first() else {
        return "empty".to_string();
    };
    let mut out = first.to_ascii_lowercase();
    for w in rest {
        out.push_str(&go_word(w));
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "nr");
    }
    if KEYWORDS.contains(&out.as_str()) {
        out = format!("var{}", go_word(&out));
    }
    out
}

impl LanguageOpts for GoLanguageOpts {
    fn mangle_name(&self, name: &str, suffix: &str) -> String {
        format!("{}{}", to_go_name(name), suffix)
    }

    fn var_name(&self, name: &str) -> String {
        to_var_name(name)
    }

    fn package_name(&self, name: &str) -> String {
        let mut pkg: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        if pkg.is_empty() {
            return "operations".to_string();
        }
        if pkg.starts_with(|c: char| c.is_ascii_digit()) {
            pkg.insert_str(0, "nr");
        }
        if KEYWORDS.contains(&pkg.as_str()) {
            pkg.push_str("ops");
        }
        pkg
    }

    fn file_name(&self, name: &str) -> String {
        let stem = words(name).join("_").to_ascii_lowercase();
        if stem.is_empty() {
            "unnamed".to_string()
        } else {
            stem
        }
    }

    fn type_name(&self, ty: &IrType, ctx: TypeContext<'_>) -> String {
        match ty {
            IrType::String => "string".to_string(),
            IrType::Int32 => "int32".to_string(),
            IrType::Int64 => "int64".to_string(),
            IrType::Float32 => "float32".to_string(),
            IrType::Float64 => "float64".to_string(),
            IrType::Boolean => "bool".to_string(),
            IrType::DateTime => "strfmt.DateTime".to_string(),
            IrType::Date => "strfmt.Date".to_string(),
            IrType::Binary | IrType::File => "io.ReadCloser".to_string(),
            IrType::Array(inner) => format!("[]{}", self.type_name(inner, ctx)),
            IrType::Map(inner) => format!("map[string]{}", self.type_name(inner, ctx)),
            IrType::Ref(name) => match ctx {
                TypeContext::Model => to_go_name(name),
                TypeContext::Operation { models_package } => {
                    format!("*{models_package}.{}", to_go_name(name))
                }
            },
            IrType::Object(_) | IrType::Any | IrType::Void => "interface{}".to_string(),
        }
    }

    fn default_principal(&self) -> String {
        "interface{}".to_string()
    }

    fn media_codec(&self, name: &str, kind: CodecKind) -> String {
        let constructor = match (name, kind) {
            ("JSON", CodecKind::Consumer) => "runtime.JSONConsumer()",
            ("JSON", CodecKind::Producer) => "runtime.JSONProducer()",
            ("XML", CodecKind::Consumer) => "runtime.XMLConsumer()",
            ("XML", CodecKind::Producer) => "runtime.XMLProducer()",
            ("Txt", CodecKind::Consumer) => "runtime.TextConsumer()",
            ("Txt", CodecKind::Producer) => "runtime.TextProducer()",
            ("Bin", CodecKind::Consumer) => "runtime.ByteStreamConsumer()",
            ("Bin", CodecKind::Producer) => "runtime.ByteStreamProducer()",
            ("CSV", CodecKind::Consumer) => "runtime.CSVConsumer()",
            ("CSV", CodecKind::Producer) => "runtime.CSVProducer()",
            (_, CodecKind::Consumer) => "runtime.DiscardConsumer",
            (_, CodecKind::Producer) => "runtime.DiscardProducer",
        };
        constructor.to_string()
    }

    fn enum_literal(&self, value: &str, base: &IrType) -> String {
        match base {
            IrType::String | IrType::Date | IrType::DateTime => quote(value.to_string()),
            _ => value.to_string(),
        }
    }
}
