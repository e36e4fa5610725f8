use serde::Serialize;

use super::types::NormalizedName;

/// A definition resolved into a language-neutral shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrSchema {
    Object(IrObjectSchema),
    Enum(IrEnumSchema),
    Alias(IrAliasSchema),
}

/// An object schema with typed fields.
#[derive(Debug, Clone, Serialize)]
pub struct IrObjectSchema {
    pub name: NormalizedName,
    pub description: Option<String>,
    pub fields: Vec<IrField>,
    pub additional_properties: Option<IrType>,
    /// Definitions this one extends through `allOf` references.
    pub extends: Vec<String>,
    /// Property naming the concrete subtype of a polymorphic base.
    pub discriminator: Option<String>,
}

/// A field on an object schema.
#[derive(Debug, Clone, Serialize)]
pub struct IrField {
    pub name: NormalizedName,
    pub original_name: String,
    pub field_type: IrType,
    pub required: bool,
    pub description: Option<String>,
    pub read_only: bool,
}

/// An enum schema. Values keep their JSON spelling.
#[derive(Debug, Clone, Serialize)]
pub struct IrEnumSchema {
    pub name: NormalizedName,
    pub description: Option<String>,
    pub base: IrType,
    pub variants: Vec<String>,
}

/// A type alias (e.g., `type Tags []string`).
#[derive(Debug, Clone, Serialize)]
pub struct IrAliasSchema {
    pub name: NormalizedName,
    pub description: Option<String>,
    pub target: IrType,
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IrType {
    String,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    DateTime,
    Date,
    Binary,
    File,
    Array(Box<IrType>),
    Object(Vec<(String, IrType, bool)>), // inline object: (name, type, required)
    Map(Box<IrType>),                    // string-keyed map
    Ref(String),                         // reference to a named definition (PascalCase)
    Any,
    Void,
}
