use indexmap::IndexMap;

use crate::ir::{
    IrAliasSchema, IrEnumSchema, IrField, IrObjectSchema, IrSchema, IrType,
};
use crate::parse::parameter::{Items, Parameter};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

use super::name_normalizer::normalize_name;

/// Convert a parsed `SchemaOrRef` to an `IrType`.
pub fn schema_or_ref_to_ir_type(schema_or_ref: &SchemaOrRef) -> IrType {
    match schema_or_ref {
        SchemaOrRef::Ref { .. } => {
            let name = schema_or_ref.ref_name().unwrap_or("Unknown");
            IrType::Ref(normalize_name(name).pascal_case)
        }
        SchemaOrRef::Schema(schema) => schema_to_ir_type(schema),
    }
}

/// Convert a parsed `Schema` to an `IrType`.
pub fn schema_to_ir_type(schema: &Schema) -> IrType {
    if !schema.all_of.is_empty() {
        if schema.all_of.len() == 1 && schema.properties.is_empty() {
            return schema_or_ref_to_ir_type(&schema.all_of[0]);
        }
        // Composite inline shapes have no name to hang a type on.
        return IrType::Any;
    }

    match schema.schema_type.as_ref().and_then(|t| t.primary()) {
        Some(SchemaType::String) => string_type(schema.format.as_deref()),
        Some(SchemaType::Integer) => integer_type(schema.format.as_deref()),
        Some(SchemaType::Number) => number_type(schema.format.as_deref()),
        Some(SchemaType::Boolean) => IrType::Boolean,
        Some(SchemaType::File) => IrType::File,
        Some(SchemaType::Null) => IrType::Any,
        Some(SchemaType::Array) => match &schema.items {
            Some(items) => IrType::Array(Box::new(schema_or_ref_to_ir_type(items))),
            None => IrType::Array(Box::new(IrType::Any)),
        },
        Some(SchemaType::Object) => resolve_object_type(schema),
        None => {
            // No type specified; check if it has properties (implicit object)
            if !schema.properties.is_empty() || schema.additional_properties.is_some() {
                resolve_object_type(schema)
            } else if let Some(items) = &schema.items {
                IrType::Array(Box::new(schema_or_ref_to_ir_type(items)))
            } else {
                IrType::Any
            }
        }
    }
}

fn string_type(format: Option<&str>) -> IrType {
    match format {
        Some("date-time") => IrType::DateTime,
        Some("date") => IrType::Date,
        Some("binary") => IrType::Binary,
        _ => IrType::String,
    }
}

fn integer_type(format: Option<&str>) -> IrType {
    match format {
        Some("int32") => IrType::Int32,
        _ => IrType::Int64,
    }
}

fn number_type(format: Option<&str>) -> IrType {
    match format {
        Some("float") => IrType::Float32,
        _ => IrType::Float64,
    }
}

fn resolve_object_type(schema: &Schema) -> IrType {
    if schema.properties.is_empty() {
        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(s)) => {
                IrType::Map(Box::new(schema_or_ref_to_ir_type(s)))
            }
            Some(AdditionalProperties::Bool(true)) => IrType::Map(Box::new(IrType::Any)),
            Some(AdditionalProperties::Bool(false)) | None => IrType::Any,
        }
    } else {
        let fields: Vec<(String, IrType, bool)> = schema
            .properties
            .iter()
            .map(|(name, prop)| {
                let required = schema.required.contains(name);
                (name.clone(), schema_or_ref_to_ir_type(prop), required)
            })
            .collect();
        IrType::Object(fields)
    }
}

/// Type of a simple (non-body) parameter, from its `type`/`format`/`items`.
/// Body parameters take the type of their schema.
pub fn parameter_to_ir_type(param: &Parameter) -> IrType {
    if let Some(schema) = &param.schema {
        return schema_or_ref_to_ir_type(schema);
    }
    simple_type(
        param.param_type.as_deref(),
        param.format.as_deref(),
        param.items.as_ref(),
    )
}

/// Type of an `items` declaration on a simple parameter or header.
pub fn items_to_ir_type(items: &Items) -> IrType {
    simple_type(
        items.item_type.as_deref(),
        items.format.as_deref(),
        items.items.as_deref(),
    )
}

fn simple_type(type_name: Option<&str>, format: Option<&str>, items: Option<&Items>) -> IrType {
    match type_name {
        Some("string") => string_type(format),
        Some("integer") => integer_type(format),
        Some("number") => number_type(format),
        Some("boolean") => IrType::Boolean,
        Some("file") => IrType::File,
        Some("array") => match items {
            Some(items) => IrType::Array(Box::new(items_to_ir_type(items))),
            None => IrType::Array(Box::new(IrType::String)),
        },
        _ => IrType::Any,
    }
}

/// Convert a named definition to an `IrSchema`.
pub fn schema_or_ref_to_ir_schema(name: &str, schema_or_ref: &SchemaOrRef) -> IrSchema {
    match schema_or_ref {
        SchemaOrRef::Ref { .. } => IrSchema::Alias(IrAliasSchema {
            name: normalize_name(name),
            description: None,
            target: schema_or_ref_to_ir_type(schema_or_ref),
        }),
        SchemaOrRef::Schema(schema) => schema_to_ir_schema(name, schema),
    }
}

/// Convert a named `Schema` to an `IrSchema`.
pub fn schema_to_ir_schema(name: &str, schema: &Schema) -> IrSchema {
    let normalized = normalize_name(name);

    if !schema.enum_values.is_empty() {
        let variants = schema
            .enum_values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        let base = match schema_to_ir_type(schema) {
            IrType::Any => IrType::String,
            other => other,
        };
        return IrSchema::Enum(IrEnumSchema {
            name: normalized,
            description: schema.description.clone(),
            base,
            variants,
        });
    }

    // allOf: references become embedded definitions, inline parts merge into fields
    if !schema.all_of.is_empty() {
        let extends = schema
            .all_of
            .iter()
            .filter_map(|s| s.ref_name().map(|n| normalize_name(n).pascal_case))
            .collect();
        return IrSchema::Object(IrObjectSchema {
            name: normalized,
            description: schema.description.clone(),
            fields: merge_all_of(&schema.all_of, &schema.properties, &schema.required),
            additional_properties: None,
            extends,
            discriminator: schema.discriminator.clone(),
        });
    }

    let is_object = matches!(
        schema.schema_type.as_ref().and_then(|t| t.primary()),
        Some(SchemaType::Object) | None
    );
    if is_object && (!schema.properties.is_empty() || schema.discriminator.is_some()) {
        let additional = schema
            .additional_properties
            .as_ref()
            .and_then(|ap| match ap {
                AdditionalProperties::Schema(s) => Some(schema_or_ref_to_ir_type(s)),
                AdditionalProperties::Bool(true) => Some(IrType::Any),
                AdditionalProperties::Bool(false) => None,
            });
        return IrSchema::Object(IrObjectSchema {
            name: normalized,
            description: schema.description.clone(),
            fields: build_fields(&schema.properties, &schema.required),
            additional_properties: additional,
            extends: Vec::new(),
            discriminator: schema.discriminator.clone(),
        });
    }

    // Simple alias (string, number, array, map, etc.)
    IrSchema::Alias(IrAliasSchema {
        name: normalized,
        description: schema.description.clone(),
        target: schema_to_ir_type(schema),
    })
}

fn build_fields(properties: &IndexMap<String, SchemaOrRef>, required: &[String]) -> Vec<IrField> {
    properties
        .iter()
        .map(|(name, prop)| {
            let (description, read_only) = match prop {
                SchemaOrRef::Schema(s) => (s.description.clone(), s.read_only.unwrap_or(false)),
                SchemaOrRef::Ref { .. } => (None, false),
            };
            IrField {
                name: normalize_name(name),
                original_name: name.clone(),
                field_type: schema_or_ref_to_ir_type(prop),
                required: required.contains(name),
                description,
                read_only,
            }
        })
        .collect()
}

fn merge_all_of(
    all_of: &[SchemaOrRef],
    extra_properties: &IndexMap<String, SchemaOrRef>,
    extra_required: &[String],
) -> Vec<IrField> {
    let mut fields = Vec::new();

    for item in all_of {
        if let SchemaOrRef::Schema(schema) = item {
            fields.extend(build_fields(&schema.properties, &schema.required));
            if !schema.all_of.is_empty() {
                fields.extend(merge_all_of(&schema.all_of, &IndexMap::new(), &[]));
            }
        }
    }

    fields.extend(build_fields(extra_properties, extra_required));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parameter::ParameterLocation;

    fn schema(json: serde_json::Value) -> Schema {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_formats() {
        let s = schema(serde_json::json!({"type": "string", "format": "date-time"}));
        assert_eq!(schema_to_ir_type(&s), IrType::DateTime);
        let s = schema(serde_json::json!({"type": "integer", "format": "int32"}));
        assert_eq!(schema_to_ir_type(&s), IrType::Int32);
        let s = schema(serde_json::json!({"type": "number"}));
        assert_eq!(schema_to_ir_type(&s), IrType::Float64);
    }

    #[test]
    fn test_array_of_refs() {
        let s = schema(serde_json::json!({
            "type": "array",
            "items": {"$ref": "#/definitions/pet-tag"}
        }));
        assert_eq!(
            schema_to_ir_type(&s),
            IrType::Array(Box::new(IrType::Ref("PetTag".to_string())))
        );
    }

    #[test]
    fn test_map_type() {
        let s = schema(serde_json::json!({
            "type": "object",
            "additionalProperties": {"type": "integer"}
        }));
        assert_eq!(schema_to_ir_type(&s), IrType::Map(Box::new(IrType::Int64)));
    }

    #[test]
    fn test_simple_parameter_array() {
        let param = Parameter {
            name: "ids".to_string(),
            location: ParameterLocation::Query,
            description: None,
            required: false,
            schema: None,
            param_type: Some("array".to_string()),
            format: None,
            items: Some(Items {
                item_type: Some("integer".to_string()),
                format: Some("int32".to_string()),
                ..Items::default()
            }),
            collection_format: Some("csv".to_string()),
            allow_empty_value: None,
            default_value: None,
            enum_values: Vec::new(),
            minimum: None,
            maximum: None,
            max_length: None,
            min_length: None,
            pattern: None,
        };
        assert_eq!(
            parameter_to_ir_type(&param),
            IrType::Array(Box::new(IrType::Int32))
        );
    }

    #[test]
    fn test_all_of_subtype() {
        let s = schema(serde_json::json!({
            "allOf": [
                {"$ref": "#/definitions/Pet"},
                {"type": "object", "properties": {"packSize": {"type": "integer"}}, "required": ["packSize"]}
            ]
        }));
        match schema_to_ir_schema("Dog", &s) {
            IrSchema::Object(obj) => {
                assert_eq!(obj.extends, vec!["Pet".to_string()]);
                assert_eq!(obj.fields.len(), 1);
                assert!(obj.fields[0].required);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_discriminated_base() {
        let s = schema(serde_json::json!({
            "type": "object",
            "discriminator": "petType",
            "properties": {"petType": {"type": "string"}, "name": {"type": "string"}},
            "required": ["petType"]
        }));
        match schema_to_ir_schema("Pet", &s) {
            IrSchema::Object(obj) => {
                assert_eq!(obj.discriminator.as_deref(), Some("petType"));
                assert_eq!(obj.fields.len(), 2);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_enum_definition() {
        let s = schema(serde_json::json!({"type": "string", "enum": ["available", "sold"]}));
        match schema_to_ir_schema("PetStatus", &s) {
            IrSchema::Enum(e) => {
                assert_eq!(e.variants, vec!["available", "sold"]);
                assert_eq!(e.base, IrType::String);
            }
            other => panic!("expected enum, got {other:?}"),
        }
    }
}
