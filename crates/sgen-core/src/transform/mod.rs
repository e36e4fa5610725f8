pub mod name_normalizer;
pub mod schema_resolver;

pub use name_normalizer::{normalize_name, route_to_name};
pub use schema_resolver::{parameter_to_ir_type, schema_or_ref_to_ir_schema, schema_or_ref_to_ir_type};
