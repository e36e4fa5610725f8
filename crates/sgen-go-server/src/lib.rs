pub mod formatter;
pub mod generator;
pub mod templates;
pub mod type_mapper;

pub use formatter::GoFormatter;
pub use generator::GoServerGenerator;
pub use templates::{registry, try_registry};
pub use type_mapper::GoLanguageOpts;
