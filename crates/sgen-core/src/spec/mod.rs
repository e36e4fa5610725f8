pub mod analysis;
pub mod document;
pub mod expand;
pub mod loader;
pub mod validate;

pub use analysis::{Analysis, AnalyzedOperation};
pub use document::Document;
pub use expand::{DocLoader, FileDocLoader};
pub use loader::load;
pub use validate::validate;
