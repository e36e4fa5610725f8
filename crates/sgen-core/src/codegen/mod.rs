mod app;
mod builder;
pub mod media;
pub mod routes;

pub use app::*;
pub use builder::{DEFAULT_APP_NAME, build_app, status_suffix};
pub use media::MediaTypeEntry;
