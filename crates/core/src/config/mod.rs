//! Tool configuration loading and schema definitions

mod loader;
mod schema;

pub use loader::{expand_path, Config};
pub use schema::*;
