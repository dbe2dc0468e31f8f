//! Configuration loading and schema definitions

mod loader;
mod schema;

pub use loader::{Config, API_URL_ENV, CONFIG_FILE};
pub use schema::*;
