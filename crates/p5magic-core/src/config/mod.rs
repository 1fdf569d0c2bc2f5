//! Unified configuration layer.
//!
//! Every environment variable read lives here; the other crates access
//! structured config instead of calling `std::env::var` directly.
//!
//! - `loader`: env_or, env_optional, env_bool, env_parse helpers
//! - `schema`: ObservabilityConfig, SketchConfig, ServeConfig
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, env_parse, load_dotenv};
pub use schema::{ObservabilityConfig, ServeConfig, SketchConfig};
