//! Configuration structs grouped by concern, loaded from the environment.

use super::env_keys::{observability as obv_keys, serve as serve_keys, sketch as sketch_keys};
use super::loader::{env_bool, env_optional, env_or, env_parse};
use std::path::PathBuf;
use std::time::Duration;

/// PyScript release pinned when neither the magic line nor the environment
/// names one.
pub const DEFAULT_PYSCRIPT_VERSION: &str = "2024.11.1";

pub const DEFAULT_PORT_START: u16 = 8000;
pub const DEFAULT_PORT_END: u16 = 8099;
pub const DEFAULT_SERVER_TIMEOUT_SECS: u64 = 30;

/// Logging
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            quiet: env_bool(obv_keys::P5MAGIC_QUIET, false),
            log_level: env_or(obv_keys::P5MAGIC_LOG_LEVEL, || "p5magic=info".to_string()),
            log_json: env_bool(obv_keys::P5MAGIC_LOG_JSON, false),
        }
    }
}

/// Document generation defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchConfig {
    pub pyscript_version: String,
    pub p5_sound_addon: bool,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            pyscript_version: DEFAULT_PYSCRIPT_VERSION.to_string(),
            p5_sound_addon: false,
        }
    }
}

impl SketchConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            pyscript_version: env_or(sketch_keys::P5MAGIC_PYSCRIPT_VERSION, || {
                DEFAULT_PYSCRIPT_VERSION.to_string()
            }),
            p5_sound_addon: env_bool(sketch_keys::P5MAGIC_P5_SOUND, false),
        }
    }
}

/// Frame-mode serving: port range, lease lifetime, host overrides
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub port_start: u16,
    pub port_end: u16,
    pub lifetime: Duration,
    pub base_dir: Option<PathBuf>,
    /// "local" or "colab"; `None` means detect.
    pub host: Option<String>,
    pub proxy_url_template: Option<String>,
    /// Whether the Colab marker variable is present.
    pub colab_detected: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port_start: DEFAULT_PORT_START,
            port_end: DEFAULT_PORT_END,
            lifetime: Duration::from_secs(DEFAULT_SERVER_TIMEOUT_SECS),
            base_dir: None,
            host: None,
            proxy_url_template: None,
            colab_detected: false,
        }
    }
}

impl ServeConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            port_start: env_parse(serve_keys::P5MAGIC_PORT_START, DEFAULT_PORT_START),
            port_end: env_parse(serve_keys::P5MAGIC_PORT_END, DEFAULT_PORT_END),
            lifetime: Duration::from_secs(env_parse(
                serve_keys::P5MAGIC_SERVER_TIMEOUT_SECS,
                DEFAULT_SERVER_TIMEOUT_SECS,
            )),
            base_dir: env_optional(serve_keys::P5MAGIC_BASE_DIR).map(PathBuf::from),
            host: env_optional(serve_keys::P5MAGIC_HOST).map(|s| s.to_lowercase()),
            proxy_url_template: env_optional(serve_keys::P5MAGIC_PROXY_URL_TEMPLATE),
            colab_detected: std::env::var_os(serve_keys::COLAB_RELEASE_TAG).is_some(),
        }
    }
}
