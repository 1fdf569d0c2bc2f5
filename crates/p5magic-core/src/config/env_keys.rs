//! Environment variable key constants.

/// Logging
pub mod observability {
    pub const P5MAGIC_QUIET: &str = "P5MAGIC_QUIET";
    pub const P5MAGIC_LOG_LEVEL: &str = "P5MAGIC_LOG_LEVEL";
    pub const P5MAGIC_LOG_JSON: &str = "P5MAGIC_LOG_JSON";
}

/// Document generation
pub mod sketch {
    /// PyScript release used when the magic line gives no version (or `none`).
    pub const P5MAGIC_PYSCRIPT_VERSION: &str = "P5MAGIC_PYSCRIPT_VERSION";
    /// Legacy p5 bundle: also load the p5.sound addon.
    pub const P5MAGIC_P5_SOUND: &str = "P5MAGIC_P5_SOUND";
}

/// Frame-mode file server
pub mod serve {
    pub const P5MAGIC_PORT_START: &str = "P5MAGIC_PORT_START";
    pub const P5MAGIC_PORT_END: &str = "P5MAGIC_PORT_END";
    pub const P5MAGIC_SERVER_TIMEOUT_SECS: &str = "P5MAGIC_SERVER_TIMEOUT_SECS";
    pub const P5MAGIC_BASE_DIR: &str = "P5MAGIC_BASE_DIR";

    /// Force the host kind: "local" or "colab".
    pub const P5MAGIC_HOST: &str = "P5MAGIC_HOST";
    /// Reverse-proxy URL with a `{port}` placeholder, used under Colab.
    pub const P5MAGIC_PROXY_URL_TEMPLATE: &str = "P5MAGIC_PROXY_URL_TEMPLATE";

    /// Set by the Colab runtime; its presence marks a Colab kernel.
    pub const COLAB_RELEASE_TAG: &str = "COLAB_RELEASE_TAG";
}
