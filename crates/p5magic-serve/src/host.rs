//! Notebook host environments.
//!
//! The host decides where the temp page is written and which URL the
//! notebook front end can reach the lease under. Plain Jupyter sees
//! `localhost` directly; Colab only reaches kernel ports through its
//! reverse proxy.

use std::path::PathBuf;

use p5magic_core::config::ServeConfig;
use p5magic_core::{MagicError, Result};

/// Colab's working directory for notebook files.
pub const COLAB_BASE_DIR: &str = "/content";

pub trait HostEnvironment: Send + Sync {
    fn name(&self) -> &'static str;

    /// Directory the temp page is written to.
    fn base_dir(&self) -> Result<PathBuf>;

    /// Base URL (no trailing slash) under which `port` is reachable from the
    /// notebook front end.
    fn external_url(&self, port: u16) -> Result<String>;
}

/// Local Jupyter: notebook working directory, direct localhost URL.
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    base_dir: Option<PathBuf>,
}

impl LocalHost {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }
}

impl HostEnvironment for LocalHost {
    fn name(&self) -> &'static str {
        "local"
    }

    fn base_dir(&self) -> Result<PathBuf> {
        match &self.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    fn external_url(&self, port: u16) -> Result<String> {
        Ok(format!("http://localhost:{}", port))
    }
}

/// Google Colab: `/content`, URL from the kernel proxy.
///
/// The proxy address is only known to the Colab front end, so it has to be
/// supplied as a template with a `{port}` placeholder.
#[derive(Debug, Clone)]
pub struct ColabHost {
    base_dir: PathBuf,
    proxy_url_template: Option<String>,
}

impl ColabHost {
    pub fn new(base_dir: Option<PathBuf>, proxy_url_template: Option<String>) -> Self {
        Self {
            base_dir: base_dir.unwrap_or_else(|| PathBuf::from(COLAB_BASE_DIR)),
            proxy_url_template,
        }
    }
}

impl HostEnvironment for ColabHost {
    fn name(&self) -> &'static str {
        "colab"
    }

    fn base_dir(&self) -> Result<PathBuf> {
        Ok(self.base_dir.clone())
    }

    fn external_url(&self, port: u16) -> Result<String> {
        let template = self.proxy_url_template.as_deref().ok_or_else(|| {
            MagicError::Host(
                "Colab proxy URL is unknown; set P5MAGIC_PROXY_URL_TEMPLATE (e.g. https://{port}-<id>.colab.googleusercontent.com)"
                    .to_string(),
            )
        })?;
        if !template.contains("{port}") {
            return Err(MagicError::Host(format!(
                "proxy URL template '{}' has no {{port}} placeholder",
                template
            )));
        }
        Ok(template
            .replace("{port}", &port.to_string())
            .trim_end_matches('/')
            .to_string())
    }
}

/// Pick the host from config: an explicit `P5MAGIC_HOST` wins, otherwise the
/// Colab marker variable decides.
pub fn detect_host(cfg: &ServeConfig) -> Box<dyn HostEnvironment> {
    let colab = match cfg.host.as_deref() {
        Some("colab") => true,
        Some("local") => false,
        Some(other) => {
            tracing::warn!(host = other, "Unknown P5MAGIC_HOST, detecting instead");
            cfg.colab_detected
        }
        None => cfg.colab_detected,
    };
    let host: Box<dyn HostEnvironment> = if colab {
        Box::new(ColabHost::new(
            cfg.base_dir.clone(),
            cfg.proxy_url_template.clone(),
        ))
    } else {
        Box::new(LocalHost::new(cfg.base_dir.clone()))
    };
    tracing::debug!(host = host.name(), "Resolved notebook host");
    host
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_host_url_and_dir() {
        let host = LocalHost::new(Some(PathBuf::from("/tmp/nb")));
        assert_eq!(host.external_url(8001).unwrap(), "http://localhost:8001");
        assert_eq!(host.base_dir().unwrap(), PathBuf::from("/tmp/nb"));
    }

    #[test]
    fn test_colab_proxy_template() {
        let host = ColabHost::new(None, Some("https://{port}-abc.colab.dev/".to_string()));
        assert_eq!(host.base_dir().unwrap(), PathBuf::from(COLAB_BASE_DIR));
        assert_eq!(host.external_url(8003).unwrap(), "https://8003-abc.colab.dev");
    }

    #[test]
    fn test_colab_without_bridge_is_host_error() {
        let host = ColabHost::new(None, None);
        assert!(matches!(host.external_url(8000), Err(MagicError::Host(_))));

        let host = ColabHost::new(None, Some("https://proxy.example".to_string()));
        assert!(matches!(host.external_url(8000), Err(MagicError::Host(_))));
    }

    #[test]
    fn test_detect_host() {
        let mut cfg = ServeConfig::default();
        assert_eq!(detect_host(&cfg).name(), "local");

        cfg.colab_detected = true;
        assert_eq!(detect_host(&cfg).name(), "colab");

        cfg.host = Some("local".to_string());
        assert_eq!(detect_host(&cfg).name(), "local");

        cfg.colab_detected = false;
        cfg.host = Some("colab".to_string());
        assert_eq!(detect_host(&cfg).name(), "colab");
    }
}
