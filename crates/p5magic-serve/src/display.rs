//! Display dispatch: inline markup (preview) or served frame.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use p5magic_core::config::ServeConfig;
use p5magic_core::Result;
use p5magic_sketch::{GeneratedDocument, SketchOptions};
use serde_json::json;
use uuid::Uuid;

use crate::host::{detect_host, HostEnvironment};
use crate::lease::ServerLease;
use crate::port::{find_free_port, PortRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Show the generated markup as text (genp5).
    Preview,
    /// Serve the page and embed it in a frame (runp5).
    Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl From<&SketchOptions> for FrameSize {
    fn from(opts: &SketchOptions) -> Self {
        Self {
            width: opts.width(),
            height: opts.height(),
        }
    }
}

/// Notebook rendering primitives.
pub trait NotebookDisplay {
    fn show_text(&mut self, text: &str) -> Result<()>;
    fn show_frame(&mut self, url: &str, size: FrameSize) -> Result<()>;
}

pub fn iframe_markup(url: &str, size: FrameSize) -> String {
    format!(
        "<iframe src=\"{}\" width=\"{}\" height=\"{}\" frameborder=\"0\" allowfullscreen></iframe>",
        url.replace('"', "&quot;"),
        size.width,
        size.height
    )
}

/// Writes to a terminal or pipe. With `json`, each display is one Jupyter
/// MIME bundle per line so a kernel wrapper can forward it as display_data.
pub struct TerminalDisplay<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NotebookDisplay for TerminalDisplay<W> {
    fn show_text(&mut self, text: &str) -> Result<()> {
        if self.json {
            let bundle = json!({ "text/plain": text });
            writeln!(self.out, "{}", bundle)?;
        } else {
            self.out.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn show_frame(&mut self, url: &str, size: FrameSize) -> Result<()> {
        let iframe = iframe_markup(url, size);
        if self.json {
            let bundle = json!({ "text/html": iframe, "text/plain": url });
            writeln!(self.out, "{}", bundle)?;
        } else {
            writeln!(self.out, "{}", iframe)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

pub struct Dispatcher {
    host: Box<dyn HostEnvironment>,
    ports: PortRange,
    lifetime: Duration,
}

impl Dispatcher {
    pub fn new(host: Box<dyn HostEnvironment>, ports: PortRange, lifetime: Duration) -> Self {
        Self {
            host,
            ports,
            lifetime,
        }
    }

    pub fn from_config(cfg: &ServeConfig) -> Result<Self> {
        Ok(Self::new(
            detect_host(cfg),
            PortRange::from_config(cfg)?,
            cfg.lifetime,
        ))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&ServeConfig::from_env())
    }

    /// Show `doc`. Frame mode returns the lease of the server it started.
    ///
    /// Frame-mode steps run in an order that leaves nothing behind on
    /// failure: port search and URL resolution happen before the file is
    /// written, and a failed bind removes the file again.
    pub fn dispatch(
        &self,
        doc: &GeneratedDocument,
        size: FrameSize,
        mode: DisplayMode,
        display: &mut dyn NotebookDisplay,
    ) -> Result<Option<ServerLease>> {
        match mode {
            DisplayMode::Preview => {
                display.show_text(doc.as_str())?;
                Ok(None)
            }
            DisplayMode::Frame => self.serve_frame(doc, size, display).map(Some),
        }
    }

    fn serve_frame(
        &self,
        doc: &GeneratedDocument,
        size: FrameSize,
        display: &mut dyn NotebookDisplay,
    ) -> Result<ServerLease> {
        let port = find_free_port(self.ports)?;
        let base_url = self.host.external_url(port)?;
        let file_path = self.temp_page_path()?;

        std::fs::write(&file_path, doc)?;
        let lease = match ServerLease::start(file_path.clone(), port, self.lifetime) {
            Ok(lease) => lease,
            Err(e) => {
                let _ = std::fs::remove_file(&file_path);
                return Err(e);
            }
        };

        let url = format!("{}/{}", base_url, lease.file_name());
        tracing::info!(url = %url, host = self.host.name(), "Displaying sketch frame");
        display.show_frame(&url, size)?;
        Ok(lease)
    }

    fn temp_page_path(&self) -> Result<PathBuf> {
        let dir = self.host.base_dir()?;
        Ok(dir.join(format!("p5magic-{}.html", Uuid::new_v4().simple())))
    }
}
