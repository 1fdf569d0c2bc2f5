//! `run` / `gen`: the two cell magics.

use std::io::Read;

use anyhow::{Context, Result};
use p5magic_serve::{DisplayMode, Dispatcher, FrameSize, TerminalDisplay};
use p5magic_sketch::{build_document, OptionParser};

/// Inputs of one magic invocation.
#[derive(Debug, Clone)]
pub struct MagicInvocation {
    pub args: Vec<String>,
    pub line: Option<String>,
    pub cell: Option<String>,
    pub json: bool,
}

impl MagicInvocation {
    /// The magic line as the option parser expects it. Separate ARGS are
    /// re-quoted so words containing spaces survive the split.
    pub fn magic_line(&self) -> Result<String> {
        if let Some(line) = &self.line {
            return Ok(line.clone());
        }
        shlex::try_join(self.args.iter().map(String::as_str))
            .context("Failed to quote magic arguments")
    }

    pub fn read_cell(&self) -> Result<String> {
        match self.cell.as_deref() {
            None | Some("-") => {
                let mut s = String::new();
                std::io::stdin()
                    .read_to_string(&mut s)
                    .context("Failed to read cell body from stdin")?;
                Ok(s)
            }
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read cell body from {}", path)),
        }
    }
}

pub fn run_magic(invocation: &MagicInvocation, mode: DisplayMode) -> Result<()> {
    let line = invocation.magic_line()?;
    let cell = invocation.read_cell()?;

    let parser = OptionParser::from_env();
    let (opts, doc) = build_document(&parser, &line, &cell)?;
    tracing::debug!(?mode, bytes = doc.as_str().len(), "Built sketch page");

    let dispatcher = Dispatcher::from_env()?;
    let lease = {
        let stdout = std::io::stdout();
        let mut display = TerminalDisplay::new(stdout.lock(), invocation.json);
        dispatcher.dispatch(&doc, FrameSize::from(&opts), mode, &mut display)?
    };

    if let Some(lease) = lease {
        tracing::info!(
            file = lease.file_name(),
            port = lease.port(),
            until = %lease.expires_at().format("%H:%M:%S"),
            "Serving sketch (Ctrl-C to stop)"
        );
        lease.wait();
        tracing::info!("Sketch server stopped");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(args: &[&str], line: Option<&str>, cell: Option<String>) -> MagicInvocation {
        MagicInvocation {
            args: args.iter().map(|s| s.to_string()).collect(),
            line: line.map(str::to_string),
            cell,
            json: false,
        }
    }

    #[test]
    fn test_magic_line_requotes_args() {
        let inv = invocation(&["400", "300", "light blue", "false"], None, None);
        let line = inv.magic_line().unwrap();
        let opts = OptionParser::default().parse(&line).unwrap();
        assert_eq!(opts.background(), "light blue");
        assert!(!opts.global_mode());
    }

    #[test]
    fn test_explicit_line_wins() {
        let inv = invocation(&[], Some("640 480 black"), None);
        assert_eq!(inv.magic_line().unwrap(), "640 480 black");
    }

    #[test]
    fn test_read_cell_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sketch.py");
        std::fs::write(&path, "def draw():\n    pass\n").unwrap();

        let inv = invocation(&[], None, Some(path.to_string_lossy().to_string()));
        assert_eq!(inv.read_cell().unwrap(), "def draw():\n    pass\n");

        let missing = invocation(&[], None, Some(tmp.path().join("nope.py").to_string_lossy().to_string()));
        assert!(missing.read_cell().is_err());
    }
}
