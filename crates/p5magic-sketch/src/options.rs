//! Positional option parser for the `%%runp5` / `%%genp5` magic line.
//!
//! Usage: `[width] [height] [background] [p5_global] [p5_type] [p5play_use]
//! [py_type] [py_conf] [js_src] [py_ver]`
//!
//! Arguments are positional and shell-quoted. Missing trailing arguments take
//! their defaults; an earlier argument cannot be skipped on its own.

use std::borrow::Cow;
use std::fmt;

use p5magic_core::config::SketchConfig;
use p5magic_core::{MagicError, Result};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 500;
pub const DEFAULT_BACKGROUND: &str = "white";

/// Number of positional fields the magic line understands.
const FIELD_COUNT: usize = 10;

/// JavaScript drawing library bundled into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    P5,
    Q5,
}

impl LibraryKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "p5" => Ok(LibraryKind::P5),
            "q5" => Ok(LibraryKind::Q5),
            other => Err(MagicError::invalid(
                "p5_type",
                format!("'{}' is not a library kind (use p5 or q5)", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryKind::P5 => "p5",
            LibraryKind::Q5 => "q5",
        }
    }
}

/// PyScript interpreter flavor. The string form is also the script type and
/// the config tag prefix (`<py-config>`, `<mpy-config>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// CPython-compatible (Pyodide)
    Py,
    /// MicroPython
    Mpy,
}

impl RuntimeKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "py" => Ok(RuntimeKind::Py),
            "mpy" => Ok(RuntimeKind::Mpy),
            other => Err(MagicError::invalid(
                "py_type",
                format!("'{}' is not a runtime kind (use py or mpy)", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Py => "py",
            RuntimeKind::Mpy => "mpy",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated options for one sketch.
///
/// Fields are private so the global-mode invariant cannot be broken after
/// construction: global mode always runs on MicroPython, because the hook
/// shim is only written for that runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SketchOptions {
    width: u32,
    height: u32,
    background: String,
    global_mode: bool,
    library: LibraryKind,
    physics_addon: bool,
    sound_addon: bool,
    runtime: RuntimeKind,
    runtime_config: Option<Value>,
    extra_scripts: Option<Vec<String>>,
    runtime_version: String,
}

impl SketchOptions {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn global_mode(&self) -> bool {
        self.global_mode
    }

    pub fn library(&self) -> LibraryKind {
        self.library
    }

    pub fn physics_addon(&self) -> bool {
        self.physics_addon
    }

    pub fn sound_addon(&self) -> bool {
        self.sound_addon
    }

    /// Runtime the page will actually use.
    pub fn runtime(&self) -> RuntimeKind {
        if self.global_mode {
            RuntimeKind::Mpy
        } else {
            self.runtime
        }
    }

    pub fn runtime_config(&self) -> Option<&Value> {
        self.runtime_config.as_ref()
    }

    pub fn extra_scripts(&self) -> &[String] {
        self.extra_scripts.as_deref().unwrap_or(&[])
    }

    pub fn runtime_version(&self) -> &str {
        &self.runtime_version
    }

    pub fn with_global_mode(mut self, global_mode: bool) -> Self {
        self.global_mode = global_mode;
        if global_mode {
            self.runtime = RuntimeKind::Mpy;
        }
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeKind) -> Self {
        self.runtime = if self.global_mode {
            RuntimeKind::Mpy
        } else {
            runtime
        };
        self
    }
}

/// Parser holding the configurable defaults (PyScript version, p5.sound).
#[derive(Debug, Clone, Default)]
pub struct OptionParser {
    config: SketchConfig,
}

impl OptionParser {
    pub fn new(config: SketchConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(SketchConfig::from_env())
    }

    /// Options produced by an empty magic line.
    pub fn defaults(&self) -> SketchOptions {
        SketchOptions {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
            global_mode: true,
            library: LibraryKind::Q5,
            physics_addon: false,
            sound_addon: self.config.p5_sound_addon,
            runtime: RuntimeKind::Mpy,
            runtime_config: None,
            extra_scripts: None,
            runtime_version: self.config.pyscript_version.clone(),
        }
    }

    /// Parse a shell-quoted magic line into validated options.
    pub fn parse(&self, line: &str) -> Result<SketchOptions> {
        let args = shlex::split(&escape_leading_hashes(line))
            .ok_or_else(|| MagicError::invalid("line", "unbalanced quotes in magic line"))?;
        if args.len() > FIELD_COUNT {
            tracing::warn!(
                extra = args.len() - FIELD_COUNT,
                "Ignoring trailing magic arguments"
            );
        }
        let arg = |i: usize| args.get(i).map(String::as_str);

        let mut opts = self.defaults();
        if let Some(w) = arg(0) {
            opts.width = parse_dimension("width", w)?;
        }
        if let Some(h) = arg(1) {
            opts.height = parse_dimension("height", h)?;
        }
        if let Some(bg) = arg(2) {
            opts.background = bg.to_string();
        }
        if let Some(g) = arg(3) {
            opts.global_mode = parse_flag(g);
        }
        if let Some(t) = arg(4) {
            opts.library = LibraryKind::parse(t)?;
        }
        if let Some(p) = arg(5) {
            opts.physics_addon = parse_flag(p);
        }
        if let Some(r) = arg(6) {
            opts.runtime = RuntimeKind::parse(r)?;
        }
        if let Some(conf) = arg(7) {
            opts.runtime_config = parse_runtime_config(conf)?;
        }
        if let Some(src) = arg(8) {
            opts.extra_scripts = parse_extra_scripts(src)?;
        }
        if let Some(ver) = arg(9) {
            if !ver.eq_ignore_ascii_case("none") && !ver.trim().is_empty() {
                opts.runtime_version = ver.to_string();
            }
        }
        if opts.global_mode {
            opts.runtime = RuntimeKind::Mpy;
        }

        tracing::debug!(
            options = %serde_json::to_string(&opts).unwrap_or_default(),
            "Parsed magic line"
        );
        Ok(opts)
    }
}

/// Parse with config taken from the environment.
pub fn parse_magic_line(line: &str) -> Result<SketchOptions> {
    OptionParser::from_env().parse(line)
}

/// `shlex` treats an unquoted `#` at the start of a word as a comment and
/// drops the rest of the line. Magic lines have no comments (`#202020` is a
/// background), so such a `#` is backslash-escaped before splitting.
fn escape_leading_hashes(line: &str) -> Cow<'_, str> {
    if !line.contains('#') {
        return Cow::Borrowed(line);
    }
    let mut out = String::with_capacity(line.len() + 4);
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut word_start = true;
    for c in line.chars() {
        if escaped {
            escaped = false;
            word_start = false;
            out.push(c);
            continue;
        }
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                }
            }
            Some(_) => match c {
                '\\' => escaped = true,
                '"' => quote = None,
                _ => {}
            },
            None => match c {
                '\\' => escaped = true,
                '\'' | '"' => quote = Some(c),
                '#' if word_start => out.push('\\'),
                _ => {}
            },
        }
        out.push(c);
        word_start = quote.is_none() && c.is_whitespace();
    }
    Cow::Owned(out)
}

fn parse_dimension(field: &'static str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|e| MagicError::invalid(field, format!("'{}' is not a pixel size: {}", raw, e)))
}

fn parse_flag(raw: &str) -> bool {
    raw.to_lowercase() == "true"
}

/// Any JSON value is accepted; an empty object means "no config".
fn parse_runtime_config(raw: &str) -> Result<Option<Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| MagicError::invalid("py_conf", format!("malformed JSON: {}", e)))?;
    match &value {
        Value::Object(map) if map.is_empty() => Ok(None),
        _ => Ok(Some(value)),
    }
}

/// Must be a JSON array of strings; an empty array means "no extra scripts".
fn parse_extra_scripts(raw: &str) -> Result<Option<Vec<String>>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| MagicError::invalid("js_src", format!("malformed JSON: {}", e)))?;
    let Value::Array(items) = value else {
        return Err(MagicError::invalid("js_src", "expected a JSON array of URLs"));
    };
    let urls = items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(MagicError::invalid(
                "js_src",
                format!("expected a URL string, got {}", other),
            )),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(if urls.is_empty() { None } else { Some(urls) })
}
