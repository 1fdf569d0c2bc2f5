//! Page assembly: options + cell source -> one self-contained HTML document.
//!
//! Tag order matters to PyScript and the drawing libraries: the library
//! scripts must be loaded before the bootstrap script defines `p5start`, and
//! the config tag must precede the interpreter's first script block.

use std::fmt;
use std::fmt::Write as _;

use crate::hooks::HookRegistry;
use crate::library::{library_urls, pyscript_core_css, pyscript_core_js};
use crate::options::{RuntimeKind, SketchOptions};

/// Final page markup. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    html: String,
}

impl GeneratedDocument {
    pub fn as_str(&self) -> &str {
        &self.html
    }

}

impl fmt::Display for GeneratedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

impl AsRef<[u8]> for GeneratedDocument {
    fn as_ref(&self) -> &[u8] {
        self.html.as_bytes()
    }
}

/// Assemble the page. In global mode the hooks are taken from the cell's
/// top-level definitions.
pub fn assemble(opts: &SketchOptions, cell: &str) -> GeneratedDocument {
    if opts.global_mode() {
        assemble_with_registry(opts, cell, &HookRegistry::from_source(cell))
    } else {
        assemble_with_registry(opts, cell, &HookRegistry::new())
    }
}

/// Assemble with an explicit registry of defined callables. The registry is
/// ignored outside global mode.
pub fn assemble_with_registry(
    opts: &SketchOptions,
    cell: &str,
    registry: &HookRegistry,
) -> GeneratedDocument {
    let runtime = opts.runtime();
    let version = opts.runtime_version();

    let mut html = String::with_capacity(cell.len() + 4096);
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>p5magic</title>\n",
    );
    push_script_src(&mut html, "type=\"module\" ", &pyscript_core_js(version));
    for url in library_urls(opts) {
        push_script_src(&mut html, "", url);
    }
    for url in opts.extra_scripts() {
        push_script_src(&mut html, "", url);
    }
    if let Some(config) = opts.runtime_config() {
        // Serializing a parsed Value cannot fail.
        let json = serde_json::to_string(config).unwrap_or_default();
        let _ = writeln!(
            html,
            "    <{kind}-config>{json}</{kind}-config>",
            kind = runtime,
            json = escape_script_text(&json)
        );
    }
    html.push_str(&bootstrap_script(runtime));
    let _ = writeln!(
        html,
        "    <link rel=\"stylesheet\" href=\"{}\">",
        html_escape(&pyscript_core_css(version))
    );
    html.push_str(SKETCH_STYLE);
    html.push_str("</head>\n");

    let _ = writeln!(
        html,
        "<body style=\"background: {};\">",
        html_escape(opts.background())
    );
    html.push_str("    <dialog id=\"loading\" open><h1>Loading...</h1></dialog>\n");
    let _ = writeln!(html, "    <script type=\"{}\">", runtime);
    html.push_str(cell);
    if opts.global_mode() {
        html.push_str(&registry.bindings().render_preamble());
    }
    if !html.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("    </script>\n</body>\n</html>\n");

    tracing::debug!(
        bytes = html.len(),
        runtime = runtime.as_str(),
        library = opts.library().as_str(),
        "Assembled sketch document"
    );
    GeneratedDocument { html }
}

fn push_script_src(html: &mut String, attrs: &str, url: &str) {
    let _ = writeln!(
        html,
        "    <script {}src=\"{}\"></script>",
        attrs,
        html_escape(url)
    );
}

/// Defines `window.p5start` (q5 when loaded, p5 otherwise) and closes the
/// loading dialog once the interpreter reports ready.
fn bootstrap_script(runtime: RuntimeKind) -> String {
    format!(
        r#"    <script>
        window.p5start = (func) => {{
            if (typeof window.Q5 !== 'undefined') {{
                new Q5(func);
            }} else {{
                new p5(func);
            }}
        }};
        addEventListener('{runtime}:ready', () => {{
            const loading = document.getElementById('loading');
            if (loading) {{
                loading.close();
            }}
        }});
    </script>
"#,
        runtime = runtime
    )
}

const SKETCH_STYLE: &str = r#"    <style>
        html,
        body {
            margin: 0;
            padding: 0;
            width: 100vw;
            height: 100vh;
            overflow: hidden;
        }

        body {
            display: flex;
            justify-content: center;
            align-items: center;
        }

        canvas {
            display: block;
            max-width: 100%;
            max-height: 100vh;
            width: auto;
            height: auto;
            object-fit: contain;
        }
    </style>
"#;

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON inside a custom element must not close it early.
fn escape_script_text(text: &str) -> String {
    text.replace("</", "<\\/")
}
