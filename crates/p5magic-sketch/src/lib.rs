//! Sketch page generation for the p5magic cell magics.
//!
//! ```text
//! magic line ──OptionParser──▶ SketchOptions ─┐
//! cell source ──HookRegistry (global mode)────┴─assemble──▶ GeneratedDocument
//! ```
//!
//! Parsing is where validation happens; assembly is pure and cannot fail.

pub mod hooks;
pub mod library;
pub mod options;
pub mod template;

pub use hooks::{Hook, HookBinding, HookBindings, HookRegistry};
pub use options::{parse_magic_line, LibraryKind, OptionParser, RuntimeKind, SketchOptions};
pub use template::{assemble, assemble_with_registry, GeneratedDocument};

/// Parse the magic line and assemble the page for `cell` in one step.
pub fn build_document(
    parser: &OptionParser,
    line: &str,
    cell: &str,
) -> p5magic_core::Result<(SketchOptions, GeneratedDocument)> {
    let opts = parser.parse(line)?;
    let doc = assemble(&opts, cell);
    Ok((opts, doc))
}
