//! Global-mode hook bindings.
//!
//! In global mode the user writes `def setup(): ...` / `def draw(): ...` at
//! the top level of the cell instead of attaching methods to a p5 instance.
//! The generated preamble wires those functions onto the instance. Which
//! hooks exist is decided here, statically, from a [`HookRegistry`] of names
//! the cell defines; every hook the registry lacks is bound to
//! `js.undefined` so the library skips it.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

/// Lifecycle and input-event callbacks understood by p5.js and q5.js.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hook {
    Setup,
    Draw,
    MousePressed,
    MouseReleased,
    MouseClicked,
    MouseMoved,
    MouseDragged,
    MouseWheel,
    KeyPressed,
    KeyReleased,
    KeyTyped,
    TouchStarted,
    TouchMoved,
    TouchEnded,
    DeviceMoved,
    DeviceTurned,
    DeviceShaken,
    WindowResized,
    Preload,
    DragOver,
    DragLeave,
    Drop,
}

impl Hook {
    /// Binding order in the generated preamble.
    pub const ALL: [Hook; 22] = [
        Hook::Setup,
        Hook::Draw,
        Hook::MousePressed,
        Hook::MouseReleased,
        Hook::MouseClicked,
        Hook::MouseMoved,
        Hook::MouseDragged,
        Hook::MouseWheel,
        Hook::KeyPressed,
        Hook::KeyReleased,
        Hook::KeyTyped,
        Hook::TouchStarted,
        Hook::TouchMoved,
        Hook::TouchEnded,
        Hook::DeviceMoved,
        Hook::DeviceTurned,
        Hook::DeviceShaken,
        Hook::WindowResized,
        Hook::Preload,
        Hook::DragOver,
        Hook::DragLeave,
        Hook::Drop,
    ];

    /// Callback name as the library (and the user's Python) spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Hook::Setup => "setup",
            Hook::Draw => "draw",
            Hook::MousePressed => "mousePressed",
            Hook::MouseReleased => "mouseReleased",
            Hook::MouseClicked => "mouseClicked",
            Hook::MouseMoved => "mouseMoved",
            Hook::MouseDragged => "mouseDragged",
            Hook::MouseWheel => "mouseWheel",
            Hook::KeyPressed => "keyPressed",
            Hook::KeyReleased => "keyReleased",
            Hook::KeyTyped => "keyTyped",
            Hook::TouchStarted => "touchStarted",
            Hook::TouchMoved => "touchMoved",
            Hook::TouchEnded => "touchEnded",
            Hook::DeviceMoved => "deviceMoved",
            Hook::DeviceTurned => "deviceTurned",
            Hook::DeviceShaken => "deviceShaken",
            Hook::WindowResized => "windowResized",
            Hook::Preload => "preload",
            Hook::DragOver => "dragOver",
            Hook::DragLeave => "dragLeave",
            Hook::Drop => "drop",
        }
    }

    pub fn from_name(name: &str) -> Option<Hook> {
        Hook::ALL.into_iter().find(|h| h.name() == name)
    }
}

/// Names of the callables a cell defines at module level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookRegistry {
    defined: BTreeSet<String>,
}

fn top_level_binding_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^(?:(?:async[ \t]+)?def[ \t]+([A-Za-z_]\w*)[ \t]*\(|([A-Za-z_]\w*)[ \t]*=[^=])")
            .expect("static regex")
    })
}

fn top_level_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^(?:from[ \t]+[\w.]+[ \t]+)?import[ \t]+(?:\(([^)]*)\)|([^\n#;]*))")
            .expect("static regex")
    })
}

fn triple_quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)""".*?"""|'''.*?'''"#).expect("static regex"))
}

/// Name an import clause binds: `a as b` binds `b`, `a.b.c` binds `a`.
fn imported_name(clause: &str) -> Option<&str> {
    let mut words = clause.split_whitespace();
    let first = words.next()?;
    let name = match (words.next(), words.next()) {
        (Some("as"), Some(alias)) => alias,
        _ => first.split('.').next()?,
    };
    (name != "*" && !name.is_empty()).then_some(name)
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            defined: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Collect top-level `def name(`, `async def name(`, `name = ...` and
    /// `import` / `from m import` bindings. Indented definitions (methods,
    /// nested functions) are not module globals and are skipped, as is
    /// anything inside a triple-quoted string.
    pub fn from_source(source: &str) -> Self {
        let code = triple_quoted_re().replace_all(source, "\"\"");
        let mut defined: BTreeSet<String> = top_level_binding_re()
            .captures_iter(&code)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
            .map(|m| m.as_str().to_string())
            .collect();
        for cap in top_level_import_re().captures_iter(&code) {
            let Some(clauses) = cap.get(1).or_else(|| cap.get(2)) else {
                continue;
            };
            defined.extend(
                clauses
                    .as_str()
                    .split(',')
                    .filter_map(imported_name)
                    .map(str::to_string),
            );
        }
        Self { defined }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.defined.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    pub fn bindings(&self) -> HookBindings {
        HookBindings::resolve(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookBinding {
    /// Bound to the user's global function of the same name.
    User,
    /// Bound to `js.undefined`.
    Absent,
}

/// One binding per hook, always in [`Hook::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookBindings {
    entries: [(Hook, HookBinding); 22],
}

impl HookBindings {
    pub fn resolve(registry: &HookRegistry) -> Self {
        let entries = Hook::ALL.map(|hook| {
            let binding = if registry.contains(hook.name()) {
                HookBinding::User
            } else {
                HookBinding::Absent
            };
            (hook, binding)
        });
        Self { entries }
    }

    pub fn get(&self, hook: Hook) -> HookBinding {
        self.entries
            .iter()
            .find(|(h, _)| *h == hook)
            .map(|(_, b)| *b)
            .unwrap_or(HookBinding::Absent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Hook, HookBinding)> + '_ {
        self.entries.iter().copied()
    }

    pub fn user_hooks(&self) -> impl Iterator<Item = Hook> + '_ {
        self.iter()
            .filter(|(_, b)| *b == HookBinding::User)
            .map(|(h, _)| h)
    }

    /// Python appended after the cell body. Copies the instance's public
    /// members into `globals()` (hook names excluded, so the user's callbacks
    /// are never shadowed) and then assigns every hook.
    pub fn render_preamble(&self) -> String {
        let hook_names = Hook::ALL
            .iter()
            .map(|h| format!("\"{}\"", h.name()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        out.push_str("\n\nimport js\n\np5 = None\n\n");
        let _ = writeln!(out, "_P5_HOOKS = ({},)", hook_names);
        out.push_str(
            "\ndef _p5_global(p5instance):\n    global p5\n    p5 = p5instance\n\n    for name in dir(p5):\n        if not name.startswith(\"__\") and name not in _P5_HOOKS:\n            globals()[name] = getattr(p5, name)\n\n",
        );
        for (hook, binding) in self.iter() {
            let target = match binding {
                HookBinding::User => hook.name(),
                HookBinding::Absent => "js.undefined",
            };
            let _ = writeln!(out, "    p5.{} = {}", hook.name(), target);
        }
        out.push_str("\njs.p5start(_p5_global)\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_hooks_have_unique_names() {
        let names: BTreeSet<_> = Hook::ALL.iter().map(|h| h.name()).collect();
        assert_eq!(names.len(), Hook::ALL.len());
        for hook in Hook::ALL {
            assert_eq!(Hook::from_name(hook.name()), Some(hook));
        }
        assert_eq!(Hook::from_name("loop"), None);
    }

    #[test]
    fn test_registry_from_source_top_level_only() {
        let src = "\
def setup():
    createCanvas(200, 200)

async def draw():
    background(0)

mouseClicked = lambda: print('hi')

class Ball:
    def keyPressed(self):
        pass

if x == 1:
    pass
";
        let reg = HookRegistry::from_source(src);
        assert!(reg.contains("setup"));
        assert!(reg.contains("draw"));
        assert!(reg.contains("mouseClicked"));
        assert!(!reg.contains("keyPressed"));
        assert!(!reg.contains("x"));
    }

    #[test]
    fn test_registry_from_source_imports() {
        let src = "\
from helpers import draw, make_canvas as setup
import sketches.mouse as mousePressed
from events import (
    keyPressed,
    keyReleased as kr,
)
import os.path
from lib import *

def windowResized():
    import touchStarted
";
        let reg = HookRegistry::from_source(src);
        assert!(reg.contains("draw"));
        assert!(reg.contains("setup"));
        assert!(!reg.contains("make_canvas"));
        assert!(reg.contains("mousePressed"));
        assert!(reg.contains("keyPressed"));
        assert!(reg.contains("kr"));
        assert!(!reg.contains("keyReleased"));
        assert!(reg.contains("os"));
        assert!(!reg.contains("*"));
        assert!(reg.contains("windowResized"));
        assert!(!reg.contains("touchStarted"));
    }

    #[test]
    fn test_registry_skips_triple_quoted_text() {
        let src = r#"NOTES = """
draw = 'not code'
def setup():
"""
doc = '''
mouseMoved = 1
'''

def keyTyped():
    pass
"#;
        let reg = HookRegistry::from_source(src);
        assert!(reg.contains("NOTES"));
        assert!(reg.contains("doc"));
        assert!(reg.contains("keyTyped"));
        assert!(!reg.contains("draw"));
        assert!(!reg.contains("setup"));
        assert!(!reg.contains("mouseMoved"));
    }

    #[test]
    fn test_bindings_fixed_shape() {
        let bindings = HookRegistry::from_names(["draw", "notAHook"]).bindings();
        assert_eq!(bindings.iter().count(), 22);
        assert_eq!(bindings.get(Hook::Draw), HookBinding::User);
        assert_eq!(bindings.get(Hook::Setup), HookBinding::Absent);
        assert_eq!(bindings.user_hooks().collect::<Vec<_>>(), vec![Hook::Draw]);
    }

    #[test]
    fn test_preamble_binds_user_and_absent_hooks() {
        let preamble = HookRegistry::from_names(["setup", "draw"])
            .bindings()
            .render_preamble();
        assert!(preamble.contains("import js\n"));
        assert!(preamble.contains("    p5.setup = setup\n"));
        assert!(preamble.contains("    p5.draw = draw\n"));
        assert!(preamble.contains("    p5.mousePressed = js.undefined\n"));
        assert!(preamble.contains("    p5.drop = js.undefined\n"));
        assert!(preamble.contains("not name.startswith(\"__\")"));
        assert!(preamble.ends_with("js.p5start(_p5_global)\n"));

        let setup_at = preamble.find("p5.setup =").unwrap();
        let drop_at = preamble.find("p5.drop =").unwrap();
        assert!(setup_at < drop_at);
    }
}
