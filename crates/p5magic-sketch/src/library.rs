//! CDN script URLs for the drawing library and its addons.

use crate::options::{LibraryKind, SketchOptions};

pub const Q5_URL: &str = "https://cdn.jsdelivr.net/npm/q5@2/q5.min.js";
pub const P5_URL: &str = "https://cdn.jsdelivr.net/npm/p5@1/lib/p5.min.js";
pub const P5_SOUND_URL: &str = "https://cdn.jsdelivr.net/npm/p5@1/lib/addons/p5.sound.min.js";
/// p5play physics: the planck engine must load before p5play itself.
pub const PHYSICS_URLS: [&str; 2] = [
    "https://cdn.jsdelivr.net/npm/p5play@3/planck.min.js",
    "https://cdn.jsdelivr.net/npm/p5play@3/p5play.js",
];

/// Ordered library URLs for the options' library kind and addons.
pub fn library_urls(opts: &SketchOptions) -> Vec<&'static str> {
    let mut urls = match opts.library() {
        LibraryKind::Q5 => vec![Q5_URL],
        LibraryKind::P5 if opts.sound_addon() => vec![P5_URL, P5_SOUND_URL],
        LibraryKind::P5 => vec![P5_URL],
    };
    if opts.physics_addon() {
        urls.extend(PHYSICS_URLS);
    }
    urls
}

/// PyScript loader module, versioned.
pub fn pyscript_core_js(version: &str) -> String {
    format!("https://pyscript.net/releases/{}/core.js", version)
}

pub fn pyscript_core_css(version: &str) -> String {
    format!("https://pyscript.net/releases/{}/core.css", version)
}
