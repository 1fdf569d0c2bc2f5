//! CLI commands. Each one maps to a cell magic of the notebook extension.
//!
//!   run — %%runp5: serve the page and embed it in a frame
//!   gen — %%genp5: show the generated markup

pub mod magic;
