//! Graph output: renderer-safe identifiers and GraphViz DOT emission.

pub mod dot;
pub mod naming;

pub use dot::{render_dot, DotWriter};
pub use naming::{escape_html, node_name, sanitize_component, thread_label};
