//! viz-core
//!
//! Core library for reconstructing and visualizing the publish/subscribe
//! topology of a deployment: vehicles (platforms) running applications
//! (processes) made of threads, communicating over the interthread,
//! interprocess and intervehicle layers.
//!
//! The pipeline is: `loader` (documents to model) -> `analysis::hierarchy`
//! (thread folding) -> `analysis::connectivity` (edges and disconnected
//! endpoints) -> `render` (GraphViz DOT). `services` wires it together.
//!
//! All substantive logic lives here so it is fully testable and reusable
//! from multiple frontends.

pub mod analysis;
pub mod config;
pub mod loader;
pub mod model;
pub mod render;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
