//! Services tying loading, analysis and rendering into runnable pipelines.

pub mod visualize;

pub use visualize::{
    load_deployment, render_deployment, visualize, DeploymentSource, VisualizeOutcome,
    VisualizeRequest, Visualizer, VizError, VizResult, DEFAULT_PLATFORM,
};
