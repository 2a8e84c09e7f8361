use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::services::{VizError, VizResult};

/// Framework base class that marks a thread as a direct thread subclass.
pub const DEFAULT_THREAD_BASE_CLASS: &str = "goby::middleware::SimpleThread";

/// Edge and label colors, one per layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerColors {
    pub thread: String,
    pub process: String,
    pub vehicle: String,
}

impl Default for LayerColors {
    fn default() -> Self {
        Self {
            thread: "purple4".to_string(),
            process: "dodgerblue4".to_string(),
            vehicle: "darkgreen".to_string(),
        }
    }
}

/// Rendering and resolution options for a visualization run.
///
/// Every field has a default, so an empty JSON/YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    /// Skip placeholder nodes/edges for disconnected endpoints.
    pub omit_disconnected: bool,
    /// Root thread base class name (prefix match) for direct-subclass detection.
    pub thread_base_class: String,
    pub colors: LayerColors,
    /// Graph-level `splines` attribute.
    pub splines: String,
    /// Extension used for the default output file name.
    pub output_extension: String,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            omit_disconnected: false,
            thread_base_class: DEFAULT_THREAD_BASE_CLASS.to_string(),
            colors: LayerColors::default(),
            splines: "polyline".to_string(),
            output_extension: "dot".to_string(),
        }
    }
}

impl VizConfig {
    /// Default output file name for a deployment, e.g. `fleet.dot`.
    pub fn default_output_file(&self, deployment_name: &str) -> String {
        format!("{deployment_name}.{}", self.output_extension)
    }
}

/// Load a config file, choosing JSON or YAML by extension (`.json`, `.yml`, `.yaml`).
pub fn load_viz_config(path: &Path) -> VizResult<VizConfig> {
    let config_error =
        |reason: String| VizError::Config { path: path.to_path_buf(), reason };

    let body = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "json" => serde_json::from_str(&body).map_err(|e| config_error(e.to_string())),
        "yml" | "yaml" => serde_yaml::from_str(&body).map_err(|e| config_error(e.to_string())),
        other => Err(config_error(format!("unsupported config extension '{other}'"))),
    }
}
