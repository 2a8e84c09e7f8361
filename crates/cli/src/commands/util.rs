use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::warn;
use viz_core::config::{load_viz_config, VizConfig};
use viz_core::services::DeploymentSource;

/// Build the deployment source from CLI arguments.
///
/// Exactly one of `deployment` (a name for the synthetic `default` platform)
/// or `deployment_file` (a descriptor) must be given.
pub fn build_source(
    deployment: Option<String>,
    deployment_file: Option<PathBuf>,
    interfaces: Vec<PathBuf>,
) -> Result<DeploymentSource> {
    match (deployment, deployment_file) {
        (Some(_), Some(_)) => bail!("Use either --deployment or --deployment-file, not both"),
        (None, Some(path)) => {
            if !interfaces.is_empty() {
                warn!(
                    count = interfaces.len(),
                    "ignoring interface arguments; the descriptor lists them"
                );
            }
            Ok(DeploymentSource::Descriptor(path))
        }
        (Some(name), None) => {
            if interfaces.is_empty() {
                bail!("At least one interface document is required with --deployment");
            }
            Ok(DeploymentSource::Named { name, interfaces })
        }
        (None, None) => bail!("Specify --deployment <NAME> or --deployment-file <PATH>"),
    }
}

/// Load the optional config file and apply CLI overrides.
pub fn load_config(path: Option<&Path>, omit_disconnected: bool) -> Result<VizConfig> {
    let mut config = match path {
        Some(path) => load_viz_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => VizConfig::default(),
    };
    if omit_disconnected {
        config.omit_disconnected = true;
    }
    Ok(config)
}
