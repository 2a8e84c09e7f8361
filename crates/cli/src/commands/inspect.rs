use anyhow::{Context, Result};
use viz_core::config::VizConfig;
use viz_core::services::{load_deployment, DeploymentSource};

/// Print the loaded deployment (platforms, applications, threads and entries).
pub fn inspect_command(source: &DeploymentSource, config: &VizConfig, json: bool) -> Result<()> {
    let deployment = load_deployment(source, config).context("Failed to load deployment")?;

    if json {
        let serialized = serde_json::to_string_pretty(&deployment)
            .context("Failed to serialize deployment to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    if deployment.platforms.is_empty() {
        println!("-----{}-----", deployment.name);
        println!("  (no platforms)");
        return Ok(());
    }
    print!("{}", deployment);
    Ok(())
}
