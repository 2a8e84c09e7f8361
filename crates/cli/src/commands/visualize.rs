use std::path::Path;

use anyhow::{Context, Result};
use viz_core::config::VizConfig;
use viz_core::services::{DeploymentSource, VisualizeOutcome, VisualizeRequest};

use crate::sha256_file;

/// Render the deployment graph to `<outdir>/<output or deployment.ext>`.
pub fn visualize_command(
    source: DeploymentSource,
    outdir: &Path,
    output: Option<String>,
    config: VizConfig,
) -> Result<VisualizeOutcome> {
    let request =
        VisualizeRequest { source, output_dir: outdir.to_path_buf(), output_file: output, config };
    let outcome = viz_core::services::visualize(&request).context("Visualization failed")?;
    let digest = sha256_file(&outcome.output_path)?;

    let stats = &outcome.stats;
    println!("Wrote graph for deployment '{}':", outcome.deployment);
    println!("  Output: {}", outcome.output_path.display());
    println!("  SHA-256: {}", digest);
    println!("  Platforms: {}, applications: {}", outcome.platforms, outcome.applications);
    for (layer, layer_stats) in [
        ("interthread", &stats.interthread),
        ("interprocess", &stats.interprocess),
        ("intervehicle", &stats.intervehicle),
    ] {
        println!(
            "  {layer}: {} connection(s), {} disconnected publisher(s), \
             {} disconnected subscriber(s)",
            layer_stats.connections,
            layer_stats.disconnected_publishers,
            layer_stats.disconnected_subscribers
        );
    }

    Ok(outcome)
}
