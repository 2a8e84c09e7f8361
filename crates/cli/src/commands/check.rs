use anyhow::{bail, Context, Result};
use serde::Serialize;
use viz_core::analysis::{resolve_topology, DisconnectedEndpoint, EndpointRole, TopologyStats};
use viz_core::config::VizConfig;
use viz_core::services::{load_deployment, DeploymentSource};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub deployment: String,
    pub stats: TopologyStats,
    pub disconnected: Vec<DisconnectedEndpoint>,
}

/// Resolve connectivity and list every endpoint without a counterpart.
///
/// With `strict`, any disconnected endpoint makes the command fail.
pub fn check_command(
    source: &DeploymentSource,
    config: &VizConfig,
    json: bool,
    strict: bool,
) -> Result<CheckReport> {
    let deployment = load_deployment(source, config).context("Failed to load deployment")?;
    let topology = resolve_topology(&deployment);
    let report = CheckReport {
        deployment: deployment.name.clone(),
        stats: topology.stats(),
        disconnected: topology.disconnected(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize check report")?
        );
    } else {
        println!(
            "Deployment '{}': {} connection(s), {} disconnected endpoint(s)",
            report.deployment,
            report.stats.total_connections(),
            report.disconnected.len()
        );
        for item in &report.disconnected {
            let role = match item.role {
                EndpointRole::Publisher => "no subscribers",
                EndpointRole::Subscriber => "no publishers",
            };
            let e = &item.endpoint;
            println!(
                "  - [{}] {}/{}/{} {} ({}, {}): {}",
                e.entry.layer,
                e.platform,
                e.application,
                e.entry.thread,
                e.entry.group,
                e.entry.scheme,
                e.entry.type_name,
                role
            );
        }
    }

    if strict && !report.disconnected.is_empty() {
        bail!("{} disconnected endpoint(s) found", report.disconnected.len());
    }
    Ok(report)
}
