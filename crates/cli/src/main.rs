use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use interface_viz::commands::{
    build_source, check_command, inspect_command, load_config, visualize_command,
};
use interface_viz::init_tracing;

/// Publish/subscribe topology visualizer.
///
/// This CLI is a thin wrapper around `viz-core` (exposed in code as `viz_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "interface-viz",
    version,
    about = "Resolve publish/subscribe interfaces into a GraphViz deployment graph",
    long_about = None
)]
struct Cli {
    /// Enable debug logging on stderr (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Where the deployment comes from.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Application interface documents (YAML), used with --deployment.
    interfaces: Vec<PathBuf>,

    /// Deployment name; all interfaces belong to the single platform "default".
    #[arg(long, conflicts_with = "deployment_file")]
    deployment: Option<String>,

    /// Deployment descriptor listing platforms and their interface documents.
    #[arg(long)]
    deployment_file: Option<PathBuf>,

    /// Optional JSON or YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the deployment graph as a GraphViz DOT file.
    Visualize {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (must exist).
        #[arg(long, default_value = ".")]
        outdir: PathBuf,

        /// Output file name. Defaults to `<deployment>.dot`.
        #[arg(long)]
        output: Option<String>,

        /// Do not draw placeholder stubs for disconnected endpoints.
        #[arg(long, default_value_t = false)]
        omit_disconnected: bool,
    },

    /// Print the loaded deployment: platforms, applications, threads and entries.
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List publishers and subscribers that have no counterpart.
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Fail when any disconnected endpoint is found.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Visualize { source, outdir, output, omit_disconnected } => {
            let config = load_config(source.config.as_deref(), omit_disconnected)?;
            let source =
                build_source(source.deployment, source.deployment_file, source.interfaces)?;
            visualize_command(source, &outdir, output, config)?;
        }
        Command::Inspect { source, json } => {
            let config = load_config(source.config.as_deref(), false)?;
            let source =
                build_source(source.deployment, source.deployment_file, source.interfaces)?;
            inspect_command(&source, &config, json)?;
        }
        Command::Check { source, json, strict } => {
            let config = load_config(source.config.as_deref(), false)?;
            let source =
                build_source(source.deployment, source.deployment_file, source.interfaces)?;
            check_command(&source, &config, json, strict)?;
        }
    }

    Ok(())
}
