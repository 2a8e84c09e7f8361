use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::analysis::{resolve_topology, Topology, TopologyStats};
use crate::config::VizConfig;
use crate::loader::{load_platform, parse_descriptor, DocumentReader, LoadError, YamlFileReader};
use crate::model::Deployment;
use crate::render::render_dot;

/// Platform name used when no deployment descriptor is supplied.
pub const DEFAULT_PLATFORM: &str = "default";

#[derive(Debug, Error)]
pub enum VizError {
    /// The deployment descriptor lacks required structure; fatal.
    #[error("Invalid deployment descriptor {path}: {reason}")]
    MissingDeploymentStructure { path: PathBuf, reason: String },

    /// The deployment descriptor could not be read or parsed; fatal.
    #[error("Failed to load deployment descriptor")]
    Descriptor(#[source] LoadError),

    #[error("Output directory does not exist: {0}")]
    OutputDirMissing(PathBuf),

    #[error("Failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type VizResult<T> = Result<T, VizError>;

/// Where the deployment structure comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentSource {
    /// A descriptor listing platforms and their interface documents.
    Descriptor(PathBuf),
    /// A named deployment whose interfaces all belong to the `default` platform.
    Named { name: String, interfaces: Vec<PathBuf> },
}

/// Request to render a deployment graph to disk.
#[derive(Debug, Clone)]
pub struct VisualizeRequest {
    pub source: DeploymentSource,
    pub output_dir: PathBuf,
    /// File name inside `output_dir`; defaults to `<deployment>.<ext>`.
    pub output_file: Option<String>,
    pub config: VizConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualizeOutcome {
    pub deployment: String,
    pub output_path: PathBuf,
    pub bytes_written: usize,
    pub platforms: usize,
    pub applications: usize,
    pub stats: TopologyStats,
}

/// Pipeline driver bound to a document reader and a config.
pub struct Visualizer<'a> {
    pub reader: &'a dyn DocumentReader,
    pub config: &'a VizConfig,
}

impl<'a> Visualizer<'a> {
    pub fn new(reader: &'a dyn DocumentReader, config: &'a VizConfig) -> Self {
        Self { reader, config }
    }

    /// Build the deployment. Unloadable application documents are skipped;
    /// descriptor problems are fatal.
    pub fn load(&self, source: &DeploymentSource) -> VizResult<Deployment> {
        let base_class = self.config.thread_base_class.as_str();
        let deployment = match source {
            DeploymentSource::Named { name, interfaces } => {
                let mut deployment = Deployment::new(name);
                deployment.insert_platform(load_platform(
                    self.reader,
                    DEFAULT_PLATFORM,
                    interfaces,
                    base_class,
                ));
                deployment
            }
            DeploymentSource::Descriptor(path) => {
                let doc = self.reader.read(path).map_err(VizError::Descriptor)?;
                let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
                let descriptor = parse_descriptor(&doc, base_dir).map_err(|err| match err {
                    LoadError::MalformedInput { reason, .. } => {
                        VizError::MissingDeploymentStructure { path: path.clone(), reason }
                    }
                    other => VizError::Descriptor(other),
                })?;
                let mut deployment = Deployment::new(&descriptor.name);
                for platform in &descriptor.platforms {
                    deployment.insert_platform(load_platform(
                        self.reader,
                        &platform.name,
                        &platform.interfaces,
                        base_class,
                    ));
                }
                deployment
            }
        };
        info!(
            deployment = %deployment.name,
            platforms = deployment.platforms.len(),
            applications = deployment.application_count(),
            "loaded deployment"
        );
        Ok(deployment)
    }

    pub fn resolve(&self, deployment: &Deployment) -> Topology {
        resolve_topology(deployment)
    }

    pub fn render(&self, topology: &Topology) -> String {
        render_dot(topology, self.config)
    }

    /// Load, resolve, render and write the graph file.
    pub fn run(
        &self,
        source: &DeploymentSource,
        output_dir: &Path,
        output_file: Option<&str>,
    ) -> VizResult<VisualizeOutcome> {
        if !output_dir.is_dir() {
            return Err(VizError::OutputDirMissing(output_dir.to_path_buf()));
        }

        let deployment = self.load(source)?;
        let topology = self.resolve(&deployment);
        let graph = self.render(&topology);

        let file_name = match output_file {
            Some(name) => name.to_string(),
            None => self.config.default_output_file(&deployment.name),
        };
        let output_path = output_dir.join(file_name);
        std::fs::write(&output_path, &graph)
            .map_err(|source| VizError::Io { path: output_path.clone(), source })?;
        info!(path = %output_path.display(), bytes = graph.len(), "wrote graph");

        Ok(VisualizeOutcome {
            deployment: deployment.name.clone(),
            output_path,
            bytes_written: graph.len(),
            platforms: deployment.platforms.len(),
            applications: deployment.application_count(),
            stats: topology.stats(),
        })
    }
}

/// Load a deployment from the filesystem using YAML documents.
pub fn load_deployment(source: &DeploymentSource, config: &VizConfig) -> VizResult<Deployment> {
    Visualizer::new(&YamlFileReader, config).load(source)
}

/// Resolve connectivity and emit the graph text for an in-memory deployment.
pub fn render_deployment(deployment: &Deployment, config: &VizConfig) -> String {
    render_dot(&resolve_topology(deployment), config)
}

/// Run the full pipeline for a request, reading YAML documents from disk.
pub fn visualize(request: &VisualizeRequest) -> VizResult<VisualizeOutcome> {
    Visualizer::new(&YamlFileReader, &request.config).run(
        &request.source,
        &request.output_dir,
        request.output_file.as_deref(),
    )
}
