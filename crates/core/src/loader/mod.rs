//! Document loading: turns structured interface documents into model entities.
//!
//! Parsing the document format itself is delegated to a [`DocumentReader`];
//! this module only validates record shapes and builds `Application`s and
//! deployment descriptors from the generic value tree.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Application, Platform};

mod descriptor;
mod document;

pub use descriptor::{parse_descriptor, DeploymentDescriptor, PlatformDescriptor};
pub use document::{
    application_from_document, build_application, parse_application_record, ApplicationRecord,
    EntryRecord, LayerRecord, ThreadRecord,
};

/// Error type for document loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document is readable but does not have the expected shape.
    #[error("Malformed input in {context}: {reason}")]
    MalformedInput { context: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl LoadError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        LoadError::MalformedInput { context: "document".to_string(), reason: reason.into() }
    }

    /// Attach a location (usually a file path) to a `MalformedInput` error.
    pub fn in_context(self, context: impl Into<String>) -> Self {
        match self {
            LoadError::MalformedInput { reason, .. } => {
                LoadError::MalformedInput { context: context.into(), reason }
            }
            other => other,
        }
    }
}

/// Convenience result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Supplies parsed structured documents; fallible per file.
pub trait DocumentReader {
    fn read(&self, path: &Path) -> LoadResult<serde_yaml::Value>;
}

/// Reads YAML documents from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFileReader;

impl DocumentReader for YamlFileReader {
    fn read(&self, path: &Path) -> LoadResult<serde_yaml::Value> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| LoadError::Read { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&body)
            .map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })
    }
}

/// Load one application document from `path`.
pub fn load_application(
    reader: &dyn DocumentReader,
    path: &Path,
    thread_base_class: &str,
) -> LoadResult<Application> {
    let doc = reader.read(path)?;
    application_from_document(&doc, thread_base_class)
        .map_err(|e| e.in_context(path.display().to_string()))
}

/// Build a platform from its application documents.
///
/// Documents that fail to load are logged and left out of the platform.
pub fn load_platform<P: AsRef<Path>>(
    reader: &dyn DocumentReader,
    name: &str,
    interfaces: &[P],
    thread_base_class: &str,
) -> Platform {
    let mut platform = Platform::new(name);
    for path in interfaces {
        let path = path.as_ref();
        match load_application(reader, path, thread_base_class) {
            Ok(application) => {
                debug!(
                    platform = %name,
                    application = %application.name,
                    file = %path.display(),
                    "loaded application"
                );
                platform.insert_application(application);
            }
            Err(err) => {
                warn!(
                    platform = %name,
                    file = %path.display(),
                    error = %err,
                    "skipping application document"
                );
            }
        }
    }
    platform
}
