use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::loader::document::scalar_string;
use crate::loader::{LoadError, LoadResult};

/// One platform entry of a deployment descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub name: String,
    /// Application interface documents, in descriptor order.
    pub interfaces: Vec<PathBuf>,
}

/// Parsed deployment descriptor (`deployment` + `platforms`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentDescriptor {
    pub name: String,
    pub platforms: Vec<PlatformDescriptor>,
}

/// Validate a deployment descriptor document.
///
/// Relative interface paths are resolved against `base_dir` (normally the
/// descriptor's own directory).
pub fn parse_descriptor(doc: &Value, base_dir: &Path) -> LoadResult<DeploymentDescriptor> {
    let root = doc
        .as_mapping()
        .ok_or_else(|| LoadError::malformed("deployment descriptor must be a map"))?;
    let name = root
        .get("deployment")
        .and_then(scalar_string)
        .ok_or_else(|| LoadError::malformed("must specify 'deployment:' as a scalar name"))?;

    let platforms = match root.get("platforms") {
        Some(Value::Sequence(items)) => items,
        _ => return Err(LoadError::malformed("must specify 'platforms:' as a sequence")),
    };

    let platforms = platforms
        .iter()
        .enumerate()
        .map(|(idx, platform)| {
            let name = platform.get("name").and_then(scalar_string).ok_or_else(|| {
                LoadError::malformed(format!("platforms[{idx}] must specify 'name:'"))
            })?;
            let interfaces = match platform.get("interfaces") {
                Some(Value::Sequence(items)) => items,
                _ => {
                    return Err(LoadError::malformed(format!(
                        "must specify 'interfaces:' as a sequence for platform: {name}"
                    )))
                }
            };
            let interfaces = interfaces
                .iter()
                .map(|item| {
                    scalar_string(item).map(|p| resolve_path(base_dir, &p)).ok_or_else(|| {
                        LoadError::malformed(format!(
                            "interfaces for platform {name} must be file paths"
                        ))
                    })
                })
                .collect::<LoadResult<Vec<_>>>()?;
            Ok(PlatformDescriptor { name, interfaces })
        })
        .collect::<LoadResult<Vec<_>>>()?;

    Ok(DeploymentDescriptor { name, platforms })
}

fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
