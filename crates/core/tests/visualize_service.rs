use std::fs;
use std::path::Path;

use tempfile::tempdir;
use viz_core::config::{load_viz_config, VizConfig};
use viz_core::services::{
    load_deployment, visualize, DeploymentSource, VisualizeRequest, VizError, DEFAULT_PLATFORM,
};

const ALPHA: &str = r#"
application: alpha
interprocess:
  publishes:
    - {group: telemetry, scheme: DCCL, type: Depth, thread: main}
intervehicle:
  publishes:
    - {group: nav, scheme: DCCL, type: Nav, thread: main}
"#;

const BETA: &str = r#"
application: beta
interprocess:
  subscribes:
    - {group: telemetry, scheme: DCCL, type: Depth, thread: main}
"#;

const TOPSIDE: &str = r#"
application: topside
intervehicle:
  subscribes:
    - {group: nav, scheme: CXX_OBJECT, type: Nav, thread: main}
"#;

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

fn request(source: DeploymentSource, output_dir: &Path) -> VisualizeRequest {
    VisualizeRequest {
        source,
        output_dir: output_dir.to_path_buf(),
        output_file: None,
        config: VizConfig::default(),
    }
}

#[test]
fn named_deployment_uses_default_platform_and_output_name() {
    let tmp = tempdir().expect("tempdir");
    let alpha = write(tmp.path(), "alpha.yml", ALPHA);
    let beta = write(tmp.path(), "beta.yml", BETA);

    let source = DeploymentSource::Named { name: "bench".into(), interfaces: vec![alpha, beta] };
    let outcome = visualize(&request(source.clone(), tmp.path())).expect("visualize");

    assert_eq!(outcome.output_path, tmp.path().join("bench.dot"));
    assert_eq!(outcome.platforms, 1);
    assert_eq!(outcome.applications, 2);
    assert_eq!(outcome.stats.interprocess.connections, 1);
    assert_eq!(outcome.stats.intervehicle.disconnected_publishers, 1);

    let body = fs::read_to_string(&outcome.output_path).expect("read output");
    assert_eq!(body.len(), outcome.bytes_written);
    assert!(body.contains(&format!("label=\"{DEFAULT_PLATFORM}\"")));

    let deployment = load_deployment(&source, &VizConfig::default()).expect("load");
    assert!(deployment.platforms.contains_key(DEFAULT_PLATFORM));
}

#[test]
fn descriptor_builds_platforms_and_crosses_vehicles() {
    let tmp = tempdir().expect("tempdir");
    fs::create_dir_all(tmp.path().join("auv")).expect("mkdir");
    write(&tmp.path().join("auv"), "alpha.yml", ALPHA);
    write(tmp.path(), "topside.yml", TOPSIDE);
    write(tmp.path(), "broken.yml", "interprocess: {}\n");
    let descriptor = write(
        tmp.path(),
        "deploy.yml",
        r#"
deployment: fleet
platforms:
  - name: auv
    interfaces: [auv/alpha.yml, broken.yml]
  - name: ship
    interfaces: [topside.yml]
"#,
    );

    let mut req = request(DeploymentSource::Descriptor(descriptor), tmp.path());
    req.output_file = Some("graph.gv".into());
    let outcome = visualize(&req).expect("visualize");

    assert_eq!(outcome.deployment, "fleet");
    assert_eq!(outcome.output_path, tmp.path().join("graph.gv"));
    assert_eq!(outcome.platforms, 2);
    assert_eq!(outcome.applications, 2, "broken document should be skipped");
    assert_eq!(outcome.stats.intervehicle.connections, 1);
    assert_eq!(outcome.stats.intervehicle.disconnected_publishers, 0);

    let body = fs::read_to_string(&outcome.output_path).expect("read output");
    assert!(body.contains(r#""auv_alpha_main"->"ship_topside_main""#));
}

#[test]
fn visualize_is_byte_for_byte_reproducible() {
    let tmp = tempdir().expect("tempdir");
    let alpha = write(tmp.path(), "alpha.yml", ALPHA);
    let beta = write(tmp.path(), "beta.yml", BETA);

    let forward = DeploymentSource::Named {
        name: "bench".into(),
        interfaces: vec![alpha.clone(), beta.clone()],
    };
    let reverse = DeploymentSource::Named { name: "bench".into(), interfaces: vec![beta, alpha] };
    let first = visualize(&request(forward, tmp.path())).expect("first");
    let first_body = fs::read_to_string(&first.output_path).expect("read");
    let second = visualize(&request(reverse, tmp.path())).expect("second");
    let second_body = fs::read_to_string(&second.output_path).expect("read");
    assert_eq!(first_body, second_body);
}

#[test]
fn descriptor_without_platforms_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let descriptor = write(tmp.path(), "deploy.yml", "deployment: fleet\n");
    let err = visualize(&request(DeploymentSource::Descriptor(descriptor), tmp.path()))
        .expect_err("should fail");
    match err {
        VizError::MissingDeploymentStructure { reason, .. } => {
            assert!(reason.contains("platforms"), "unexpected reason: {reason}")
        }
        other => panic!("expected MissingDeploymentStructure, got {other}"),
    }
}

#[test]
fn platform_without_interfaces_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let descriptor = write(
        tmp.path(),
        "deploy.yml",
        "deployment: fleet\nplatforms:\n  - name: auv\n",
    );
    let err = load_deployment(&DeploymentSource::Descriptor(descriptor), &VizConfig::default())
        .expect_err("should fail");
    assert!(err.to_string().contains("interfaces"), "unexpected error: {err}");
}

#[test]
fn missing_descriptor_file_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let err = load_deployment(
        &DeploymentSource::Descriptor(tmp.path().join("nope.yml")),
        &VizConfig::default(),
    )
    .expect_err("should fail");
    assert!(matches!(err, VizError::Descriptor(_)));
}

#[test]
fn missing_output_directory_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let alpha = write(tmp.path(), "alpha.yml", ALPHA);
    let source = DeploymentSource::Named { name: "bench".into(), interfaces: vec![alpha] };
    let err = visualize(&request(source, &tmp.path().join("absent"))).expect_err("should fail");
    assert!(matches!(err, VizError::OutputDirMissing(_)));
}

#[test]
fn unwritable_output_file_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let alpha = write(tmp.path(), "alpha.yml", ALPHA);
    fs::create_dir_all(tmp.path().join("taken.dot")).expect("mkdir");
    let source = DeploymentSource::Named { name: "bench".into(), interfaces: vec![alpha] };
    let mut req = request(source, tmp.path());
    req.output_file = Some("taken.dot".into());
    let err = visualize(&req).expect_err("should fail");
    assert!(matches!(err, VizError::Io { .. }));
}

#[test]
fn config_files_load_from_json_and_yaml() {
    let tmp = tempdir().expect("tempdir");
    let json = write(
        tmp.path(),
        "viz.json",
        r#"{"omit_disconnected": true, "colors": {"thread": "red"}}"#,
    );
    let config = load_viz_config(&json).expect("json config");
    assert!(config.omit_disconnected);
    assert_eq!(config.colors.thread, "red");
    assert_eq!(config.colors.process, "dodgerblue4");

    let yaml = write(tmp.path(), "viz.yaml", "output_extension: gv\nsplines: ortho\n");
    let config = load_viz_config(&yaml).expect("yaml config");
    assert_eq!(config.default_output_file("fleet"), "fleet.gv");
    assert_eq!(config.splines, "ortho");

    let toml = write(tmp.path(), "viz.toml", "");
    assert!(matches!(load_viz_config(&toml), Err(VizError::Config { .. })));
}

const MEMORY_DESCRIPTOR: &str = r#"
deployment: fleet
platforms:
  - name: auv
    interfaces: [alpha.yml]
  - name: ship
    interfaces: [topside.yml]
"#;

/// Serves documents from memory, keyed by path.
struct MemoryReader(std::collections::BTreeMap<std::path::PathBuf, &'static str>);

impl viz_core::loader::DocumentReader for MemoryReader {
    fn read(&self, path: &Path) -> viz_core::loader::LoadResult<serde_yaml::Value> {
        let body = self.0.get(path).ok_or_else(|| viz_core::loader::LoadError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in memory"),
        })?;
        serde_yaml::from_str(body).map_err(|source| viz_core::loader::LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[test]
fn visualizer_accepts_custom_document_readers() {
    let reader = MemoryReader(
        [
            (std::path::PathBuf::from("/mem/deploy.yml"), MEMORY_DESCRIPTOR),
            (std::path::PathBuf::from("/mem/alpha.yml"), ALPHA),
            (std::path::PathBuf::from("/mem/topside.yml"), TOPSIDE),
        ]
        .into_iter()
        .collect(),
    );
    let config = VizConfig::default();
    let visualizer = viz_core::services::Visualizer::new(&reader, &config);

    let source = DeploymentSource::Descriptor("/mem/deploy.yml".into());
    let deployment = visualizer.load(&source).expect("load");
    assert_eq!(deployment.application_count(), 2);

    let topology = visualizer.resolve(&deployment);
    assert_eq!(topology.stats().intervehicle.connections, 1);
    let dot = visualizer.render(&topology);
    assert!(dot.contains(r#""auv_alpha_main"->"ship_topside_main""#));
}

#[test]
fn wrapped_errors_expose_the_cause_only_as_source() {
    use std::error::Error as _;

    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("nope.yml");
    let err = load_deployment(&DeploymentSource::Descriptor(missing), &VizConfig::default())
        .expect_err("should fail");
    let cause = err.source().expect("loader error as source").to_string();
    assert!(cause.contains("nope.yml"), "unexpected cause: {cause}");
    assert!(!err.to_string().contains(&cause), "cause repeated in message: {err}");
}
