use std::fs;
use std::path::PathBuf;

use interface_viz::commands::{
    build_source, check_command, inspect_command, load_config, visualize_command,
};
use interface_viz::sha256_file;
use tempfile::tempdir;
use viz_core::config::VizConfig;
use viz_core::services::DeploymentSource;

const PUBLISHER: &str = r#"
application: nav
interthread:
  threads:
    - name: Filter
      publishes:
        - {group: fix, scheme: CXX_OBJECT, type: Fix}
    - name: Logger
      subscribes:
        - {group: fix, scheme: CXX_OBJECT, type: Fix}
intervehicle:
  publishes:
    - {group: status, scheme: DCCL, type: Status}
"#;

#[test]
fn build_source_rejects_missing_and_conflicting_inputs() {
    let err = build_source(None, None, Vec::new()).unwrap_err();
    assert!(err.to_string().contains("--deployment"));

    let err = build_source(Some("d".into()), Some(PathBuf::from("x.yml")), Vec::new()).unwrap_err();
    assert!(err.to_string().contains("not both"));

    let err = build_source(Some("d".into()), None, Vec::new()).unwrap_err();
    assert!(err.to_string().contains("interface document"));
}

#[test]
fn build_source_descriptor_ignores_interface_arguments() {
    let source = build_source(
        None,
        Some(PathBuf::from("deploy.yml")),
        vec![PathBuf::from("stray.yml")],
    )
    .expect("descriptor source");
    assert_eq!(source, DeploymentSource::Descriptor(PathBuf::from("deploy.yml")));
}

#[test]
fn load_config_applies_overrides_and_reads_files() {
    let config = load_config(None, true).expect("default config");
    assert!(config.omit_disconnected);
    assert_eq!(config.splines, "polyline");

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("viz.yaml");
    fs::write(&path, "colors:\n  thread: black\n").expect("write config");
    let config = load_config(Some(&path), false).expect("yaml config");
    assert_eq!(config.colors.thread, "black");
    assert!(!config.omit_disconnected);

    let bad = dir.path().join("viz.toml");
    fs::write(&bad, "x = 1").expect("write config");
    assert!(load_config(Some(&bad), false).is_err());
}

#[test]
fn visualize_command_reports_stats_and_hash() {
    let dir = tempdir().expect("tempdir");
    let doc = dir.path().join("nav.yml");
    fs::write(&doc, PUBLISHER).expect("write doc");
    let source = DeploymentSource::Named { name: "sea trial".into(), interfaces: vec![doc] };

    let outcome = visualize_command(source, dir.path(), None, VizConfig::default())
        .expect("visualize");
    assert_eq!(outcome.output_path, dir.path().join("sea trial.dot"));
    assert_eq!(outcome.applications, 1);
    assert_eq!(outcome.stats.interthread.connections, 1);
    assert_eq!(outcome.stats.intervehicle.disconnected_publishers, 1);

    let digest = sha256_file(&outcome.output_path).expect("hash");
    assert_eq!(digest.len(), 64);
    let body = fs::read_to_string(&outcome.output_path).expect("output");
    assert_eq!(body.len(), outcome.bytes_written);
    assert!(body.contains(r#""default_nav_Filter"->"default_nav_Logger""#));
}

#[test]
fn check_command_lists_disconnected_and_honours_strict() {
    let dir = tempdir().expect("tempdir");
    let doc = dir.path().join("nav.yml");
    fs::write(&doc, PUBLISHER).expect("write doc");
    let source = DeploymentSource::Named { name: "bench".into(), interfaces: vec![doc] };
    let config = VizConfig::default();

    let report = check_command(&source, &config, true, false).expect("check");
    assert_eq!(report.deployment, "bench");
    assert_eq!(report.disconnected.len(), 1);
    assert_eq!(report.disconnected[0].endpoint.entry.group, "status");

    let err = check_command(&source, &config, false, true).unwrap_err();
    assert!(err.to_string().contains("1 disconnected endpoint(s)"));
}

#[test]
fn inspect_command_fails_for_bad_descriptor() {
    let dir = tempdir().expect("tempdir");
    let descriptor = dir.path().join("deploy.yml");
    fs::write(&descriptor, "platforms: []\n").expect("write descriptor");
    let source = DeploymentSource::Descriptor(descriptor);

    assert!(inspect_command(&source, &VizConfig::default(), false).is_err());
}

#[test]
fn sha256_file_matches_known_digest() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("abc.txt");
    fs::write(&path, "abc").expect("write");
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(sha256_file(&dir.path().join("missing")).is_err());
}
