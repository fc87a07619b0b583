//! Smoke tests for the `graphlog` binary.

use std::path::Path;
use std::process::{Command, Output};

fn graphlog(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_graphlog"))
        .args(args)
        .current_dir(dir)
        .env_remove("GRAPHLOG_LOG_FORMAT")
        .env_remove("GRAPHLOG_CONFIG")
        .output()
        .expect("failed to execute graphlog")
}

#[test]
fn replay_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ops.json"),
        r#"[
  {"op": "begin_tx"},
  {"op": "node_prop_set", "name": "color", "target": {"existing": 1}, "value": {"type": "str", "value": "red"}},
  {"op": "node_prop_set", "name": "color", "target": {"existing": 1}, "value": {"type": "str", "value": "blue"}},
  {"op": "edge_prop_set", "name": "weight", "target": {"existing": 0}, "value": {"type": "float", "value": 0.5}},
  {"op": "commit_tx"}
]"#,
    )
    .unwrap();

    let out = graphlog(
        dir.path(),
        &["replay", "--ops", "ops.json", "--nodes", "3", "--edges", "2"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["ops"], 5);
    assert_eq!(summary["modify_empty"], true);
    assert_eq!(summary["node_props"][0]["name"], "color");
    assert_eq!(summary["node_props"][0]["written"], 1);
    assert_eq!(summary["edge_props"][0]["name"], "weight");
}

#[test]
fn replay_fails_on_unsupported_opcode() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ops.json"),
        r#"[{"op": "node_add", "count": 1}]"#,
    )
    .unwrap();

    let out = graphlog(dir.path(), &["replay", "--ops", "ops.json", "--nodes", "1"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("opcode not supported"), "{stderr}");
}

#[test]
fn replay_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ops.json"), "[]").unwrap();
    std::fs::write(dir.path().join("graphlog.toml"), "[replay]\nbogus = 1\n").unwrap();

    let out = graphlog(dir.path(), &["replay", "--ops", "ops.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("graphlog.toml"));
}

#[test]
fn stat_reports_local_file_size() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("blob.bin"), [0_u8; 17]).unwrap();

    let out = graphlog(dir.path(), &["stat", "blob.bin"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stat: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(stat["size"], 17);
    assert_eq!(stat["scheme"], "file");
}

#[cfg(unix)]
#[test]
fn replay_aborts_under_abort_policy() {
    use std::os::unix::process::ExitStatusExt as _;

    const SIGABRT: i32 = 6;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ops.json"),
        r#"[
  {"op": "node_prop_set", "name": "color", "target": {"existing": 0}, "value": {"type": "int", "value": 1}},
  {"op": "node_add", "count": 1}
]"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("graphlog.toml"), "[replay]\non_fatal = \"abort\"\n").unwrap();

    let out = graphlog(dir.path(), &["replay", "--ops", "ops.json", "--nodes", "1"]);
    assert_eq!(out.status.signal(), Some(SIGABRT), "{:?}", out.status);
    assert!(out.stdout.is_empty(), "{}", String::from_utf8_lossy(&out.stdout));
}
