//! End-to-end integration tests for the compliance binary
//!
//! Gated behind the `integration` feature flag. Run with:
//!
//! ```sh
//! cargo test -p compliance-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::process::Command;

use tempfile::TempDir;

fn compliance(project_dir: &TempDir) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-q", "-p", "compliance-cli", "--"])
        .env("COMPLIANCE_PROJECT_CONFIG_DIR", project_dir.path());
    cmd
}

/// Test that compliance --help lists the subcommands
#[test]
fn compliance_help_works() {
    let project = TempDir::new().unwrap();
    let output = compliance(&project)
        .arg("--help")
        .output()
        .expect("Failed to run compliance --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Compliance training backend"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("config"));
}

/// Test that compliance serve --help shows its flags
#[test]
fn compliance_serve_help_shows_flags() {
    let project = TempDir::new().unwrap();
    let output = compliance(&project)
        .args(["serve", "--help"])
        .output()
        .expect("Failed to run compliance serve --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--port"));
    assert!(stdout.contains("--database"));
    assert!(stdout.contains("--learner-role"));
}

/// Test that config show picks up the project layer
#[test]
fn compliance_config_show_reads_project_config() {
    let project = TempDir::new().unwrap();
    std::fs::write(
        project.path().join("config.toml"),
        "[server]\nport = 9321\n\n[training]\nlearner_role = \"Staff\"\n",
    )
    .unwrap();

    let output = compliance(&project)
        .args(["config", "show"])
        .output()
        .expect("Failed to run compliance config show");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[server]"));
    assert!(stdout.contains("port = 9321"));
    assert!(stdout.contains("learner_role = \"Staff\""));
}

/// Test that compliance config path shows paths
#[test]
fn compliance_config_path_shows_paths() {
    let project = TempDir::new().unwrap();
    let output = compliance(&project)
        .args(["config", "path"])
        .output()
        .expect("Failed to run compliance config path");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("User config:"));
    assert!(stdout.contains("Project config:"));
}
