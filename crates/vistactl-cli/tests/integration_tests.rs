//! Integration tests for CLI commands
//!
//! Only paths that never contact a cluster are exercised here: help output,
//! local rendering, and the dry-run modes.

use std::path::Path;
use std::process::Command;

/// Helper to run vistactl with a scrubbed environment
fn vistactl(args: &[&str]) -> std::process::Output {
    vistactl_in(args, None)
}

fn vistactl_in(args: &[&str], cwd: Option<&Path>) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vistactl"));
    cmd.args(args);

    // ambient settings must not leak into the tests
    for (key, _) in std::env::vars() {
        if key.starts_with("VISTACTL_") {
            cmd.env_remove(key);
        }
    }
    cmd.env_remove("NGC_API_KEY");
    cmd.env_remove("NGC_ORG_ID");

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    cmd.output().expect("Failed to execute vistactl")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

mod help {
    use super::*;

    #[test]
    fn test_help_exits_zero() {
        let output = vistactl(&["--help"]);
        assert_eq!(output.status.code(), Some(0));
        let text = stdout(&output);
        assert!(text.contains("vistactl"));
        assert!(text.contains("bootstrap"));
        assert!(text.contains("deploy"));
    }

    #[test]
    fn test_subcommand_help_exits_zero() {
        for sub in [
            "prepare",
            "render",
            "deploy",
            "bootstrap",
            "status",
            "diag",
            "port-forward",
            "teardown",
        ] {
            let output = vistactl(&[sub, "--help"]);
            assert_eq!(
                output.status.code(),
                Some(0),
                "{} --help should exit 0",
                sub
            );
        }
    }

    #[test]
    fn test_version_exits_zero() {
        let output = vistactl(&["--version"]);
        assert_eq!(output.status.code(), Some(0));
    }
}

mod render_command {
    use super::*;

    #[test]
    fn test_render_defaults_no_ingress() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");

        let output = vistactl(&[
            "render",
            "--non-interactive",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

        let manifest = std::fs::read_to_string(&out).unwrap();
        assert!(manifest.contains("kind: Deployment"));
        assert!(manifest.contains("nvcr.io/nim/nvidia/vista3d"));
        // no ingress host given in non-interactive mode: feature disabled
        assert!(!manifest.contains("kind: Ingress"));
    }

    #[test]
    fn test_render_with_ingress_host() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");

        let output = vistactl(&[
            "render",
            "--non-interactive",
            "--ingress-host",
            "vista3d.example.com",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0));

        let manifest = std::fs::read_to_string(&out).unwrap();
        assert!(manifest.contains("kind: Ingress"));
        assert!(manifest.contains("host: vista3d.example.com"));
    }

    #[test]
    fn test_render_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");

        let output = vistactl(&[
            "render",
            "--non-interactive",
            "--dry-run",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0));
        assert!(!out.exists());
        assert!(stdout(&output).contains("would render"));
    }

    #[test]
    fn test_render_layer_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");
        let values = dir.path().join("override.yaml");
        std::fs::write(&values, "server:\n  image:\n    tag: \"9.9.9\"\n").unwrap();

        let output = vistactl(&[
            "render",
            "--non-interactive",
            "-f",
            values.to_str().unwrap(),
            "--set-string",
            "server.image.tag=7.7.7",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0));

        let manifest = std::fs::read_to_string(&out).unwrap();
        // --set-string layers over the values file
        assert!(manifest.contains("nvcr.io/nim/nvidia/vista3d:7.7.7"));
        assert!(!manifest.contains("9.9.9"));
    }

    #[test]
    fn test_render_show_values_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");
        let merged = dir.path().join("merged.yaml");

        let output = vistactl(&[
            "render",
            "--non-interactive",
            "--set",
            "server.replicas=2",
            "--show-values",
            merged.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0));
        assert!(merged.exists());
        assert!(std::fs::read_to_string(&merged).unwrap().contains("replicas: 2"));
    }

    #[test]
    fn test_render_missing_values_file_is_io_error() {
        let output = vistactl(&[
            "render",
            "--non-interactive",
            "-f",
            "/nonexistent/values.yaml",
            "--output",
            "-",
        ]);
        assert_eq!(output.status.code(), Some(5));
        assert!(stderr(&output).contains("Error:"));
    }
}

mod deploy_command {
    use super::*;

    #[test]
    fn test_render_only_needs_no_cluster() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");

        let output = vistactl(&[
            "deploy",
            "--non-interactive",
            "--render-only",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
        assert!(out.exists());
    }

    #[test]
    fn test_dry_run_prints_plan_without_executing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");

        let output = vistactl(&[
            "deploy",
            "--non-interactive",
            "--dry-run",
            "--kubeconfig",
            "/nonexistent/kubeconfig.yaml",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

        let text = stdout(&output);
        assert!(text.contains("would delete claims: vista3d-models, vista3d-output"));
        assert!(text.contains("would run: kubectl"));
        // the manifest itself is still rendered
        assert!(out.exists());
    }

    #[test]
    fn test_dry_run_preserve_pvcs_plans_no_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");

        let output = vistactl(&[
            "deploy",
            "--non-interactive",
            "--dry-run",
            "--preserve-pvcs",
            "--kubeconfig",
            "/nonexistent/kubeconfig.yaml",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0));

        let text = stdout(&output);
        assert!(text.contains("would preserve existing claims"));
        assert!(!text.contains("would delete claims"));
    }
}

mod prepare_command {
    use super::*;

    #[test]
    fn test_dry_run_prints_plan() {
        let output = vistactl(&["prepare", "--non-interactive", "--dry-run", "--ngc-key", "k"]);
        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

        let text = stdout(&output);
        assert!(text.contains("would ensure namespace vista3d"));
        assert!(text.contains("would check storage provisioner for class local-path"));
    }

    #[test]
    fn test_non_interactive_missing_ngc_key_fails_fast() {
        let output = vistactl(&["prepare", "--non-interactive"]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("NGC API key"));
    }

    #[test]
    fn test_incomplete_rancher_settings_rejected() {
        let output = vistactl(&[
            "prepare",
            "--non-interactive",
            "--ngc-key",
            "k",
            "--rancher-server",
            "https://rancher.example.com",
        ]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("incomplete Rancher settings"));
    }
}

mod teardown_command {
    use super::*;

    #[test]
    fn test_non_interactive_requires_yes() {
        let output = vistactl(&["teardown", "--non-interactive"]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("requires confirmation"));
    }

    #[test]
    fn test_dry_run_prints_plan() {
        let output = vistactl(&["teardown", "--non-interactive", "--dry-run", "--delete-pvcs"]);
        assert_eq!(output.status.code(), Some(0));

        let text = stdout(&output);
        assert!(text.contains("would delete"));
        assert!(text.contains("vista3d-models"));
    }
}

mod bootstrap_command {
    use super::*;

    #[test]
    fn test_render_only_skips_cluster_prep() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.yaml");

        let output = vistactl(&[
            "bootstrap",
            "--non-interactive",
            "--render-only",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
        assert!(out.exists());
    }
}
