//! Rancher CLI wrapper
//!
//! Cluster login, name resolution, and kubeconfig retrieval go through the
//! `rancher` binary; everything after credential retrieval talks to the
//! Kubernetes API directly.

use serde_json::Value as JsonValue;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;
use url::Url;
use vistactl_core::RancherConfig;

use crate::error::{KubeError, Result};

/// Maximum Levenshtein distance for did-you-mean hints
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A cluster row from `rancher clusters ls`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEntry {
    pub id: String,
    pub name: String,
}

/// Wrapper around the `rancher` binary
pub struct RancherCli {
    server: Url,
    token: String,
}

impl RancherCli {
    pub fn new(config: &RancherConfig) -> Result<Self> {
        let server = Url::parse(&config.server)
            .map_err(|e| KubeError::InvalidEndpoint(format!("{}: {}", config.server, e)))?;
        if server.scheme() != "https" && server.scheme() != "http" {
            return Err(KubeError::InvalidEndpoint(format!(
                "{}: expected an http(s) URL",
                config.server
            )));
        }

        Ok(Self {
            server,
            token: config.token.clone(),
        })
    }

    /// Run the rancher binary with the given arguments, returning stdout
    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(args = ?args, "running rancher CLI");

        let output = Command::new("rancher")
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    KubeError::MissingBinary {
                        binary: "rancher".into(),
                        hint: "install the Rancher CLI from https://github.com/rancher/cli/releases"
                            .into(),
                    }
                } else {
                    KubeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(KubeError::CommandFailed {
                command: format!("rancher {}", args.first().unwrap_or(&"")),
                status: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".into()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Authenticate against the Rancher server
    pub async fn login(&self) -> Result<()> {
        self.run(&["login", self.server.as_str(), "--token", &self.token])
            .await?;
        Ok(())
    }

    /// List clusters known to the Rancher server
    pub async fn list_clusters(&self) -> Result<Vec<ClusterEntry>> {
        let output = self.run(&["clusters", "ls", "--format", "json"]).await?;
        Ok(parse_cluster_list(&output))
    }

    /// Fetch the kubeconfig for a cluster ID
    pub async fn fetch_kubeconfig(&self, cluster_id: &str) -> Result<String> {
        self.run(&["clusters", "kubeconfig", cluster_id]).await
    }
}

/// Parse `rancher clusters ls --format json` output (one JSON object per line)
pub fn parse_cluster_list(output: &str) -> Vec<ClusterEntry> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let row: JsonValue = serde_json::from_str(line).ok()?;

            let id = row
                .get("ID")
                .or_else(|| row.get("id"))
                .and_then(JsonValue::as_str)?
                .to_string();
            let name = row
                .get("Name")
                .or_else(|| row.pointer("/Cluster/name"))
                .or_else(|| row.pointer("/Cluster/spec/displayName"))
                .and_then(JsonValue::as_str)?
                .to_string();

            Some(ClusterEntry { id, name })
        })
        .collect()
}

/// Resolve a human-given cluster name to a cluster ID
///
/// Exact match only. Zero matches fail with a did-you-mean hint when a
/// close name exists; multiple matches fail as ambiguous.
pub fn resolve_cluster(entries: &[ClusterEntry], name: &str) -> Result<String> {
    let matches: Vec<&ClusterEntry> = entries.iter().filter(|e| e.name == name).collect();

    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Err(KubeError::ClusterNotFound {
            name: name.to_string(),
            suggestion: closest_name(entries, name),
        }),
        many => Err(KubeError::ClusterAmbiguous {
            name: name.to_string(),
            matches: many.iter().map(|e| e.id.clone()).collect(),
        }),
    }
}

fn closest_name(entries: &[ClusterEntry], name: &str) -> Option<String> {
    entries
        .iter()
        .map(|e| (strsim::levenshtein(&e.name, name), &e.name))
        .filter(|(d, _)| *d <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(d, _)| *d)
        .map(|(_, n)| n.clone())
}

/// Write a retrieved kubeconfig to its target path, creating parent
/// directories. The file is written whole, never patched in place.
pub fn write_kubeconfig(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<ClusterEntry> {
        vec![
            ClusterEntry {
                id: "c-m-abc123".into(),
                name: "imaging-prod".into(),
            },
            ClusterEntry {
                id: "c-m-def456".into(),
                name: "imaging-dev".into(),
            },
        ]
    }

    #[test]
    fn test_parse_cluster_list() {
        let output = r#"{"ID":"c-m-abc123","Name":"imaging-prod"}
{"ID":"c-m-def456","Name":"imaging-dev"}
"#;
        let parsed = parse_cluster_list(output);
        assert_eq!(parsed, entries());
    }

    #[test]
    fn test_parse_cluster_list_nested_name() {
        let output = r#"{"ID":"c-m-xyz789","Cluster":{"name":"edge"}}"#;
        let parsed = parse_cluster_list(output);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "edge");
    }

    #[test]
    fn test_parse_cluster_list_skips_garbage() {
        let output = "not json\n{\"ID\":\"c-1\",\"Name\":\"ok\"}\n";
        assert_eq!(parse_cluster_list(output).len(), 1);
    }

    #[test]
    fn test_resolve_exact_match() {
        let id = resolve_cluster(&entries(), "imaging-prod").unwrap();
        assert_eq!(id, "c-m-abc123");
    }

    #[test]
    fn test_resolve_unknown_suggests_closest() {
        let err = resolve_cluster(&entries(), "imaging-prd").unwrap_err();
        match err {
            KubeError::ClusterNotFound { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("imaging-prod"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_unknown_far_name_no_suggestion() {
        let err = resolve_cluster(&entries(), "totally-different").unwrap_err();
        match err {
            KubeError::ClusterNotFound { suggestion, .. } => assert!(suggestion.is_none()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_ambiguous() {
        let mut dupes = entries();
        dupes.push(ClusterEntry {
            id: "c-m-zzz000".into(),
            name: "imaging-prod".into(),
        });

        let err = resolve_cluster(&dupes, "imaging-prod").unwrap_err();
        assert!(matches!(err, KubeError::ClusterAmbiguous { matches, .. } if matches.len() == 2));
    }

    #[test]
    fn test_write_kubeconfig_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kube.yaml");
        write_kubeconfig(&path, "apiVersion: v1\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "apiVersion: v1\n");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let cfg = RancherConfig {
            server: "not a url".into(),
            token: "t".into(),
            cluster: "c".into(),
        };
        assert!(RancherCli::new(&cfg).is_err());
    }
}
