//! Secret management
//!
//! Secrets are always deleted (ignoring not-found) and recreated rather than
//! patched; there is no diffing of secret contents.

use base64::Engine as _;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{DeleteParams, PostParams};
use std::collections::BTreeMap;
use tracing::debug;
use vistactl_core::{NgcCredentials, RegistryCredentials};

use crate::client::ClusterClient;
use crate::error::Result;

/// Environment keys the Vista3D server container reads from its secret
const NGC_API_KEY: &str = "NGC_API_KEY";
const NGC_ORG_ID: &str = "NGC_ORG_ID";

/// Build the data map for the NGC key secret
pub fn ngc_secret_data(creds: &NgcCredentials) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert(NGC_API_KEY.to_string(), creds.api_key.clone());
    if let Some(org) = &creds.org_id {
        data.insert(NGC_ORG_ID.to_string(), org.clone());
    }
    data
}

/// Build a .dockerconfigjson payload for a registry pull secret
pub fn dockerconfigjson(creds: &RegistryCredentials) -> String {
    let auth = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", creds.username, creds.password));

    let mut entry = serde_json::json!({
        "username": creds.username,
        "password": creds.password,
        "auth": auth,
    });
    if let Some(email) = &creds.email {
        entry["email"] = serde_json::Value::String(email.clone());
    }

    serde_json::json!({ "auths": { &creds.server: entry } }).to_string()
}

/// Delete-then-create an Opaque secret
pub async fn recreate_opaque_secret(
    client: &ClusterClient,
    name: &str,
    data: BTreeMap<String, String>,
) -> Result<()> {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(client.namespace().to_string()),
            ..Default::default()
        },
        type_: Some("Opaque".to_string()),
        string_data: Some(data),
        ..Default::default()
    };

    recreate(client, name, secret).await
}

/// Delete-then-create the registry pull secret
pub async fn recreate_registry_secret(
    client: &ClusterClient,
    name: &str,
    creds: &RegistryCredentials,
) -> Result<()> {
    let mut data = BTreeMap::new();
    data.insert(".dockerconfigjson".to_string(), dockerconfigjson(creds));

    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(client.namespace().to_string()),
            ..Default::default()
        },
        type_: Some("kubernetes.io/dockerconfigjson".to_string()),
        string_data: Some(data),
        ..Default::default()
    };

    recreate(client, name, secret).await
}

async fn recreate(client: &ClusterClient, name: &str, secret: Secret) -> Result<()> {
    let api = client.secrets();

    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => debug!(secret = name, "deleted existing secret"),
        Err(kube::Error::Api(resp)) if resp.code == 404 => {}
        Err(e) => return Err(e.into()),
    }

    api.create(&PostParams::default(), &secret).await?;
    debug!(secret = name, "secret created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ngc_secret_data() {
        let data = ngc_secret_data(&NgcCredentials {
            api_key: "nvapi-secret".into(),
            org_id: Some("0123456789".into()),
        });
        assert_eq!(data.get("NGC_API_KEY").unwrap(), "nvapi-secret");
        assert_eq!(data.get("NGC_ORG_ID").unwrap(), "0123456789");

        let no_org = ngc_secret_data(&NgcCredentials {
            api_key: "nvapi-secret".into(),
            org_id: None,
        });
        assert!(!no_org.contains_key("NGC_ORG_ID"));
    }

    #[test]
    fn test_dockerconfigjson_shape() {
        let json = dockerconfigjson(&RegistryCredentials {
            server: "nvcr.io".into(),
            username: "$oauthtoken".into(),
            password: "nvapi-secret".into(),
            email: None,
        });

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &parsed["auths"]["nvcr.io"];
        assert_eq!(entry["username"], "$oauthtoken");
        assert_eq!(entry["password"], "nvapi-secret");
        // auth is base64("user:pass")
        assert_eq!(entry["auth"], "JG9hdXRodG9rZW46bnZhcGktc2VjcmV0");
        assert!(entry.get("email").is_none());
    }
}
