// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secrets read from the Kubernetes API and the `k8s` secret engine

use crate::collaborators::{SecretContext, SecretDecoder, SecretReader};
use crate::constants::secrets::{
    DECODED_FILE_PREFIX, ENCRYPTED_FILE_PREFIX, ENCRYPTED_PREFIX, K8S_ENGINE, KEY_PARAM, NAME_PARAM,
};
use crate::kubernetes::client::ClusterClient;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, ResourceExt};
use std::collections::HashMap;
use std::io::Write;
use tempfile::TempPath;
use tracing::{debug, instrument};

/// Reads secret keys through the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretReader {
    client: ClusterClient,
}

impl KubeSecretReader {
    pub fn new(client: impl Into<ClusterClient>) -> Self {
        Self {
            client: client.into(),
        }
    }
}

#[async_trait]
impl SecretReader for KubeSecretReader {
    #[instrument(skip(self))]
    async fn secret_string(&self, namespace: &str, name: &str, key: &str) -> anyhow::Result<String> {
        let secrets: Api<Secret> = Api::namespaced(self.client.get().await?, namespace);

        debug!("Getting secret '{}/{}'", namespace, name);
        let secret = secrets
            .get(name)
            .await
            .with_context(|| format!("Failed to get secret {}/{}", namespace, name))?;

        secret_value(&secret, key)
    }
}

/// UTF-8 content of one data key of a secret
pub(crate) fn secret_value(secret: &Secret, key: &str) -> anyhow::Result<String> {
    let name = secret.name_any();
    let Some(data) = secret.data.as_ref() else {
        bail!("Secret {} has no data", name);
    };
    let Some(value) = data.get(key) else {
        bail!("Secret {} does not contain '{}' key", name, key);
    };
    String::from_utf8(value.0.clone())
        .with_context(|| format!("Failed to decode key '{}' of secret {}", key, name))
}

/// A parsed `encrypted:` or `encryptedFile:` reference,
/// `<prefix><engine>!<param>:<value>!...`
#[derive(Debug, PartialEq)]
pub struct EncryptedReference {
    pub engine: String,
    pub params: HashMap<String, String>,
}

impl EncryptedReference {
    pub fn parse(reference: &str) -> anyhow::Result<Self> {
        let body = reference
            .strip_prefix(ENCRYPTED_FILE_PREFIX)
            .or_else(|| reference.strip_prefix(ENCRYPTED_PREFIX))
            .ok_or_else(|| anyhow!("not an encrypted secret reference"))?;

        let mut parts = body.split('!');
        let engine = parts.next().unwrap_or_default();
        if engine.is_empty() {
            bail!("secret reference has no engine");
        }

        let params = parts
            .map(|part| {
                part.split_once(':')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .ok_or_else(|| anyhow!("malformed secret reference parameter \"{}\"", part))
            })
            .collect::<anyhow::Result<HashMap<_, _>>>()?;

        Ok(Self {
            engine: engine.to_string(),
            params,
        })
    }

    fn param(&self, name: &str) -> anyhow::Result<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("secret reference is missing parameter \"{}\"", name))
    }
}

/// Decodes `k8s` engine references (`encrypted:k8s!n:<secret>!k:<key>`) by
/// reading the secret from the caller's namespace
#[derive(Clone, Debug, Default)]
pub struct K8sSecretDecoder;

#[async_trait]
impl SecretDecoder for K8sSecretDecoder {
    async fn decode_as_file(&self, reference: &str, secrets: &SecretContext) -> anyhow::Result<TempPath> {
        let parsed = EncryptedReference::parse(reference)?;
        if parsed.engine != K8S_ENGINE {
            bail!("unsupported secret engine \"{}\"", parsed.engine);
        }
        let name = parsed.param(NAME_PARAM)?;
        let key = parsed.param(KEY_PARAM)?;

        let content = secrets
            .reader
            .secret_string(&secrets.namespace, name, key)
            .await?;

        write_private_file(content.into_bytes()).await
    }
}

/// Write `content` to a new file only the current user can read. The file is
/// removed when the returned path is dropped.
pub(crate) async fn write_private_file(content: Vec<u8>) -> anyhow::Result<TempPath> {
    tokio::task::spawn_blocking(move || {
        let mut file = tempfile::Builder::new()
            .prefix(DECODED_FILE_PREFIX)
            .tempfile()
            .context("Failed to create file")?;
        file.write_all(&content).context("Failed to write file")?;
        Ok::<_, anyhow::Error>(file.into_temp_path())
    })
    .await?
}
