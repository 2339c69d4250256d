// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Loading kubeconfig files referenced by accounts.

use crate::collaborators::{is_encrypted_secret, ConfigBundle, SecretContext, SecretDecoder};
use crate::error::{Result, ValidationError};
use crate::kubeconfig::overrides;
use crate::types::{AuthSettings, ConnectionDescriptor};
use kube::config::Kubeconfig;
use std::path::Path;
use tracing::{debug, instrument};

/// Reads kubeconfig files by reference.
///
/// A reference is either an encrypted secret, an absolute path, or the name of
/// a file in the configuration bundle.
pub struct KubeconfigLoader<'a> {
    pub decoder: &'a dyn SecretDecoder,
    pub bundle: &'a dyn ConfigBundle,
    pub secrets: Option<&'a SecretContext>,
}

impl<'a> KubeconfigLoader<'a> {
    /// Load the referenced kubeconfig and resolve it with `settings` applied
    #[instrument(skip(self, settings))]
    pub async fn load(&self, reference: &str, settings: &AuthSettings) -> Result<ConnectionDescriptor> {
        let content = self.read(reference).await?;
        let kubeconfig = parse_kubeconfig(&content, reference)?;
        overrides::resolve(kubeconfig, settings).await
    }

    /// Fetch the raw bytes behind a reference
    pub async fn read(&self, reference: &str) -> Result<Vec<u8>> {
        if is_encrypted_secret(reference) {
            let secrets = self.secrets.ok_or_else(|| {
                ValidationError::SecretContextUnavailable(format!(
                    "decoding kubeconfigFile from secret reference \"{}\"",
                    reference
                ))
            })?;
            let path = self
                .decoder
                .decode_as_file(reference, secrets)
                .await
                .map_err(|e| {
                    ValidationError::credential_load(
                        reference,
                        format!("error decoding secret reference: {:#}", e),
                    )
                })?;
            debug!("Secret reference decoded to {}", path.display());
            read_file(&path, reference).await
        } else if Path::new(reference).is_absolute() {
            read_file(Path::new(reference), reference).await
        } else {
            self.bundle.file_content(reference).ok_or_else(|| {
                ValidationError::credential_load(reference, "no such file in the configuration bundle")
            })
        }
    }
}

async fn read_file(path: &Path, reference: &str) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        ValidationError::credential_load(reference, format!("error reading {}: {}", path.display(), e))
    })
}

/// Parse YAML or JSON kubeconfig content
pub fn parse_kubeconfig(content: &[u8], reference: &str) -> Result<Kubeconfig> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::credential_load(reference, "kubeconfig is empty"));
    }
    serde_yaml::from_slice(content).map_err(|e| {
        ValidationError::credential_load(reference, format!("error parsing kubeconfig: {}", e))
    })
}
