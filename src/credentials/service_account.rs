// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Connection descriptors built from the owning service's own service account.

use crate::collaborators::{OwnerLookup, SecretContext, ServiceAccountResolver};
use crate::constants::in_cluster::{SERVICE_HOST_ENV, SERVICE_PORT_ENV};
use crate::constants::SERVICE_ACCOUNT_NAME_SETTING;
use crate::error::{Result, ValidationError};
use crate::types::{ConnectionDescriptor, OwnerRecord, TlsTrust};
use anyhow::{bail, Context};
use kube::config::KubeConfigOptions;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Environment variable lookup
pub type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

pub struct ServiceAccountCredentialBuilder<'a> {
    pub owners: &'a dyn OwnerLookup,
    pub service_accounts: &'a dyn ServiceAccountResolver,
    pub env: &'a EnvLookup,
}

impl ServiceAccountCredentialBuilder<'_> {
    /// Build a descriptor for the service account the owner runs as.
    ///
    /// Returns `None` when no owner can be found, in which case there is
    /// nothing to validate against.
    #[instrument(skip_all)]
    pub async fn build(
        &self,
        owner: Option<&OwnerRecord>,
        secrets: Option<&SecretContext>,
    ) -> Result<Option<ConnectionDescriptor>> {
        let owner = match owner {
            Some(owner) => owner.clone(),
            None => match self.find_owner(secrets).await? {
                Some(owner) => owner,
                None => return Ok(None),
            },
        };

        let name = owner
            .setting_str(SERVICE_ACCOUNT_NAME_SETTING)
            .ok_or(ValidationError::NoServiceAccountName)?;

        debug!(
            "Using service account {}/{} of {}",
            owner.namespace, name, owner.name
        );

        let identity = self
            .service_accounts
            .identity(name, &owner.namespace)
            .await
            .map_err(|e| {
                ValidationError::ServiceAccountLookup(format!(
                    "service account {}/{}: {:#}",
                    owner.namespace, name, e
                ))
            })?;

        let tls = match load_ca_bundle(&identity.ca_path).await {
            Ok(certs) => TlsTrust {
                root_cert: Some(certs),
                ca_file: Some(identity.ca_path.to_path_buf()),
                ..Default::default()
            },
            Err(e) => {
                warn!(
                    "Expected to load root CA config from {}, but got err: {:#}",
                    identity.ca_path.display(),
                    e
                );
                TlsTrust::default()
            }
        };

        let host = api_server_host(self.env).await?;

        Ok(Some(ConnectionDescriptor::with_bearer_token(
            host,
            tls,
            identity.token,
        )))
    }

    async fn find_owner(&self, secrets: Option<&SecretContext>) -> Result<Option<OwnerRecord>> {
        let secrets = secrets.ok_or_else(|| {
            ValidationError::SecretContextUnavailable("looking up the owning service".to_string())
        })?;

        let owner = self
            .owners
            .find_owner(&secrets.namespace)
            .await
            .map_err(|e| {
                ValidationError::ServiceAccountLookup(format!(
                    "finding owning service in namespace {}: {:#}",
                    secrets.namespace, e
                ))
            })?;

        if owner.is_none() {
            info!(
                "No owning service found in namespace {}, skipping validation",
                secrets.namespace
            );
        }
        Ok(owner)
    }
}

/// Load a PEM CA bundle. At least one certificate is required.
pub async fn load_ca_bundle(path: &Path) -> anyhow::Result<Vec<Vec<u8>>> {
    let pem = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .map(|cert| cert.map(|c| c.as_ref().to_vec()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("parsing {}", path.display()))?;

    if certs.is_empty() {
        bail!("no certificates found in {}", path.display());
    }
    Ok(certs)
}

/// The API server to reach from here: the in-cluster service when running in
/// a pod, the default kubeconfig's server otherwise
pub async fn api_server_host(env: &EnvLookup) -> Result<http::Uri> {
    let host = env(SERVICE_HOST_ENV).filter(|h| !h.is_empty());
    let port = env(SERVICE_PORT_ENV).filter(|p| !p.is_empty());

    if let (Some(host), Some(port)) = (host, port) {
        return in_cluster_host(&host, &port);
    }

    debug!("Not running in cluster, reading the API server from the default kubeconfig");
    let config = kube::Config::from_kubeconfig(&KubeConfigOptions::default())
        .await
        .map_err(|e| ValidationError::ApiHostUnresolved(e.to_string()))?;
    Ok(config.cluster_url)
}

fn in_cluster_host(host: &str, port: &str) -> Result<http::Uri> {
    let host = if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };

    format!("https://{}:{}", host, port)
        .parse()
        .map_err(|e| ValidationError::ApiHostUnresolved(format!("{}:{}: {}", host, port, e)))
}
