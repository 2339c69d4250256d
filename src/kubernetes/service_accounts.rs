// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service account identities read from token secrets

use crate::collaborators::{ServiceAccountIdentity, ServiceAccountResolver};
use crate::constants::in_cluster::{CA_KEY, SERVICE_ACCOUNT_ANNOTATION, TOKEN_KEY, TOKEN_SECRET_TYPE};
use crate::kubernetes::client::ClusterClient;
use crate::kubernetes::secrets::{secret_value, write_private_file};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use kube::{api::ListParams, Api, ResourceExt};
use tracing::{debug, instrument};

/// Resolves a service account to the token and CA of its token secret
#[derive(Clone)]
pub struct KubeServiceAccountResolver {
    client: ClusterClient,
}

impl KubeServiceAccountResolver {
    pub fn new(client: impl Into<ClusterClient>) -> Self {
        Self {
            client: client.into(),
        }
    }
}

#[async_trait]
impl ServiceAccountResolver for KubeServiceAccountResolver {
    #[instrument(skip(self))]
    async fn identity(&self, name: &str, namespace: &str) -> anyhow::Result<ServiceAccountIdentity> {
        let client = self.client.get().await?;
        let accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), namespace);
        let account = accounts
            .get(name)
            .await
            .with_context(|| format!("Failed to get service account {}/{}", namespace, name))?;

        let referenced: Vec<String> = account
            .secrets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| r.name)
            .collect();

        let secrets: Api<Secret> = Api::namespaced(client, namespace);
        let lp = ListParams::default().fields(&format!("type={}", TOKEN_SECRET_TYPE));
        let secret = secrets
            .list(&lp)
            .await
            .with_context(|| format!("Failed to list token secrets in {}", namespace))?
            .items
            .into_iter()
            .find(|s| is_token_secret_of(s, name, &referenced))
            .ok_or_else(|| {
                anyhow!(
                    "No token secret found for service account {}/{}",
                    namespace,
                    name
                )
            })?;

        debug!("Using token secret {} of {}/{}", secret.name_any(), namespace, name);

        let token = secret_value(&secret, TOKEN_KEY)?;
        let ca = secret_value(&secret, CA_KEY)?;
        let ca_path = write_private_file(ca.into_bytes()).await?;

        Ok(ServiceAccountIdentity { token, ca_path })
    }
}

fn is_token_secret_of(secret: &Secret, account: &str, referenced: &[String]) -> bool {
    if secret.type_.as_deref() != Some(TOKEN_SECRET_TYPE) {
        return false;
    }
    secret
        .annotations()
        .get(SERVICE_ACCOUNT_ANNOTATION)
        .is_some_and(|a| a == account)
        || referenced.contains(&secret.name_any())
}
