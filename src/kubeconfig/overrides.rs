// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Account settings applied on top of a parsed kubeconfig.

use crate::constants::overrides::{AUTH_INFO_ENTRY, CLUSTER_ENTRY};
use crate::constants::{OAUTH_PROVIDER_NAME, OAUTH_SCOPES_KEY};
use crate::error::{Result, ValidationError};
use crate::types::{AuthSettings, ConnectionDescriptor};
use kube::config::{
    AuthInfo, AuthProviderConfig, Cluster, KubeConfigOptions, Kubeconfig, NamedAuthInfo,
    NamedCluster,
};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Values replacing what the selected context would resolve to
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub current_context: Option<String>,
    pub auth_info: Option<AuthInfo>,
    pub cluster_info: Option<Cluster>,
}

/// Derive overrides from account settings.
///
/// `user` and `cluster` only apply when the kubeconfig has an entry of that
/// name. OAuth scopes replace whatever user was selected.
pub fn build_overrides(kubeconfig: &Kubeconfig, settings: &AuthSettings) -> Overrides {
    let mut overrides = Overrides {
        current_context: settings.context().map(str::to_string),
        ..Default::default()
    };

    if let Some(user) = settings.user() {
        match find_auth_info(kubeconfig, user) {
            Some(auth_info) => overrides.auth_info = Some(auth_info),
            None => warn!(
                "Kubeconfig has no user named \"{}\", keeping the context's user",
                user
            ),
        }
    }

    if let Some(cluster) = settings.cluster() {
        match find_cluster(kubeconfig, cluster) {
            Some(cluster_info) => overrides.cluster_info = Some(cluster_info),
            None => warn!(
                "Kubeconfig has no cluster named \"{}\", keeping the context's cluster",
                cluster
            ),
        }
    }

    if !settings.oauth_scopes.is_empty() {
        overrides.auth_info = Some(oauth_auth_info(&settings.oauth_scopes));
    }

    overrides
}

fn find_auth_info(kubeconfig: &Kubeconfig, name: &str) -> Option<AuthInfo> {
    kubeconfig
        .auth_infos
        .iter()
        .find(|named| named.name == name)
        .and_then(|named| named.auth_info.clone())
}

fn find_cluster(kubeconfig: &Kubeconfig, name: &str) -> Option<Cluster> {
    kubeconfig
        .clusters
        .iter()
        .find(|named| named.name == name)
        .and_then(|named| named.cluster.clone())
}

fn oauth_auth_info(scopes: &[String]) -> AuthInfo {
    AuthInfo {
        auth_provider: Some(AuthProviderConfig {
            name: OAUTH_PROVIDER_NAME.to_string(),
            config: HashMap::from([(OAUTH_SCOPES_KEY.to_string(), scopes.join(","))]),
        }),
        ..Default::default()
    }
}

/// Resolve the selected context of `kubeconfig` with `overrides` applied
#[instrument(skip_all, fields(context = ?overrides.current_context))]
pub async fn merge(mut kubeconfig: Kubeconfig, overrides: Overrides) -> Result<ConnectionDescriptor> {
    let mut options = KubeConfigOptions {
        context: overrides.current_context,
        ..Default::default()
    };

    if let Some(auth_info) = overrides.auth_info {
        kubeconfig.auth_infos.push(NamedAuthInfo {
            name: AUTH_INFO_ENTRY.to_string(),
            auth_info: Some(auth_info),
        });
        options.user = Some(AUTH_INFO_ENTRY.to_string());
    }

    if let Some(cluster) = overrides.cluster_info {
        kubeconfig.clusters.push(NamedCluster {
            name: CLUSTER_ENTRY.to_string(),
            cluster: Some(cluster),
        });
        options.cluster = Some(CLUSTER_ENTRY.to_string());
    }

    let config = kube::Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .map_err(ValidationError::MergeFailure)?;

    debug!("Resolved kubeconfig to API server {}", config.cluster_url);
    Ok(ConnectionDescriptor::from(config))
}

/// Build overrides from `settings` and merge them onto `kubeconfig`
pub async fn resolve(kubeconfig: Kubeconfig, settings: &AuthSettings) -> Result<ConnectionDescriptor> {
    let overrides = build_overrides(&kubeconfig, settings);
    merge(kubeconfig, overrides).await
}
