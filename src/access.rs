// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Live check that a resolved descriptor can read from its cluster.

use crate::collaborators::ClientFactory;
use crate::error::{Result, ValidationError};
use crate::settings;
use crate::types::{ConnectionDescriptor, KubernetesAccount};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{api::ListParams, Api, Client};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

pub struct AccessValidator<'a> {
    pub clients: &'a dyn ClientFactory,
}

impl AccessValidator<'_> {
    /// Probe the cluster with a single list call.
    ///
    /// Lists namespaces when the account isn't restricted to namespaces,
    /// otherwise lists pods in the first configured namespace only.
    #[instrument(skip_all, fields(account = %account.name))]
    pub async fn validate(
        &self,
        account: &KubernetesAccount,
        descriptor: &ConnectionDescriptor,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        let client = self
            .clients
            .client_for(descriptor)
            .map_err(|e| ValidationError::ClientBuild(format!("{:#}", e)))?;

        let namespace = settings::namespaces(&account.settings).into_iter().next();

        let outcome = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(ValidationError::Cancelled),
            outcome = probe(client, namespace.as_deref()) => outcome,
        };

        outcome.map_err(|source| probe_error(&account.name, namespace, source))
    }
}

async fn probe(client: Client, namespace: Option<&str>) -> std::result::Result<(), kube::Error> {
    let lp = ListParams::default().limit(1);
    match namespace {
        None => {
            debug!("Listing namespaces");
            Api::<Namespace>::all(client).list(&lp).await?;
        }
        Some(namespace) => {
            debug!("Listing pods in namespace {}", namespace);
            Api::<Pod>::namespaced(client, namespace).list(&lp).await?;
        }
    }
    Ok(())
}

fn probe_error(account: &str, namespace: Option<String>, source: kube::Error) -> ValidationError {
    let account = account.to_string();
    let denied = matches!(&source, kube::Error::Api(err) if err.code == 401 || err.code == 403);
    if denied {
        ValidationError::AccessDenied {
            account,
            namespace,
            source,
        }
    } else {
        ValidationError::ProbeFailure {
            account,
            namespace,
            source,
        }
    }
}
