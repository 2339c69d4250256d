// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::collaborators::OwnerLookup;
use crate::kubernetes::client::ClusterClient;
use crate::types::{OwnerRecord, ServicePlatform};
use anyhow::Context;
use async_trait::async_trait;
use kube::{api::ListParams, Api};
use tracing::{debug, instrument, warn};

/// Finds the `ServicePlatform` of a namespace
#[derive(Clone)]
pub struct KubeOwnerLookup {
    client: ClusterClient,
}

impl KubeOwnerLookup {
    pub fn new(client: impl Into<ClusterClient>) -> Self {
        Self {
            client: client.into(),
        }
    }
}

#[async_trait]
impl OwnerLookup for KubeOwnerLookup {
    #[instrument(skip(self))]
    async fn find_owner(&self, namespace: &str) -> anyhow::Result<Option<OwnerRecord>> {
        let platforms: Api<ServicePlatform> = Api::namespaced(self.client.get().await?, namespace);
        let list = platforms
            .list(&ListParams::default())
            .await
            .with_context(|| format!("Failed to list service platforms in {}", namespace))?;

        if list.items.len() > 1 {
            warn!(
                "Found {} service platforms in namespace {}, using the first",
                list.items.len(),
                namespace
            );
        }

        let owner = list.items.first().map(OwnerRecord::from);
        if let Some(owner) = &owner {
            debug!("Service platform {} owns namespace {}", owner.name, namespace);
        } else {
            debug!("No service platform in namespace {}", namespace);
        }
        Ok(owner)
    }
}
