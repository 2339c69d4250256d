// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation for validated accounts and for the validator's own cluster

use crate::collaborators::ClientFactory;
use crate::types::ConnectionDescriptor;
use anyhow::Context;
use kube::Client;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Builds real API clients from connection descriptors
#[derive(Clone, Debug, Default)]
pub struct KubeClientFactory;

impl ClientFactory for KubeClientFactory {
    #[instrument(skip_all, fields(host = %descriptor.host))]
    fn client_for(&self, descriptor: &ConnectionDescriptor) -> anyhow::Result<Client> {
        debug!("Creating client for {}", descriptor.host);
        Client::try_from(descriptor.to_kube_config())
            .with_context(|| format!("Failed to create client for {}", descriptor.host))
    }
}

/// Client for the cluster the validator itself runs in. A lazy client is
/// only created from the default configuration once something asks for it.
#[derive(Clone, Default)]
pub struct ClusterClient {
    cell: Arc<OnceCell<Client>>,
}

impl ClusterClient {
    pub fn lazy() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> anyhow::Result<Client> {
        self.cell
            .get_or_try_init(|| async {
                debug!("Creating cluster client from the default configuration");
                Client::try_default()
                    .await
                    .context("Failed to create cluster client")
            })
            .await
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl From<Client> for ClusterClient {
    fn from(client: Client) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(client))),
        }
    }
}
