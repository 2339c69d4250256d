// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Result};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kubeaccount::collaborators::{ConfigBundle, DirectoryBundle, SecretContext};
use kubeaccount::config::{load_accounts, Config};
use kubeaccount::kubernetes::{
    ClusterClient, K8sSecretDecoder, KubeClientFactory, KubeOwnerLookup, KubeSecretReader,
    KubeServiceAccountResolver,
};
use kubeaccount::validator::{ValidationContext, Validator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Kubernetes account validation");

    // Load configuration
    let config = Config::from_env()?;
    let accounts = load_accounts(&config.accounts_file)?;
    info!(
        "Loaded {} accounts from {}",
        accounts.len(),
        config.accounts_file.display()
    );

    // Client for secrets, owners and service accounts, created on first use
    let client = ClusterClient::lazy();

    let bundle: Arc<dyn ConfigBundle> = match &config.bundle_dir {
        Some(dir) => Arc::new(DirectoryBundle::new(dir)?),
        None => Arc::new(HashMap::<String, Vec<u8>>::new()),
    };

    let cancellation = CancellationToken::new();
    let mut ctx = ValidationContext::new(bundle).with_cancellation(cancellation.clone());
    match &config.namespace {
        Some(namespace) => {
            info!("Reading secrets from namespace {}", namespace);
            ctx = ctx.with_secrets(SecretContext {
                namespace: namespace.clone(),
                reader: Arc::new(KubeSecretReader::new(client.clone())),
            });
        }
        None => warn!("VALIDATOR_NAMESPACE not set, secret-backed credentials will fail"),
    }

    let validator = Validator::new(
        Arc::new(K8sSecretDecoder),
        Arc::new(KubeOwnerLookup::new(client.clone())),
        Arc::new(KubeServiceAccountResolver::new(client)),
        Arc::new(KubeClientFactory),
    );

    let timeout = config.timeout;
    let deadline = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        warn!("Validation did not finish within {:?}, cancelling", timeout);
        deadline.cancel();
    });

    let results = join_all(accounts.iter().map(|account| validator.validate(account, &ctx))).await;

    let mut failed = 0;
    for (account, result) in accounts.iter().zip(results) {
        match result {
            Ok(()) => info!("Account {} is valid", account.name),
            Err(e) => {
                failed += 1;
                error!("Account {} failed validation: {}", account.name, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} accounts failed validation", failed, accounts.len());
    }
    info!("All {} accounts validated", accounts.len());
    Ok(())
}
