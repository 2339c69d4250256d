// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Account validation entry point.

use crate::access::AccessValidator;
use crate::collaborators::{
    ClientFactory, ConfigBundle, OwnerLookup, SecretContext, SecretDecoder, ServiceAccountResolver,
};
use crate::credentials::service_account::EnvLookup;
use crate::credentials::CredentialSourceResolver;
use crate::error::{Result, ValidationError};
use crate::settings;
use crate::types::{KubernetesAccount, OwnerRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Everything a single validation call runs with
#[derive(Clone)]
pub struct ValidationContext {
    /// Secret access of the caller. Sources that read secrets fail without it.
    pub secrets: Option<SecretContext>,
    /// Files shipped alongside the accounts' configuration
    pub bundle: Arc<dyn ConfigBundle>,
    /// Owner of the accounts, when the caller already has it
    pub owner: Option<OwnerRecord>,
    pub cancellation: CancellationToken,
}

impl ValidationContext {
    pub fn new(bundle: Arc<dyn ConfigBundle>) -> Self {
        Self {
            secrets: None,
            bundle,
            owner: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_secrets(mut self, secrets: SecretContext) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn with_owner(mut self, owner: OwnerRecord) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new(Arc::new(HashMap::<String, Vec<u8>>::new()))
    }
}

/// Validates Kubernetes accounts: settings first, then credential
/// resolution, then one live read against the cluster.
pub struct Validator {
    decoder: Arc<dyn SecretDecoder>,
    owners: Arc<dyn OwnerLookup>,
    service_accounts: Arc<dyn ServiceAccountResolver>,
    clients: Arc<dyn ClientFactory>,
    env: Arc<EnvLookup>,
}

impl Validator {
    pub fn new(
        decoder: Arc<dyn SecretDecoder>,
        owners: Arc<dyn OwnerLookup>,
        service_accounts: Arc<dyn ServiceAccountResolver>,
        clients: Arc<dyn ClientFactory>,
    ) -> Self {
        let env: Arc<EnvLookup> = Arc::new(|key: &str| std::env::var(key).ok());
        Self {
            decoder,
            owners,
            service_accounts,
            clients,
            env,
        }
    }

    /// Replace how environment variables are read
    pub fn with_env(mut self, env: Arc<EnvLookup>) -> Self {
        self.env = env;
        self
    }

    #[instrument(skip_all, fields(account = %account.name))]
    pub async fn validate(&self, account: &KubernetesAccount, ctx: &ValidationContext) -> Result<()> {
        settings::validate_namespace_scope(&account.settings)?;

        let resolver = CredentialSourceResolver {
            decoder: self.decoder.as_ref(),
            owners: self.owners.as_ref(),
            service_accounts: self.service_accounts.as_ref(),
            env: self.env.as_ref(),
        };

        let resolved = tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => return Err(ValidationError::Cancelled),
            resolved = resolver.resolve(account, ctx) => resolved?,
        };

        let Some(descriptor) = resolved else {
            info!("Nothing to validate account {} against, skipping", account.name);
            return Ok(());
        };

        AccessValidator {
            clients: self.clients.as_ref(),
        }
        .validate(account, &descriptor, &ctx.cancellation)
        .await?;

        info!("Account {} validated against {}", account.name, descriptor.host);
        Ok(())
    }
}
