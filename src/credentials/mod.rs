// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Selects the credential source of an account and resolves it to a
//! connection descriptor.

pub mod service_account;

use crate::collaborators::{OwnerLookup, SecretContext, SecretDecoder, ServiceAccountResolver};
use crate::error::{Result, ValidationError};
use crate::kubeconfig::{overrides, parse_kubeconfig, KubeconfigLoader};
use crate::types::{
    AuthSettings, ConnectionDescriptor, CredentialSource, KubernetesAccount,
    SecretInNamespaceReference,
};
use crate::validator::ValidationContext;
use service_account::{EnvLookup, ServiceAccountCredentialBuilder};
use tracing::{debug, instrument};

const INLINE_CONTENTS_REFERENCE: &str = "kubeconfigContents";

pub struct CredentialSourceResolver<'a> {
    pub decoder: &'a dyn SecretDecoder,
    pub owners: &'a dyn OwnerLookup,
    pub service_accounts: &'a dyn ServiceAccountResolver,
    pub env: &'a EnvLookup,
}

impl CredentialSourceResolver<'_> {
    /// Resolve the account's connection descriptor.
    ///
    /// `Ok(None)` means there is nothing to validate against.
    #[instrument(skip_all, fields(account = %account.name))]
    pub async fn resolve(
        &self,
        account: &KubernetesAccount,
        ctx: &ValidationContext,
    ) -> Result<Option<ConnectionDescriptor>> {
        let settings = AuthSettings::from_settings(&account.settings)?;
        let loader = KubeconfigLoader {
            decoder: self.decoder,
            bundle: ctx.bundle.as_ref(),
            secrets: ctx.secrets.as_ref(),
        };

        let Some(auth) = &account.auth else {
            debug!("No auth block, resolving from settings");
            return self.from_settings(&settings, &loader).await.map(Some);
        };

        match auth.source() {
            CredentialSource::KubeconfigFile(file) => {
                debug!("Using kubeconfigFile {}", file);
                loader.load(file, &settings).await.map(Some)
            }
            CredentialSource::InlineKubeconfig(kubeconfig) => {
                debug!("Using inline kubeconfig");
                overrides::resolve(kubeconfig.clone(), &settings)
                    .await
                    .map(Some)
            }
            CredentialSource::KubeconfigSecret(reference) => {
                self.from_secret(reference, &settings, ctx.secrets.as_ref())
                    .await
                    .map(Some)
            }
            CredentialSource::ServiceAccount => {
                debug!("Using the owning service's service account");
                ServiceAccountCredentialBuilder {
                    owners: self.owners,
                    service_accounts: self.service_accounts,
                    env: self.env,
                }
                .build(ctx.owner.as_ref(), ctx.secrets.as_ref())
                .await
            }
            CredentialSource::None => Err(ValidationError::NoAuthProvided),
        }
    }

    async fn from_secret(
        &self,
        reference: &SecretInNamespaceReference,
        settings: &AuthSettings,
        secrets: Option<&SecretContext>,
    ) -> Result<ConnectionDescriptor> {
        let secrets = secrets.ok_or_else(|| {
            ValidationError::SecretContextUnavailable(format!(
                "reading kubeconfig secret \"{}\"",
                reference.name
            ))
        })?;
        let namespace = reference.namespace.as_deref().unwrap_or(&secrets.namespace);
        let label = format!(
            "secret {}/{} key {}",
            namespace, reference.name, reference.key
        );

        debug!("Using kubeconfig from {}", label);

        let content = secrets
            .reader
            .secret_string(namespace, &reference.name, &reference.key)
            .await
            .map_err(|e| ValidationError::credential_load(&label, format!("{:#}", e)))?;

        let kubeconfig = parse_kubeconfig(content.as_bytes(), &label)?;
        overrides::resolve(kubeconfig, settings).await
    }

    async fn from_settings(
        &self,
        settings: &AuthSettings,
        loader: &KubeconfigLoader<'_>,
    ) -> Result<ConnectionDescriptor> {
        if let Some(file) = settings.kubeconfig_file() {
            return loader.load(file, settings).await;
        }
        if let Some(contents) = settings.kubeconfig_contents() {
            let kubeconfig = parse_kubeconfig(contents.as_bytes(), INLINE_CONTENTS_REFERENCE)?;
            return overrides::resolve(kubeconfig, settings).await;
        }
        Err(ValidationError::NoValidCredentialSource)
    }
}
