// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::config::KubeconfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("at most one of \"namespaces\" and \"omitNamespaces\" can be supplied")]
    ConflictingNamespaceScope,

    #[error("kubernetes auth needs to be defined")]
    NoAuthProvided,

    #[error("no valid kubeconfig file, kubeconfig content or service account information found")]
    NoValidCredentialSource,

    #[error("no service account name configured in the owning service settings")]
    NoServiceAccountName,

    #[error("invalid account settings: {0}")]
    InvalidSettings(String),

    #[error("error loading kubeconfig \"{reference}\":\n  {message}")]
    CredentialLoadFailure { reference: String, message: String },

    #[error("secret access context unavailable: {0}")]
    SecretContextUnavailable(String),

    #[error("service account lookup failed: {0}")]
    ServiceAccountLookup(String),

    #[error("unable to resolve API server host: {0}")]
    ApiHostUnresolved(String),

    #[error("error building connection from kubeconfig:\n  {0}")]
    MergeFailure(#[source] KubeconfigError),

    #[error("unable to build kubernetes client from connection descriptor: {0}")]
    ClientBuild(String),

    #[error("access denied listing {} in account \"{account}\"{}:\n  {source}", probe_target(.namespace), namespace_suffix(.namespace))]
    AccessDenied {
        account: String,
        namespace: Option<String>,
        #[source]
        source: kube::Error,
    },

    #[error("error listing {} in account \"{account}\"{}:\n  {source}", probe_target(.namespace), namespace_suffix(.namespace))]
    ProbeFailure {
        account: String,
        namespace: Option<String>,
        #[source]
        source: kube::Error,
    },

    #[error("validation cancelled")]
    Cancelled,
}

impl ValidationError {
    pub(crate) fn credential_load(reference: &str, message: impl std::fmt::Display) -> Self {
        ValidationError::CredentialLoadFailure {
            reference: reference.to_string(),
            message: message.to_string(),
        }
    }
}

fn probe_target(namespace: &Option<String>) -> &'static str {
    if namespace.is_some() {
        "pods"
    } else {
        "namespaces"
    }
}

fn namespace_suffix(namespace: &Option<String>) -> String {
    namespace
        .as_ref()
        .map(|ns| format!(", namespace \"{}\"", ns))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ValidationError>;
