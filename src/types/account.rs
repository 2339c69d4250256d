// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{Result, ValidationError};
use kube::config::Kubeconfig;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A Kubernetes cluster registered as a deployment account
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesAccount {
    pub name: String,
    #[serde(default)]
    pub settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AccountAuth>,
}

/// Structured credential declaration of an account.
///
/// Only one field is expected to be set. When several are, the first one in
/// declaration order wins, see [`AccountAuth::source`].
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<Kubeconfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_secret: Option<SecretInNamespaceReference>,
    #[serde(default)]
    pub use_service_account: bool,
}

/// Reference to a key of a secret
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretInNamespaceReference {
    pub name: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// The credential strategy selected for an account
#[derive(Clone, Debug)]
pub enum CredentialSource<'a> {
    KubeconfigFile(&'a str),
    InlineKubeconfig(&'a Kubeconfig),
    KubeconfigSecret(&'a SecretInNamespaceReference),
    ServiceAccount,
    /// An auth block was declared but selects nothing
    None,
}

impl AccountAuth {
    pub fn source(&self) -> CredentialSource<'_> {
        if let Some(file) = self.kubeconfig_file.as_deref().filter(|f| !f.is_empty()) {
            CredentialSource::KubeconfigFile(file)
        } else if let Some(kubeconfig) = &self.kubeconfig {
            CredentialSource::InlineKubeconfig(kubeconfig)
        } else if let Some(secret) = &self.kubeconfig_secret {
            CredentialSource::KubeconfigSecret(secret)
        } else if self.use_service_account {
            CredentialSource::ServiceAccount
        } else {
            CredentialSource::None
        }
    }
}

/// Kubeconfig-related view over an account's settings document
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    /// User to use in the kubeconfig file
    #[serde(default)]
    pub user: Option<String>,
    /// Context to use in the kubeconfig file if not the current one
    #[serde(default)]
    pub context: Option<String>,
    /// Cluster to use in the kubeconfig file
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub service_account: Option<bool>,
    #[serde(default)]
    pub kubeconfig_file: Option<String>,
    #[serde(default)]
    pub kubeconfig_contents: Option<String>,
    #[serde(default, rename = "oAuthServiceAccount")]
    pub oauth_service_account: Option<String>,
    #[serde(default, rename = "oAuthScopes", deserialize_with = "null_as_empty")]
    pub oauth_scopes: Vec<String>,
}

impl AuthSettings {
    /// Parse the auth view out of an untyped settings document.
    /// Unrelated keys are ignored; a known key with the wrong type is an error.
    pub fn from_settings(settings: &Value) -> Result<Self> {
        if settings.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(settings.clone())
            .map_err(|e| ValidationError::InvalidSettings(e.to_string()))
    }

    pub fn user(&self) -> Option<&str> {
        non_empty(&self.user)
    }

    pub fn context(&self) -> Option<&str> {
        non_empty(&self.context)
    }

    pub fn cluster(&self) -> Option<&str> {
        non_empty(&self.cluster)
    }

    pub fn kubeconfig_file(&self) -> Option<&str> {
        non_empty(&self.kubeconfig_file)
    }

    pub fn kubeconfig_contents(&self) -> Option<&str> {
        non_empty(&self.kubeconfig_contents)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
