// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The service platform that owns a set of account registrations.
/// One is expected per namespace.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "platform.kubeaccount.io", version = "v1", kind = "ServicePlatform")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ServicePlatformSpec {
    /// Free-form settings of the service that talks to the registered clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_settings: Option<Value>,
}

/// The owning record of an account, as seen by the validator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnerRecord {
    pub name: String,
    pub namespace: String,
    pub settings: Value,
}

impl OwnerRecord {
    /// Look up a dotted path (`a.b.c`) in the owner's settings as a string
    pub fn setting_str(&self, path: &str) -> Option<&str> {
        path.split('.')
            .try_fold(&self.settings, |value, key| value.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<&ServicePlatform> for OwnerRecord {
    fn from(platform: &ServicePlatform) -> Self {
        OwnerRecord {
            name: platform.name_any(),
            namespace: platform.namespace().unwrap_or_default(),
            settings: platform.spec.service_settings.clone().unwrap_or_default(),
        }
    }
}
