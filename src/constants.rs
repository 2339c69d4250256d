// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Keys read from an account's settings document
pub mod settings {
    pub const NAMESPACES: &str = "namespaces";
    pub const OMIT_NAMESPACES: &str = "omitNamespaces";
}

/// Nested owner setting holding the service account the owning service runs as
pub const SERVICE_ACCOUNT_NAME_SETTING: &str = "kubernetes.serviceAccountName";

/// Auth provider injected when OAuth scopes are configured
pub const OAUTH_PROVIDER_NAME: &str = "gcp";
pub const OAUTH_SCOPES_KEY: &str = "scopes";

/// Names under which overrides are spliced into a kubeconfig before loading
pub mod overrides {
    pub const AUTH_INFO_ENTRY: &str = "kubeaccount-override-user";
    pub const CLUSTER_ENTRY: &str = "kubeaccount-override-cluster";
}

/// Encrypted secret references
pub mod secrets {
    pub const ENCRYPTED_PREFIX: &str = "encrypted:";
    pub const ENCRYPTED_FILE_PREFIX: &str = "encryptedFile:";
    /// Engine name for references resolved from Kubernetes secrets
    pub const K8S_ENGINE: &str = "k8s";
    pub const NAME_PARAM: &str = "n";
    pub const KEY_PARAM: &str = "k";
    /// Prefix of files written for decoded secrets
    pub const DECODED_FILE_PREFIX: &str = "kubeaccount-";
}

/// In-cluster API server discovery
pub mod in_cluster {
    pub const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
    pub const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";
    pub const TOKEN_SECRET_TYPE: &str = "kubernetes.io/service-account-token";
    pub const SERVICE_ACCOUNT_ANNOTATION: &str = "kubernetes.io/service-account.name";
    pub const TOKEN_KEY: &str = "token";
    pub const CA_KEY: &str = "ca.crt";
}
