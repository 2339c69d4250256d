// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes-backed collaborators: secrets, owners, service accounts and clients.

pub mod client;
pub mod owners;
pub mod secrets;
pub mod service_accounts;

pub use client::{ClusterClient, KubeClientFactory};
pub use owners::KubeOwnerLookup;
pub use secrets::{K8sSecretDecoder, KubeSecretReader};
pub use service_accounts::KubeServiceAccountResolver;
