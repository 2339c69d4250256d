// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Accounts, owners and the resolved connection descriptor.

pub mod account;
pub mod descriptor;
pub mod owner;

pub use account::{AccountAuth, AuthSettings, CredentialSource, KubernetesAccount, SecretInNamespaceReference};
pub use descriptor::{ConnectionDescriptor, Credential, TlsTrust};
pub use owner::{OwnerRecord, ServicePlatform};
