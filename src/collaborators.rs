// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Interfaces to the systems the validator reads from.
//!
//! Kubernetes-backed implementations live in [`crate::kubernetes`].

use crate::constants::secrets::{ENCRYPTED_FILE_PREFIX, ENCRYPTED_PREFIX};
use crate::types::{ConnectionDescriptor, OwnerRecord};
use anyhow::bail;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;
use tracing::debug;

/// Reads a key of a secret
#[async_trait]
pub trait SecretReader: Send + Sync {
    async fn secret_string(&self, namespace: &str, name: &str, key: &str) -> anyhow::Result<String>;
}

/// The secret access the validator runs with: a namespace and a way to read secrets in it
#[derive(Clone)]
pub struct SecretContext {
    pub namespace: String,
    pub reader: Arc<dyn SecretReader>,
}

impl fmt::Debug for SecretContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretContext")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Resolves encrypted secret references to a readable local file.
///
/// The file is removed when the returned path is dropped.
#[async_trait]
pub trait SecretDecoder: Send + Sync {
    async fn decode_as_file(&self, reference: &str, secrets: &SecretContext) -> anyhow::Result<TempPath>;
}

/// Whether a value is an encrypted secret reference rather than a plain value
pub fn is_encrypted_secret(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX) || value.starts_with(ENCRYPTED_FILE_PREFIX)
}

/// Files shipped alongside the configuration that owns the accounts
pub trait ConfigBundle: Send + Sync {
    fn file_content(&self, name: &str) -> Option<Vec<u8>>;
}

impl ConfigBundle for HashMap<String, Vec<u8>> {
    fn file_content(&self, name: &str) -> Option<Vec<u8>> {
        self.get(name).cloned()
    }
}

/// A bundle backed by a directory, logical names being relative paths inside it
#[derive(Clone, Debug)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            bail!("config bundle {} is not a directory", root.display());
        }
        Ok(Self { root })
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        // Names must stay inside the bundle
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ConfigBundle for DirectoryBundle {
    fn file_content(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.resolve(name)?;
        match std::fs::read(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Unable to read bundle file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Finds the record owning the account registrations of a namespace
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    async fn find_owner(&self, namespace: &str) -> anyhow::Result<Option<OwnerRecord>>;
}

/// Token and CA bundle of an in-cluster service account. The CA file is
/// removed when the identity is dropped.
pub struct ServiceAccountIdentity {
    pub token: String,
    pub ca_path: TempPath,
}

impl fmt::Debug for ServiceAccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountIdentity")
            .field("token", &"<redacted>")
            .field("ca_path", &self.ca_path.display())
            .finish()
    }
}

#[async_trait]
pub trait ServiceAccountResolver: Send + Sync {
    async fn identity(&self, name: &str, namespace: &str) -> anyhow::Result<ServiceAccountIdentity>;
}

/// Builds API clients for resolved descriptors
pub trait ClientFactory: Send + Sync {
    fn client_for(&self, descriptor: &ConnectionDescriptor) -> anyhow::Result<kube::Client>;
}
