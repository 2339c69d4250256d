// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::KubernetesAccount;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Validator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// YAML file holding the accounts to validate
    pub accounts_file: PathBuf,
    /// Namespace whose secrets the validator may read
    pub namespace: Option<String>,
    /// Directory resolving kubeconfig files referenced by name
    pub bundle_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let accounts_file = non_empty("ACCOUNTS_FILE")
            .map(PathBuf::from)
            .context("ACCOUNTS_FILE environment variable not set")?;
        let namespace = non_empty("VALIDATOR_NAMESPACE");
        let bundle_dir = non_empty("CONFIG_BUNDLE_DIR").map(PathBuf::from);
        let timeout = match non_empty("VALIDATION_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .with_context(|| format!("VALIDATION_TIMEOUT_SECS is not a number: {}", secs))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            accounts_file,
            namespace,
            bundle_dir,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// Read the list of accounts to validate
pub fn load_accounts(path: &Path) -> Result<Vec<KubernetesAccount>> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read accounts file {}", path.display()))?;
    serde_yaml::from_slice(&content)
        .with_context(|| format!("Failed to parse accounts file {}", path.display()))
}
