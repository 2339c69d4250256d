// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Checks on an account's settings document that need no cluster access.

use crate::constants::settings::{NAMESPACES, OMIT_NAMESPACES};
use crate::error::{Result, ValidationError};
use serde_json::Value;

/// Read `key` as a list of strings. Anything else reads as an empty list.
pub fn string_list(settings: &Value, key: &str) -> Vec<String> {
    settings
        .get(key)
        .and_then(|v| serde_json::from_value::<Vec<String>>(v.clone()).ok())
        .unwrap_or_default()
}

/// Namespaces the account is restricted to
pub fn namespaces(settings: &Value) -> Vec<String> {
    string_list(settings, NAMESPACES)
}

/// Ensure the account doesn't both include and exclude namespaces
pub fn validate_namespace_scope(settings: &Value) -> Result<()> {
    let namespaces = namespaces(settings);
    let omit_namespaces = string_list(settings, OMIT_NAMESPACES);

    if !namespaces.is_empty() && !omit_namespaces.is_empty() {
        return Err(ValidationError::ConflictingNamespaceScope);
    }
    Ok(())
}
