// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod access;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod kubeconfig;
pub mod kubernetes;
pub mod settings;
pub mod types;
pub mod validator;

#[cfg(test)]
mod test_utils;
