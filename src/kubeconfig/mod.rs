// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig loading and override merging.

pub mod loader;
pub mod overrides;

pub use loader::{parse_kubeconfig, KubeconfigLoader};
pub use overrides::{build_overrides, merge, resolve, Overrides};
