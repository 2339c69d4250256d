// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The resolved connection to an account's control plane.

use kube::config::AuthInfo;
use std::fmt;
use std::path::PathBuf;

/// Endpoint, trust material and credential for one validation call
#[derive(Clone, Debug)]
pub struct ConnectionDescriptor {
    pub host: http::Uri,
    pub tls: TlsTrust,
    pub credential: Credential,
    pub proxy_url: Option<http::Uri>,
}

/// TLS trust material of a descriptor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsTrust {
    /// DER encoded CA certificates
    pub root_cert: Option<Vec<Vec<u8>>>,
    /// Where the CA certificates were loaded from, when they came from a file.
    /// Temporary CA files are gone once the descriptor is built.
    pub ca_file: Option<PathBuf>,
    pub accept_invalid_certs: bool,
    pub server_name: Option<String>,
}

#[derive(Clone)]
pub enum Credential {
    BearerToken(String),
    /// Credential resolved from a kubeconfig user entry
    AuthInfo(Box<AuthInfo>),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Credential::AuthInfo(auth_info) => f.debug_tuple("AuthInfo").field(auth_info).finish(),
        }
    }
}

impl ConnectionDescriptor {
    /// Descriptor authenticating with a bearer token
    pub fn with_bearer_token(host: http::Uri, tls: TlsTrust, token: String) -> Self {
        ConnectionDescriptor {
            host,
            tls,
            credential: Credential::BearerToken(token),
            proxy_url: None,
        }
    }

    /// Build the client configuration for this descriptor
    pub fn to_kube_config(&self) -> kube::Config {
        let mut config = kube::Config::new(self.host.clone());
        config.root_cert = self.tls.root_cert.clone();
        config.accept_invalid_certs = self.tls.accept_invalid_certs;
        config.tls_server_name = self.tls.server_name.clone();
        config.proxy_url = self.proxy_url.clone();
        config.auth_info = match &self.credential {
            Credential::BearerToken(token) => AuthInfo {
                token: Some(token.clone().into()),
                ..Default::default()
            },
            Credential::AuthInfo(auth_info) => (**auth_info).clone(),
        };
        config
    }
}

impl From<kube::Config> for ConnectionDescriptor {
    fn from(config: kube::Config) -> Self {
        ConnectionDescriptor {
            host: config.cluster_url,
            tls: TlsTrust {
                root_cert: config.root_cert,
                ca_file: None,
                accept_invalid_certs: config.accept_invalid_certs,
                server_name: config.tls_server_name,
            },
            credential: Credential::AuthInfo(Box::new(config.auth_info)),
            proxy_url: config.proxy_url,
        }
    }
}
