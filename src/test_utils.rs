// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and validator collaborators.

use crate::collaborators::{
    ClientFactory, OwnerLookup, SecretContext, SecretDecoder, SecretReader, ServiceAccountIdentity,
    ServiceAccountResolver,
};
use crate::constants::in_cluster::{SERVICE_HOST_ENV, SERVICE_PORT_ENV};
use crate::types::{ConnectionDescriptor, Credential, OwnerRecord, TlsTrust};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::config::Kubeconfig;
use kube::Client;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tempfile::TempPath;
use tower::Service;

/// Kubeconfig with a `prod` and a `staging` context, `prod` being current
pub const SAMPLE_KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: prod
clusters:
  - name: prod
    cluster:
      server: https://prod.example.com:6443
      insecure-skip-tls-verify: true
  - name: staging
    cluster:
      server: https://staging.example.com:6443
      insecure-skip-tls-verify: true
contexts:
  - name: prod
    context:
      cluster: prod
      user: prod-user
  - name: staging
    context:
      cluster: staging
      user: staging-user
users:
  - name: prod-user
    user:
      username: prod
      token: prod-token
  - name: staging-user
    user:
      username: staging
      token: staging-token
"#;

/// A single certificate. Only the PEM framing is real.
pub const SAMPLE_CA_PEM: &str = "-----BEGIN CERTIFICATE-----\nAQIDBA==\n-----END CERTIFICATE-----\n";

pub fn sample_kubeconfig() -> Kubeconfig {
    serde_yaml::from_str(SAMPLE_KUBECONFIG).unwrap()
}

/// The kubeconfig user a descriptor resolved to, as JSON
pub fn auth_info_json(descriptor: &ConnectionDescriptor) -> serde_json::Value {
    match &descriptor.credential {
        Credential::AuthInfo(auth_info) => serde_json::to_value(auth_info.as_ref()).unwrap(),
        Credential::BearerToken(_) => panic!("descriptor has a bearer token, not a kubeconfig user"),
    }
}

pub fn bearer_descriptor() -> ConnectionDescriptor {
    ConnectionDescriptor::with_bearer_token(
        "https://10.0.0.1:443".parse().unwrap(),
        TlsTrust::default(),
        "token".to_string(),
    )
}

/// Environment of a pod running next to the API server at `host:port`
pub fn in_cluster_env(host: &str, port: &str) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let host = host.to_string();
    let port = port.to_string();
    move |key: &str| match key {
        SERVICE_HOST_ENV => Some(host.clone()),
        SERVICE_PORT_ENV => Some(port.clone()),
        _ => None,
    }
}

/// Owner in namespace `deploy` running as `service_account`
pub fn owner_record(service_account: &str) -> OwnerRecord {
    OwnerRecord {
        name: "platform".to_string(),
        namespace: "deploy".to_string(),
        settings: serde_json::json!({
            "kubernetes": { "serviceAccountName": service_account }
        }),
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Method and path of every request received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create an empty list response of the given kind
pub fn list_json(kind: &str) -> String {
    items_json("v1", kind, Vec::new())
}

/// Create a list response holding `items`
pub fn items_json(api_version: &str, kind: &str, items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// Create a secret response holding `data`
pub fn secret_json(namespace: &str, name: &str, type_: Option<&str>, data: &[(&str, &str)]) -> String {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        type_: type_.map(str::to_string),
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Default::default()
    };
    serde_json::to_string(&secret).unwrap()
}

/// Create a failure `Status` response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Secret reader over an in-memory map, recording every read
#[derive(Default)]
pub struct MockSecretReader {
    secrets: HashMap<(String, String, String), String>,
    requests: Mutex<Vec<(String, String, String)>>,
}

impl MockSecretReader {
    pub fn with_secret(mut self, namespace: &str, name: &str, key: &str, value: &str) -> Self {
        self.secrets.insert(
            (namespace.to_string(), name.to_string(), key.to_string()),
            value.to_string(),
        );
        self
    }

    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretReader for MockSecretReader {
    async fn secret_string(&self, namespace: &str, name: &str, key: &str) -> anyhow::Result<String> {
        let request = (namespace.to_string(), name.to_string(), key.to_string());
        self.requests.lock().unwrap().push(request.clone());
        self.secrets
            .get(&request)
            .cloned()
            .ok_or_else(|| anyhow!("secret {}/{} has no key {}", namespace, name, key))
    }
}

/// Decoder mapping known references to prepared files. Every decode hands
/// out a fresh temporary copy of the prepared file.
#[derive(Default)]
pub struct MockSecretDecoder {
    files: HashMap<String, PathBuf>,
    decoded: Mutex<Vec<String>>,
    issued: Mutex<Vec<PathBuf>>,
}

impl MockSecretDecoder {
    pub fn with_file(mut self, reference: &str, path: &Path) -> Self {
        self.files.insert(reference.to_string(), path.to_path_buf());
        self
    }

    pub fn decoded(&self) -> Vec<String> {
        self.decoded.lock().unwrap().clone()
    }

    /// Paths of the copies handed out so far
    pub fn issued(&self) -> Vec<PathBuf> {
        self.issued.lock().unwrap().clone()
    }
}

/// Copy `content` into a temporary file removed when the path is dropped
pub fn temp_copy(content: &[u8]) -> TempPath {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.into_temp_path()
}

#[async_trait]
impl SecretDecoder for MockSecretDecoder {
    async fn decode_as_file(&self, reference: &str, _secrets: &SecretContext) -> anyhow::Result<TempPath> {
        self.decoded.lock().unwrap().push(reference.to_string());
        let Some(source) = self.files.get(reference) else {
            bail!("unknown secret reference {}", reference);
        };
        let copy = temp_copy(&std::fs::read(source)?);
        self.issued.lock().unwrap().push(copy.to_path_buf());
        Ok(copy)
    }
}

pub struct MockOwnerLookup {
    owner: Option<OwnerRecord>,
    lookups: Mutex<Vec<String>>,
}

impl MockOwnerLookup {
    pub fn new(owner: Option<OwnerRecord>) -> Self {
        Self {
            owner,
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Namespaces looked up so far
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl OwnerLookup for MockOwnerLookup {
    async fn find_owner(&self, namespace: &str) -> anyhow::Result<Option<OwnerRecord>> {
        self.lookups.lock().unwrap().push(namespace.to_string());
        Ok(self.owner.clone())
    }
}

/// Resolves every service account to the same token and CA file
pub struct MockServiceAccounts {
    token: String,
    ca_path: PathBuf,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockServiceAccounts {
    pub fn new(token: &str, ca_path: &Path) -> Self {
        Self {
            token: token.to_string(),
            ca_path: ca_path.to_path_buf(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Name and namespace of every resolved service account
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceAccountResolver for MockServiceAccounts {
    async fn identity(&self, name: &str, namespace: &str) -> anyhow::Result<ServiceAccountIdentity> {
        self.requests
            .lock()
            .unwrap()
            .push((name.to_string(), namespace.to_string()));
        let ca = std::fs::read(&self.ca_path).unwrap_or_default();
        Ok(ServiceAccountIdentity {
            token: self.token.clone(),
            ca_path: temp_copy(&ca),
        })
    }
}

/// Hands out clients backed by a [`MockService`], recording the hosts asked for
pub struct MockClientFactory {
    service: Option<MockService>,
    failure: Option<String>,
    hosts: Mutex<Vec<String>>,
}

impl MockClientFactory {
    pub fn new(service: MockService) -> Self {
        Self {
            service: Some(service),
            failure: None,
            hosts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            service: None,
            failure: Some(message.to_string()),
            hosts: Mutex::new(Vec::new()),
        }
    }

    /// Number of clients built
    pub fn built(&self) -> usize {
        self.hosts.lock().unwrap().len()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.hosts.lock().unwrap().clone()
    }
}

impl ClientFactory for MockClientFactory {
    fn client_for(&self, descriptor: &ConnectionDescriptor) -> anyhow::Result<Client> {
        if let Some(message) = &self.failure {
            bail!("{}", message);
        }
        let service = self
            .service
            .clone()
            .ok_or_else(|| anyhow!("no mock service configured"))?;
        self.hosts
            .lock()
            .unwrap()
            .push(descriptor.host.host().unwrap_or_default().to_string());
        Ok(service.into_client())
    }
}

/// Always hands out the same client
pub struct FixedClientFactory {
    client: Client,
}

impl FixedClientFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ClientFactory for FixedClientFactory {
    fn client_for(&self, _descriptor: &ConnectionDescriptor) -> anyhow::Result<Client> {
        Ok(self.client.clone())
    }
}
