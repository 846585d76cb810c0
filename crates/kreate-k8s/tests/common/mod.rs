use std::sync::Mutex;

use kreate_k8s::{Kubeconfig, Transport, TransportError};
use serde_json::Value;

pub const SERVER: &str = "https://127.0.0.1:6443";

/// Serves the OpenAPI dump under `testdata/openapi` and records every fetch.
#[derive(Debug, Default)]
pub struct FakeTransport {
    pub fetched: Mutex<Vec<String>>,
    pub refuse: bool,
    /// Answer every request with this HTTP status instead.
    pub status: Option<u16>,
}

impl FakeTransport {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }

    pub fn fetch_count(&self, suffix: &str) -> usize {
        self.fetches()
            .iter()
            .filter(|url| url.ends_with(suffix))
            .count()
    }
}

impl Transport for FakeTransport {
    fn get_json(&self, kubeconfig: &Kubeconfig, url: &str) -> Result<Value, TransportError> {
        let server = &kubeconfig
            .current_cluster()
            .ok_or(TransportError::NoCluster)?
            .server;
        if self.refuse {
            return Err(TransportError::ConnectionRefused(url.to_string()));
        }
        let path = url.strip_prefix(server.as_str()).expect("url on current server");
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        self.fetched.lock().expect("lock").push(path.to_string());
        if let Some(status) = self.status {
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
            });
        }

        let relative = match path.strip_prefix("/openapi/") {
            Some("v3") => "openapi/index.json".to_string(),
            Some(rest) => format!("openapi/{rest}.json"),
            None => panic!("unexpected url {url}"),
        };
        Ok(test_util::read_testdata_json(&relative))
    }
}

pub fn kubeconfig(server: &str) -> Kubeconfig {
    Kubeconfig::from_yaml(&format!(
        "current-context: test
clusters:
- name: test-cluster
  cluster:
    server: {server}
contexts:
- name: test
  context:
    cluster: test-cluster
"
    ))
    .expect("kubeconfig")
}
