#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use kreate::{DialogOptions, Host, HostError, KreateApiImpl};
use kreate_k8s::{Kubeconfig, Transport, TransportError};
use serde_json::{Map, Value};

pub const SERVER: &str = "https://127.0.0.1:6443";
pub const OTHER_SERVER: &str = "https://10.0.0.1:6443";

/// Serves `testdata/openapi` for any server and records the fetched paths.
#[derive(Debug, Default)]
pub struct FakeTransport {
    fetched: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn fetches(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }

    pub fn fetch_count(&self, suffix: &str) -> usize {
        self.fetches()
            .iter()
            .filter(|path| path.ends_with(suffix))
            .count()
    }
}

impl Transport for FakeTransport {
    fn get_json(&self, kubeconfig: &Kubeconfig, url: &str) -> Result<Value, TransportError> {
        let server = &kubeconfig
            .current_cluster()
            .ok_or(TransportError::NoCluster)?
            .server;
        let path = url.strip_prefix(server.as_str()).expect("url on current server");
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        self.fetched.lock().expect("lock").push(path.to_string());

        let relative = match path.strip_prefix("/openapi/") {
            Some("v3") => "openapi/index.json".to_string(),
            Some(rest) => format!("openapi/{rest}.json"),
            None => panic!("unexpected url {url}"),
        };
        Ok(test_util::read_testdata_json(&relative))
    }
}

/// Records what the API asks of the surrounding application.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub kubeconfig: Option<PathBuf>,
    pub created: Mutex<Vec<(String, Vec<Map<String, Value>>)>>,
    pub executed: Mutex<Vec<Vec<String>>>,
}

impl FakeHost {
    pub fn with_kubeconfig(path: impl Into<PathBuf>) -> Self {
        Self {
            kubeconfig: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<(String, Vec<Map<String, Value>>)> {
        self.created.lock().expect("lock").clone()
    }
}

impl Host for FakeHost {
    fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kubeconfig.clone()
    }

    fn create_resources(
        &self,
        context: &str,
        manifests: &[Map<String, Value>],
    ) -> Result<(), HostError> {
        self.created
            .lock()
            .expect("lock")
            .push((context.to_string(), manifests.to_vec()));
        Ok(())
    }

    fn exec(&self, program: &str, args: &[String]) -> Result<String, HostError> {
        let mut argv = vec![program.to_string()];
        argv.extend_from_slice(args);
        self.executed.lock().expect("lock").push(argv);
        if program == "false" {
            return Err(HostError::CommandFailed {
                stderr: "error: exit status 1".to_string(),
            });
        }
        Ok(args.join(" "))
    }

    fn open_dialog(&self, options: &DialogOptions) -> Result<Option<Vec<String>>, HostError> {
        Ok(options.default_uri.clone().map(|uri| vec![uri]))
    }
}

pub type TestApi = KreateApiImpl<FakeHost, Arc<FakeTransport>>;

/// An API bound to a kubeconfig for [`SERVER`] written into `dir`.
pub fn bound_api(dir: &std::path::Path) -> color_eyre::eyre::Result<(TestApi, Arc<FakeTransport>)> {
    let path = test_util::write_kubeconfig(dir, SERVER)?;
    let transport = Arc::new(FakeTransport::default());
    let api = KreateApiImpl::new(FakeHost::with_kubeconfig(path), Arc::clone(&transport));
    Ok((api, transport))
}

pub fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(ToString::to_string).collect()
}
