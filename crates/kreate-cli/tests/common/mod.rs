use std::path::PathBuf;

use kreate::{DialogOptions, Host, HostError};
use kreate_k8s::{Kubeconfig, Transport, TransportError};
use serde_json::{Map, Value};

/// Serves `testdata/openapi` for whatever server the kubeconfig names.
#[derive(Debug, Default)]
pub struct TestdataTransport;

impl Transport for TestdataTransport {
    fn get_json(&self, kubeconfig: &Kubeconfig, url: &str) -> Result<Value, TransportError> {
        let server = &kubeconfig
            .current_cluster()
            .ok_or(TransportError::NoCluster)?
            .server;
        let path = url.strip_prefix(server.as_str()).expect("url on current server");
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        let relative = match path.strip_prefix("/openapi/") {
            Some("v3") => "openapi/index.json".to_string(),
            Some(rest) => format!("openapi/{rest}.json"),
            None => panic!("unexpected url {url}"),
        };
        Ok(test_util::read_testdata_json(&relative))
    }
}

/// A host that has a kubeconfig but never creates anything.
#[derive(Debug, Default)]
pub struct DryRunHost {
    pub kubeconfig: Option<PathBuf>,
}

impl Host for DryRunHost {
    fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kubeconfig.clone()
    }

    fn create_resources(&self, _: &str, _: &[Map<String, Value>]) -> Result<(), HostError> {
        Ok(())
    }

    fn exec(&self, program: &str, args: &[String]) -> Result<String, HostError> {
        Ok(format!("{program} {}", args.join(" ")))
    }

    fn open_dialog(&self, _: &DialogOptions) -> Result<Option<Vec<String>>, HostError> {
        Ok(None)
    }
}
