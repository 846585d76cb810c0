//! Capabilities the surrounding application provides to the core.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    /// The process ran but failed; carries what it wrote to stderr.
    #[error("{stderr}")]
    CommandFailed { stderr: String },

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create resources: {0}")]
    Create(String),

    #[error("{0} is not supported by this host")]
    Unsupported(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Options of a native file dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogOptions {
    pub title: Option<String>,
    pub open_label: Option<String>,
    pub default_uri: Option<String>,
    /// Any of `openFile`, `openDirectory`, `multiSelections`.
    pub selectors: Vec<String>,
    pub filters: Vec<DialogFilter>,
}

pub trait Host: Send + Sync {
    /// Location of the kubeconfig the host is configured with.
    fn kubeconfig_path(&self) -> Option<PathBuf>;

    /// Create `manifests` in the cluster of `context`.
    fn create_resources(&self, context: &str, manifests: &[Map<String, Value>])
    -> Result<(), HostError>;

    /// Run `program` and return its stdout.
    fn exec(&self, program: &str, args: &[String]) -> Result<String, HostError>;

    /// Show a file dialog; `None` when it was cancelled.
    fn open_dialog(&self, options: &DialogOptions) -> Result<Option<Vec<String>>, HostError>;
}
