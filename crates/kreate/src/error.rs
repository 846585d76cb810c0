use kreate_k8s::{KubeconfigError, SchemaError};
use kreate_spec::SpecError;
use kreate_yaml::YamlError;

use crate::host::HostError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Kubeconfig(#[from] KubeconfigError),

    #[error(transparent)]
    Host(#[from] HostError),

    /// The content holds no usable manifest.
    #[error("{reason}")]
    ManifestInvalid { reason: String },

    #[error("parent command {0} not found")]
    ParentCommandNotFound(String),

    #[error("command not found")]
    CommandNotFound { path: Vec<String> },

    #[error("no command to execute")]
    EmptyCommand,

    #[error("invalid command tree: {0}")]
    CommandTree(String),
}

impl Error {
    pub(crate) fn manifest_invalid(reason: impl Into<String>) -> Self {
        Self::ManifestInvalid {
            reason: reason.into(),
        }
    }

    /// Whether the UI should ask the user to select a cluster.
    #[must_use]
    pub fn is_no_active_context(&self) -> bool {
        matches!(self, Self::Schema(err) if err.is_no_active_context())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
