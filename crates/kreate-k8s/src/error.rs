use kreate_core::{NO_CONTEXT_MESSAGE, NO_OPENAPI_MESSAGE};

use crate::transport::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    /// No current cluster, or the cluster refused the connection.
    #[error("{}", NO_CONTEXT_MESSAGE)]
    NoActiveContext,

    /// The index or a group-version document is missing or malformed.
    #[error("{}", NO_OPENAPI_MESSAGE)]
    NoUsableApiDescription,

    #[error("no resource found for apiVersion {api_version} and kind {kind}")]
    ResourceNotFound { api_version: String, kind: String },

    #[error(transparent)]
    Transport(TransportError),
}

impl SchemaError {
    #[must_use]
    pub fn is_no_active_context(&self) -> bool {
        matches!(self, Self::NoActiveContext)
    }

    #[must_use]
    pub fn is_no_usable_api_description(&self) -> bool {
        matches!(self, Self::NoUsableApiDescription)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

impl From<TransportError> for SchemaError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionRefused(_) | TransportError::NoCluster => {
                Self::NoActiveContext
            }
            TransportError::Status { url, status } => {
                tracing::warn!(%url, status, "OpenAPI endpoint not served");
                Self::NoUsableApiDescription
            }
            TransportError::InvalidBody { url, source } => {
                tracing::warn!(%url, err = %source, "OpenAPI endpoint returned no JSON");
                Self::NoUsableApiDescription
            }
            other => Self::Transport(other),
        }
    }
}
