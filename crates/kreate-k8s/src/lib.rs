//! Kubernetes cluster access for schema resolution.
//!
//! The [`SchemaIndexCache`] resolves `(apiVersion, kind)` pairs against a
//! cluster's OpenAPI v3 discovery endpoint and keeps the results until the
//! active cluster changes.

mod cache;
pub mod deref;
mod error;
pub mod kubeconfig;
pub mod transport;

pub use cache::{Index, IndexEntry, SchemaIndexCache, group_version_path};
pub use error::SchemaError;
pub use kubeconfig::{Kubeconfig, KubeconfigError};
pub use transport::{Transport, TransportError, UreqTransport};
