//! Backend core of the manifest creation form.
//!
//! [`KreateApiImpl`] is the surface the UI talks to. It reads the static
//! command tree, maps cursor positions in a YAML manifest to document paths
//! and resolves the schema of the edited resource against the current cluster
//! through a [`ManifestReader`].

mod api;
pub mod commands;
mod error;
pub mod host;
pub mod logging;
mod reader;

pub use api::{KreateApi, KreateApiImpl, SPEC_MAX_DEPTH};
pub use error::{Error, Result};
pub use host::{DialogFilter, DialogOptions, Host, HostError};
pub use reader::{
    KubeconfigEvent, KubeconfigEventKind, ManifestReader, ManifestSchema, ReaderState,
};
