use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kreate_core::{EditorState, SchemaOrRef};
use kreate_k8s::{Kubeconfig, SchemaError, SchemaIndexCache, Transport, UreqTransport};
use kreate_yaml::PathMap;

use crate::error::{Error, Result};
use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KubeconfigEventKind {
    Create,
    Update,
    Delete,
}

/// A change of the kubeconfig file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KubeconfigEvent {
    pub kind: KubeconfigEventKind,
    pub path: PathBuf,
}

impl KubeconfigEvent {
    #[must_use]
    pub fn new(kind: KubeconfigEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReaderState {
    Unbound,
    Bound { server: String },
}

/// The schema resolved for the first manifest of some content.
#[derive(Debug, Clone)]
pub struct ManifestSchema {
    pub kind: String,
    pub spec: Arc<SchemaOrRef>,
}

#[derive(Debug, Default)]
struct Inner {
    kubeconfig: Option<Kubeconfig>,
    server: Option<String>,
    editor: EditorState,
}

/// Tracks the active cluster and answers manifest questions against it.
///
/// The schema cache is cleared whenever the kubeconfig is deleted or its
/// current cluster moves to another server.
#[derive(Debug)]
pub struct ManifestReader<T = UreqTransport> {
    cache: SchemaIndexCache<T>,
    inner: Mutex<Inner>,
}

impl Default for ManifestReader<UreqTransport> {
    fn default() -> Self {
        Self::new(UreqTransport)
    }
}

impl<T: Transport> ManifestReader<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            cache: SchemaIndexCache::new(transport),
            inner: Mutex::new(Inner::default()),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &SchemaIndexCache<T> {
        &self.cache
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the state from the host's kubeconfig, if the file exists.
    pub fn init(&self, host: &dyn Host) {
        match host.kubeconfig_path() {
            Some(path) if path.exists() => {
                self.on_kubeconfig_update(&KubeconfigEvent::new(KubeconfigEventKind::Create, path));
            }
            Some(path) => tracing::info!(path = %path.display(), "kubeconfig does not exist yet"),
            None => tracing::info!("host has no kubeconfig"),
        }
    }

    pub fn on_kubeconfig_update(&self, event: &KubeconfigEvent) {
        if event.kind == KubeconfigEventKind::Delete {
            let mut inner = self.lock();
            inner.kubeconfig = None;
            inner.server = None;
            drop(inner);
            self.cache.clear();
            tracing::info!(path = %event.path.display(), "kubeconfig deleted");
            return;
        }

        match Kubeconfig::load(&event.path) {
            Ok(kubeconfig) => self.bind(kubeconfig, &event.path),
            Err(err) => {
                tracing::warn!(path = %event.path.display(), ?err, "failed to load kubeconfig");
            }
        }
    }

    fn bind(&self, kubeconfig: Kubeconfig, path: &Path) {
        let Some(server) = kubeconfig
            .current_cluster()
            .map(|cluster| cluster.server.clone())
        else {
            tracing::info!(path = %path.display(), "kubeconfig has no current cluster");
            return;
        };

        let mut inner = self.lock();
        let changed = inner.server.as_deref() != Some(server.as_str());
        inner.server = Some(server.clone());
        inner.kubeconfig = Some(kubeconfig);
        drop(inner);

        if changed {
            tracing::info!(%server, "bound to cluster");
            self.cache.clear();
        }
    }

    #[must_use]
    pub fn state(&self) -> ReaderState {
        match &self.lock().server {
            Some(server) => ReaderState::Bound {
                server: server.clone(),
            },
            None => ReaderState::Unbound,
        }
    }

    /// Resolve the schema of the first manifest in `content`.
    ///
    /// # Errors
    ///
    /// Fails without a bound cluster, on content without a manifest carrying
    /// `apiVersion` and `kind`, and with any resolution error.
    pub fn get_spec_from_yaml_manifest(&self, content: &str) -> Result<ManifestSchema> {
        let kubeconfig = self
            .lock()
            .kubeconfig
            .clone()
            .ok_or(SchemaError::NoActiveContext)?;

        let manifest = kreate_yaml::first_manifest(content)?
            .ok_or_else(|| Error::manifest_invalid("no manifest found"))?;
        let field = |name: &str| {
            manifest
                .get(name)
                .and_then(serde_json::Value::as_str)
                .filter(|value| !value.is_empty())
        };
        let api_version = field("apiVersion")
            .ok_or_else(|| Error::manifest_invalid("apiVersion not defined in the manifest"))?;
        let kind =
            field("kind").ok_or_else(|| Error::manifest_invalid("kind not defined in the manifest"))?;

        let spec = self.cache.get_schema_for(&kubeconfig, api_version, kind)?;
        Ok(ManifestSchema {
            kind: kind.to_string(),
            spec,
        })
    }

    /// The document path under `position`, remembered for [`Self::get_state`].
    pub fn get_path_at_position(&self, content: &str, position: usize) -> Result<Vec<String>> {
        if content.is_empty() {
            return Ok(Vec::new());
        }
        self.lock().editor = EditorState {
            content: content.to_string(),
            position,
        };
        let map = PathMap::from_source(content)?;
        Ok(map.path_at_offset(position).unwrap_or_default())
    }

    #[must_use]
    pub fn get_state(&self) -> EditorState {
        self.lock().editor.clone()
    }
}
