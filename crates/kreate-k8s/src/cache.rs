use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use kreate_core::{GroupVersionKind, SchemaOrRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::deref::dereference;
use crate::error::SchemaError;
use crate::kubeconfig::Kubeconfig;
use crate::transport::{Transport, UreqTransport};

const INDEX_PATH: &str = "/openapi/v3";

/// The OpenAPI v3 discovery document: group-version path to document URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub paths: IndexMap<String, IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "serverRelativeURL")]
    pub server_relative_url: String,
}

#[derive(Debug, Deserialize)]
struct OpenApiDocument {
    openapi: String,
    #[serde(default)]
    components: Option<Components>,
}

#[derive(Debug, Deserialize)]
struct Components {
    #[serde(default)]
    schemas: Map<String, Value>,
}

/// Key of a group-version in the index: `v1` lives under `api/v1`, everything else under `apis/`.
#[must_use]
pub fn group_version_path(api_version: &str) -> String {
    if api_version == "v1" {
        "api/v1".to_string()
    } else {
        format!("apis/{api_version}")
    }
}

#[derive(Debug, Default)]
struct CacheState {
    /// Bumped by every clear; fetches started in an older epoch never write.
    epoch: u64,
    index: Option<Arc<Index>>,
    kinds: HashMap<String, Arc<SchemaOrRef>>,
}

/// Resolves and caches kind schemas of the current cluster.
///
/// Entries live until [`SchemaIndexCache::clear`] is called, which the owner
/// does whenever the active cluster changes.
#[derive(Debug)]
pub struct SchemaIndexCache<T = UreqTransport> {
    transport: T,
    state: Mutex<CacheState>,
}

impl Default for SchemaIndexCache<UreqTransport> {
    fn default() -> Self {
        Self::new(UreqTransport)
    }
}

impl<T: Transport> SchemaIndexCache<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(CacheState::default()),
        }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn server(kubeconfig: &Kubeconfig) -> Result<&str, SchemaError> {
        kubeconfig
            .current_cluster()
            .map(|cluster| cluster.server.trim_end_matches('/'))
            .ok_or(SchemaError::NoActiveContext)
    }

    /// Drop the index and every resolved kind.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.index = None;
        state.kinds.clear();
        tracing::info!(epoch = state.epoch, "cleared schema cache");
    }

    /// The cluster's discovery index, fetched once per epoch.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NoActiveContext`] without a reachable current
    /// cluster and [`SchemaError::NoUsableApiDescription`] for a malformed index.
    pub fn get_index(&self, kubeconfig: &Kubeconfig) -> Result<Arc<Index>, SchemaError> {
        let epoch = {
            let state = self.lock();
            if let Some(index) = &state.index {
                return Ok(Arc::clone(index));
            }
            state.epoch
        };

        let url = format!("{}{INDEX_PATH}", Self::server(kubeconfig)?);
        tracing::debug!(%url, "fetching OpenAPI index");
        let body = self.transport.get_json(kubeconfig, &url)?;
        let index: Index = serde_json::from_value(body).map_err(|err| {
            tracing::warn!(%url, ?err, "invalid OpenAPI index");
            SchemaError::NoUsableApiDescription
        })?;
        let index = Arc::new(index);

        let mut state = self.lock();
        if state.epoch == epoch {
            state.index = Some(Arc::clone(&index));
        } else {
            tracing::debug!("cache cleared while fetching index, not storing it");
        }
        Ok(index)
    }

    /// The dereferenced schema describing `kind` in `api_version`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ResourceNotFound`] when the group-version is not
    /// served or no schema carries the requested group-version-kind.
    pub fn get_schema_for(
        &self,
        kubeconfig: &Kubeconfig,
        api_version: &str,
        kind: &str,
    ) -> Result<Arc<SchemaOrRef>, SchemaError> {
        let key = format!("{api_version}/{kind}");
        let epoch = {
            let state = self.lock();
            if let Some(schema) = state.kinds.get(&key) {
                tracing::trace!(%key, "schema cache hit");
                return Ok(Arc::clone(schema));
            }
            state.epoch
        };
        tracing::debug!(%key, "schema cache miss");

        let not_found = || SchemaError::ResourceNotFound {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
        };

        let index = self.get_index(kubeconfig)?;
        let entry = index
            .paths
            .get(&group_version_path(api_version))
            .ok_or_else(not_found)?;

        let url = format!("{}{}", Self::server(kubeconfig)?, entry.server_relative_url);
        tracing::debug!(%url, "fetching group-version document");
        let body = self.transport.get_json(kubeconfig, &url)?;
        let document = parse_document(body, &url)?;

        let wanted = GroupVersionKind::from_api_version(api_version, kind);
        let (name, raw) = document
            .iter()
            .find(|(_, schema)| group_version_kind_of(schema).as_ref() == Some(&wanted))
            .ok_or_else(not_found)?;
        tracing::debug!(%key, schema = %name, "resolved kind schema");

        let expanded = dereference(&document, raw);
        let schema: SchemaOrRef = serde_json::from_value(expanded).map_err(|err| {
            tracing::warn!(schema = %name, ?err, "schema does not deserialize");
            SchemaError::NoUsableApiDescription
        })?;
        let schema = Arc::new(schema);

        let mut state = self.lock();
        if state.epoch == epoch {
            state.kinds.insert(key, Arc::clone(&schema));
        } else {
            tracing::debug!(%key, "cache cleared while resolving, not storing schema");
        }
        Ok(schema)
    }
}

fn group_version_kind_of(schema: &Value) -> Option<GroupVersionKind> {
    let first = schema
        .get("x-kubernetes-group-version-kind")?
        .as_array()?
        .first()?;
    GroupVersionKind::from_value(first)
}

/// Validate an OpenAPI v3 document and return its schemas in document order.
fn parse_document(body: Value, url: &str) -> Result<Map<String, Value>, SchemaError> {
    let document: OpenApiDocument = serde_json::from_value(body).map_err(|err| {
        tracing::warn!(%url, ?err, "invalid OpenAPI document");
        SchemaError::NoUsableApiDescription
    })?;
    if !document.openapi.starts_with("3.") {
        tracing::warn!(%url, version = %document.openapi, "not an OpenAPI v3 document");
        return Err(SchemaError::NoUsableApiDescription);
    }
    match document.components {
        Some(components) if !components.schemas.is_empty() => Ok(components.schemas),
        _ => {
            tracing::warn!(%url, "OpenAPI document has no component schemas");
            Err(SchemaError::NoUsableApiDescription)
        }
    }
}
