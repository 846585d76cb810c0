mod events;
pub mod manifest;
pub mod path_map;

pub use manifest::{first_manifest, load_documents, load_manifests};
pub use path_map::{Location, NodeKind, PathMap, Phase, SourceLocation};

#[derive(thiserror::Error, Debug, Clone)]
pub enum YamlError {
    #[error("invalid YAML: {0}")]
    Scan(#[from] yaml_rust::ScanError),
}

pub type Result<T, E = YamlError> = std::result::Result<T, E>;
