#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("unsupported schema for {field:?}: {reason}")]
    UnsupportedSchemaShape { field: String, reason: String },

    #[error("pathInSpec {} not found in spec", path.join(","))]
    PathNotFound { path: Vec<String> },
}

impl SpecError {
    pub(crate) fn reference(field: &str) -> Self {
        Self::UnsupportedSchemaShape {
            field: field.to_string(),
            reason: "unresolved reference".to_string(),
        }
    }

    #[must_use]
    pub fn is_path_not_found(&self) -> bool {
        matches!(self, Self::PathNotFound { .. })
    }
}
