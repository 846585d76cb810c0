mod command;
mod openapi;
mod simplified;

pub use command::{CommandArg, CommandDetails, CommandOption, CommandTree, OptionDefault};
pub use openapi::{
    AdditionalProperties, GroupVersionKind, ReferenceObject, SchemaObject, SchemaOrRef,
};
pub use simplified::SimplifiedSpec;

use serde::{Deserialize, Serialize};

/// Message surfaced when no cluster is reachable, so the UI can offer to pick one.
pub const NO_CONTEXT_MESSAGE: &str = "No current context";

/// Message surfaced when the cluster does not serve a usable OpenAPI v3 description.
pub const NO_OPENAPI_MESSAGE: &str = "No openapi endpoint";

/// Editor content and cursor last seen by a path query, kept for UI restoration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditorState {
    pub content: String,
    pub position: usize,
}
