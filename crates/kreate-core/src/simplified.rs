use serde::{Deserialize, Serialize};

/// A flattened, render-ready view of a schema node.
///
/// `children` is empty for scalar leaves. For arrays, `is_array` is set, `type`
/// renders as `[]<elem>` and `children` describe the element's fields.
/// `type_description` documents the referenced composite type, while
/// `description` is the field's own documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_array: bool,
    pub description: String,
    pub type_description: String,
    pub children: Vec<SimplifiedSpec>,
}

impl SimplifiedSpec {
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&SimplifiedSpec> {
        self.children.iter().find(|child| child.name == name)
    }

    #[must_use]
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|child| child.name.as_str()).collect()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
