use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A schema slot in an OpenAPI v3 document: either a `$ref` or an inline schema.
///
/// Documents are dereferenced once when they are loaded. Consumers that only
/// understand inline schemas reject the [`SchemaOrRef::Reference`] variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Reference(ReferenceObject),
    Schema(Box<SchemaObject>),
}

impl SchemaOrRef {
    #[must_use]
    pub fn as_schema(&self) -> Option<&SchemaObject> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Reference(_) => None,
        }
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }
}

impl From<SchemaObject> for SchemaOrRef {
    fn from(schema: SchemaObject) -> Self {
        Self::Schema(Box::new(schema))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceObject {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// The subset of an OpenAPI v3 schema object that Kubernetes documents use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaOrRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaOrRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

impl SchemaObject {
    #[must_use]
    pub fn is_type(&self, ty: &str) -> bool {
        self.schema_type.as_deref() == Some(ty)
    }
}

/// `additionalProperties` is either a flag or the schema of map values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaOrRef>),
}

impl AdditionalProperties {
    #[must_use]
    pub fn schema(&self) -> Option<&SchemaOrRef> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Allowed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    /// Split an `apiVersion` into group and version; the core group is empty.
    #[must_use]
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((g, v)) => (g.to_string(), v.to_string()),
            None => (String::new(), api_version.to_string()),
        };
        Self {
            group,
            version,
            kind: kind.to_string(),
        }
    }

    /// Read one entry of the `x-kubernetes-group-version-kind` extension.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |name: &str| obj.get(name)?.as_str().map(ToString::to_string);
        Some(Self {
            group: field("group")?,
            version: field("version")?,
            kind: field("kind")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_and_inline_schemas_deserialize_to_distinct_variants() {
        let reference: SchemaOrRef = serde_json::from_value(json!({
            "$ref": "#/components/schemas/io.k8s.api.core.v1.PodSpec",
            "description": "ignored sibling"
        }))
        .expect("reference");
        assert!(reference.is_reference());

        let inline: SchemaOrRef = serde_json::from_value(json!({
            "type": "object",
            "properties": {"b": {"type": "string"}, "a": {"type": "integer"}}
        }))
        .expect("schema");
        let schema = inline.as_schema().expect("inline schema");
        let names: Vec<_> = schema
            .properties
            .as_ref()
            .expect("properties")
            .keys()
            .cloned()
            .collect();
        similar_asserts::assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn additional_properties_accepts_flag_or_schema() {
        let flag: AdditionalProperties = serde_json::from_value(json!(false)).expect("flag");
        assert!(flag.schema().is_none());

        let schema: AdditionalProperties =
            serde_json::from_value(json!({"type": "string", "format": "byte"})).expect("schema");
        let value = schema.schema().and_then(SchemaOrRef::as_schema).expect("value");
        assert_eq!(value.format.as_deref(), Some("byte"));
    }

    #[test]
    fn group_version_kinds_read_extension_entries() {
        assert_eq!(
            GroupVersionKind::from_value(&json!({"group": "apps", "version": "v1", "kind": "Deployment"})),
            Some(GroupVersionKind::from_api_version("apps/v1", "Deployment"))
        );
        assert_eq!(GroupVersionKind::from_value(&json!({"group": "", "version": "v1"})), None);

        let core = GroupVersionKind::from_api_version("v1", "Pod");
        assert_eq!(core.group, "");
        assert_eq!(core.version, "v1");
    }
}
