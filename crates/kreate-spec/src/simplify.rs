use kreate_core::{SchemaObject, SchemaOrRef, SimplifiedSpec};

use crate::error::SpecError;

/// Render the `type` of a schema the way Go types read.
///
/// Arrays become `[]<elem>`, looking through a single `allOf` wrapper on the
/// item. Objects whose `additionalProperties` carry a typed schema become
/// `map[string]<value>`, with byte strings shown as `[]byte`.
#[must_use]
pub fn type_of(schema: &SchemaObject) -> String {
    let Some(declared) = schema.schema_type.as_deref() else {
        return String::new();
    };

    if declared == "array" {
        let item = schema.items.as_deref().and_then(SchemaOrRef::as_schema);
        let element = item.map(|item| {
            item.all_of
                .as_ref()
                .and_then(|members| members.first())
                .and_then(SchemaOrRef::as_schema)
                .unwrap_or(item)
        });
        return format!("[]{}", element.map(type_of).unwrap_or_default());
    }

    if declared == "object"
        && let Some(value) = schema
            .additional_properties
            .as_ref()
            .and_then(|ap| ap.schema())
            .and_then(SchemaOrRef::as_schema)
        && value.schema_type.is_some()
    {
        let value_type = if value.format.as_deref() == Some("byte") {
            "[]byte".to_string()
        } else {
            type_of(value)
        };
        return format!("map[string]{value_type}");
    }

    declared.to_string()
}

/// Simplify a dereferenced schema into a tree named `name`.
///
/// # Errors
///
/// Fails with [`SpecError::UnsupportedSchemaShape`] on any reference left in
/// the schema and on `allOf` lists with other than one member.
pub fn simplify(schema: &SchemaOrRef, name: &str) -> Result<SimplifiedSpec, SpecError> {
    let schema = schema.as_schema().ok_or_else(|| SpecError::reference(name))?;

    let mut node = SimplifiedSpec {
        name: name.to_string(),
        type_name: type_of(schema),
        description: schema.description.clone().unwrap_or_default(),
        ..SimplifiedSpec::default()
    };

    if schema.is_type("object")
        && let Some(properties) = &schema.properties
    {
        node.children = properties
            .iter()
            .map(|(property, sub)| simplify(sub, property))
            .collect::<Result<_, _>>()?;
    } else if let Some(members) = &schema.all_of {
        let [member] = members.as_slice() else {
            return Err(SpecError::UnsupportedSchemaShape {
                field: name.to_string(),
                reason: format!("allOf with {} members", members.len()),
            });
        };
        let inner = simplify(member, "")?;
        node.type_description = inner.description;
        node.children = inner.children;
    } else if schema.is_type("array") {
        node.is_array = true;
        if let Some(items) = &schema.items {
            let item = simplify(items, "")?;
            node.type_description = item.type_description;
            node.children = item.children;
        }
    }

    Ok(node)
}
