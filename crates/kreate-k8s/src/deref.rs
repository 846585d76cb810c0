//! Inline local `$ref`s of an OpenAPI v3 document.

use std::collections::HashSet;

use serde_json::{Map, Value};

const MAX_DEPTH: usize = 64;
const SCHEMAS_PREFIX: &str = "#/components/schemas/";

struct ResolveCtx<'a> {
    schemas: &'a Map<String, Value>,
    stack: HashSet<String>,
}

/// Replace every `#/components/schemas/...` reference reachable from `schema`
/// with the referenced schema.
///
/// A reference that points back into its own expansion is left out and the
/// node keeps its remaining fields. Unknown references are dropped the same way.
#[must_use]
pub fn dereference(schemas: &Map<String, Value>, schema: &Value) -> Value {
    let mut ctx = ResolveCtx {
        schemas,
        stack: HashSet::new(),
    };
    expand_schema_node(&mut ctx, schema, 0)
}

fn strip_ref(schema: &Value) -> Value {
    let Some(obj) = schema.as_object() else {
        return schema.clone();
    };
    let mut out = obj.clone();
    out.remove("$ref");
    Value::Object(out)
}

fn expand_schema_node(ctx: &mut ResolveCtx<'_>, schema: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return strip_ref(schema);
    }

    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        let name = reference.strip_prefix(SCHEMAS_PREFIX).unwrap_or(reference);
        if ctx.stack.contains(name) {
            return strip_ref(schema);
        }
        let Some(target) = ctx.schemas.get(name) else {
            tracing::warn!(reference, "unresolvable schema reference");
            return strip_ref(schema);
        };
        ctx.stack.insert(name.to_string());
        let out = expand_schema_node(ctx, target, depth + 1);
        ctx.stack.remove(name);
        return out;
    }

    let Some(obj) = schema.as_object() else {
        return schema.clone();
    };
    let mut obj = obj.clone();

    for keyword in ["allOf", "anyOf", "oneOf"] {
        if let Some(members) = obj.get(keyword).and_then(Value::as_array) {
            let expanded = members
                .iter()
                .map(|member| expand_schema_node(ctx, member, depth + 1))
                .collect();
            obj.insert(keyword.to_string(), Value::Array(expanded));
        }
    }

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        let expanded: Map<String, Value> = props
            .iter()
            .map(|(name, prop)| (name.clone(), expand_schema_node(ctx, prop, depth + 1)))
            .collect();
        obj.insert("properties".to_string(), Value::Object(expanded));
    }

    for keyword in ["items", "not"] {
        if let Some(sub) = obj.get(keyword) {
            let expanded = expand_schema_node(ctx, sub, depth + 1);
            obj.insert(keyword.to_string(), expanded);
        }
    }

    if let Some(additional) = obj.get("additionalProperties")
        && !additional.is_boolean()
    {
        let expanded = expand_schema_node(ctx, additional, depth + 1);
        obj.insert("additionalProperties".to_string(), expanded);
    }

    Value::Object(obj)
}
