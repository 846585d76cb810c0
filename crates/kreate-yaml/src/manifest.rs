//! Loading manifests into JSON values.
//!
//! Plain scalars follow the YAML 1.2 core schema, plus legacy octal numbers
//! such as `0644`. Quoted scalars always stay strings.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use yaml_rust::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust::scanner::{Marker, TScalarStyle, TokenType};
use yaml_rust::Yaml;

use crate::Result;

enum Frame {
    Sequence(Vec<Value>),
    Mapping {
        entries: Map<String, Value>,
        pending_key: Option<String>,
    },
}

#[derive(Default)]
struct ManifestBuilder {
    stack: Vec<(Frame, usize)>,
    anchors: HashMap<usize, Value>,
    current: Option<Value>,
    documents: Vec<Value>,
}

impl ManifestBuilder {
    fn insert(&mut self, value: Value, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
        match self.stack.last_mut() {
            None => self.current = Some(value),
            Some((Frame::Sequence(items), _)) => items.push(value),
            Some((
                Frame::Mapping {
                    entries,
                    pending_key,
                },
                _,
            )) => match pending_key.take() {
                None => *pending_key = Some(key_string(&value)),
                Some(key) => {
                    entries.insert(key, value);
                }
            },
        }
    }
}

impl MarkedEventReceiver for ManifestBuilder {
    fn on_event(&mut self, event: Event, _mark: Marker) {
        match event {
            Event::DocumentStart => self.current = None,
            Event::DocumentEnd => {
                if let Some(document) = self.current.take() {
                    self.documents.push(document);
                }
            }
            Event::MappingStart(anchor) => self.stack.push((
                Frame::Mapping {
                    entries: Map::new(),
                    pending_key: None,
                },
                anchor,
            )),
            Event::SequenceStart(anchor) => self.stack.push((Frame::Sequence(Vec::new()), anchor)),
            Event::MappingEnd | Event::SequenceEnd => {
                if let Some((frame, anchor)) = self.stack.pop() {
                    let value = match frame {
                        Frame::Sequence(items) => Value::Array(items),
                        Frame::Mapping { entries, .. } => Value::Object(entries),
                    };
                    self.insert(value, anchor);
                }
            }
            Event::Scalar(text, style, anchor, tag) => {
                let value = resolve_scalar(&text, style, tag.as_ref());
                self.insert(value, anchor);
            }
            Event::Alias(id) => {
                let value = self.anchors.get(&id).cloned().unwrap_or(Value::Null);
                self.insert(value, 0);
            }
            Event::StreamStart | Event::StreamEnd | Event::Nothing => {}
        }
    }
}

fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn is_legacy_octal(text: &str) -> bool {
    text.len() == 4
        && text.starts_with('0')
        && text[1..].bytes().all(|b| (b'0'..=b'7').contains(&b))
}

fn float_value(value: f64, text: &str) -> Value {
    Number::from_f64(value).map_or_else(|| Value::String(text.to_string()), Value::Number)
}

fn resolve_tagged(text: &str, suffix: &str) -> Value {
    match suffix {
        "str" => Value::String(text.to_string()),
        "int" => text
            .parse::<i64>()
            .map_or_else(|_| Value::String(text.to_string()), Value::from),
        "float" => text
            .parse::<f64>()
            .map_or_else(|_| Value::String(text.to_string()), |v| float_value(v, text)),
        "bool" => match text {
            "true" | "True" | "TRUE" => Value::Bool(true),
            "false" | "False" | "FALSE" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        "null" => Value::Null,
        _ => resolve_plain(text),
    }
}

fn resolve_plain(text: &str) -> Value {
    if is_legacy_octal(text)
        && let Ok(value) = i64::from_str_radix(&text[1..], 8)
    {
        return Value::from(value);
    }
    match Yaml::from_str(text) {
        Yaml::Integer(value) => Value::from(value),
        Yaml::Real(real) => real
            .parse::<f64>()
            .map_or_else(|_| Value::String(text.to_string()), |v| float_value(v, text)),
        Yaml::Boolean(value) => Value::Bool(value),
        Yaml::Null => Value::Null,
        _ => Value::String(text.to_string()),
    }
}

fn resolve_scalar(text: &str, style: TScalarStyle, tag: Option<&TokenType>) -> Value {
    if let Some(TokenType::Tag(handle, suffix)) = tag
        && handle == "!!"
    {
        return resolve_tagged(text, suffix);
    }
    if style == TScalarStyle::Plain {
        resolve_plain(text)
    } else {
        Value::String(text.to_string())
    }
}

/// Parse every document in `content`; empty or null documents are dropped.
pub fn load_documents(content: &str) -> Result<Vec<Value>> {
    let mut builder = ManifestBuilder::default();
    let mut parser = Parser::new(content.chars());
    parser.load(&mut builder, true)?;
    Ok(builder
        .documents
        .into_iter()
        .filter(|document| !document.is_null())
        .collect())
}

/// Parse all documents and keep those that are mappings.
pub fn load_manifests(content: &str) -> Result<Vec<Map<String, Value>>> {
    let manifests: Vec<_> = load_documents(content)?
        .into_iter()
        .filter_map(|document| match document {
            Value::Object(object) => Some(object),
            _ => None,
        })
        .collect();
    tracing::debug!(count = manifests.len(), "loaded manifests");
    Ok(manifests)
}

/// The first non-null document of `content`, whatever its shape.
pub fn first_manifest(content: &str) -> Result<Option<Value>> {
    Ok(load_documents(content)?.into_iter().next())
}
