//! Free-form directive values attached to models and fields.
//!
//! Directives are untyped in configuration files; they are kept here as a closed
//! set of variants so template helpers can ask for a string or a list without
//! reaching for dynamic casts.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::warn;

/// Well-known directive overriding the GraphQL type emitted for a field
pub const GRAPHQL_TYPE_NAME_MASK: &str = "graphqlTypeNameMask";

/// Well-known directive overriding the GraphQL field name emitted for a field
pub const GRAPHQL_FIELD_NAME_MASK: &str = "graphqlFieldNameMask";

/// A single directive value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DirectiveValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<DirectiveValue>),
    Map(BTreeMap<String, DirectiveValue>),
}

/// Directive table keyed by directive name
pub type Directives = BTreeMap<String, DirectiveValue>;

impl DirectiveValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DirectiveValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// JSON projection used by the render context
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Bool(b) => json!(b),
            Self::Integer(i) => json!(i),
            Self::Float(f) => json!(f),
            Self::String(s) => json!(s),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Read a directive as a string.
///
/// Absent directives and empty strings read as `None`. A directive holding any other
/// variant is reported and treated as absent.
pub fn string_directive<'a>(directives: &'a Directives, name: &str) -> Option<&'a str> {
    let value = directives.get(name)?;
    match value.as_str() {
        Some("") => None,
        Some(s) => Some(s),
        None => {
            warn!(directive = %name, value = ?value, "Unsupported directive value type");
            None
        }
    }
}

/// Read a directive as a list; non-list values are reported and read as empty.
pub fn list_directive<'a>(directives: &'a Directives, name: &str) -> &'a [DirectiveValue] {
    let Some(value) = directives.get(name) else {
        return &[];
    };
    match value.as_list() {
        Some(items) => items,
        None => {
            warn!(directive = %name, value = ?value, "Unsupported directive value type");
            &[]
        }
    }
}

/// JSON projection of a whole directive table
pub fn directives_to_json(directives: &Directives) -> JsonValue {
    JsonValue::Object(
        directives
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}
