//! Schema Registry — declarative structural contracts for generator output.
//!
//! One `Shape` value is the single source of truth for an output structure. It is:
//! - rendered into the upstream `responseSchema` that constrains generation,
//! - used to normalize loosely-typed decoded JSON (defaults, scalar coercion),
//! - used to decide completeness before a tier's result is accepted.

use serde_json::{json, Map, Value};

pub mod shapes;

pub use shapes::{extraction_shape, match_shape, report_shape};

// ────────────────────────────────────────────────────────────────────────────
// Schema tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String {
        description: Option<String>,
        /// Closed set of accepted values. The first entry is the fallback.
        variants: Option<&'static [&'static str]>,
    },
    Integer {
        description: Option<String>,
        range: Option<(i64, i64)>,
    },
    Boolean {
        description: Option<String>,
    },
    Array {
        description: Option<String>,
        items: Box<SchemaNode>,
    },
    Object {
        description: Option<String>,
        properties: Vec<Property>,
        /// Keys the upstream generator is told are required.
        required: Vec<&'static str>,
    },
}

/// What happens to a property the generator left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Filled with the empty value of its type.
    Defaulted,
    /// Left absent so callers can tell "not produced" from "produced empty".
    Optional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: &'static str,
    pub node: SchemaNode,
    pub presence: Presence,
}

/// Declares a defaulted property.
pub fn field(name: &'static str, node: SchemaNode) -> Property {
    Property {
        name,
        node,
        presence: Presence::Defaulted,
    }
}

impl Property {
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::String {
            description: None,
            variants: None,
        }
    }

    pub fn integer() -> Self {
        SchemaNode::Integer {
            description: None,
            range: None,
        }
    }

    pub fn boolean() -> Self {
        SchemaNode::Boolean { description: None }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array {
            description: None,
            items: Box::new(items),
        }
    }

    pub fn string_array() -> Self {
        Self::array(Self::string())
    }

    pub fn object(properties: Vec<Property>) -> Self {
        SchemaNode::Object {
            description: None,
            properties,
            required: Vec::new(),
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            SchemaNode::String { description, .. }
            | SchemaNode::Integer { description, .. }
            | SchemaNode::Boolean { description }
            | SchemaNode::Array { description, .. }
            | SchemaNode::Object { description, .. } => *description = text,
        }
        self
    }

    /// Restricts a string node to a closed set of values.
    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        if let SchemaNode::String { variants, .. } = &mut self {
            *variants = Some(allowed);
        }
        self
    }

    /// Clamps an integer node to `[min, max]` during normalization.
    pub fn within(mut self, min: i64, max: i64) -> Self {
        if let SchemaNode::Integer { range, .. } = &mut self {
            *range = Some((min, max));
        }
        self
    }

    pub fn require(mut self, keys: &[&'static str]) -> Self {
        if let SchemaNode::Object { required, .. } = &mut self {
            required.extend_from_slice(keys);
        }
        self
    }

    // ────────────────────────────────────────────────────────────────────────
    // Upstream rendering
    // ────────────────────────────────────────────────────────────────────────

    /// Renders the node as an upstream `responseSchema` (OpenAPI subset).
    pub fn to_response_schema(&self) -> Value {
        let (mut out, description) = match self {
            SchemaNode::String {
                description,
                variants,
            } => {
                let mut out = json!({ "type": "STRING" });
                if let Some(variants) = variants {
                    out["enum"] = json!(variants);
                }
                (out, description)
            }
            SchemaNode::Integer { description, .. } => (json!({ "type": "INTEGER" }), description),
            SchemaNode::Boolean { description } => (json!({ "type": "BOOLEAN" }), description),
            SchemaNode::Array { description, items } => (
                json!({ "type": "ARRAY", "items": items.to_response_schema() }),
                description,
            ),
            SchemaNode::Object {
                description,
                properties,
                required,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|p| (p.name.to_string(), p.node.to_response_schema()))
                    .collect();
                let mut out = json!({ "type": "OBJECT", "properties": props });
                if !required.is_empty() {
                    out["required"] = json!(required);
                }
                (out, description)
            }
        };
        if let Some(text) = description {
            out["description"] = json!(text);
        }
        out
    }

    // ────────────────────────────────────────────────────────────────────────
    // Normalization
    // ────────────────────────────────────────────────────────────────────────

    /// Coerces a decoded value into this node's type. Never fails: anything that
    /// cannot be coerced becomes the empty value of the node's type.
    pub fn normalize(&self, value: Option<&Value>) -> Value {
        let value = value.filter(|v| !v.is_null());
        match self {
            SchemaNode::String { variants, .. } => {
                let text = match value {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    _ => String::new(),
                };
                match variants {
                    Some(allowed) => Value::String(canonical_variant(allowed, &text).to_string()),
                    None => Value::String(text),
                }
            }
            SchemaNode::Integer { range, .. } => {
                let n = value.and_then(coerce_integer).unwrap_or(0);
                let n = match range {
                    Some((min, max)) => n.clamp(*min, *max),
                    None => n,
                };
                json!(n)
            }
            SchemaNode::Boolean { .. } => {
                let b = match value {
                    Some(Value::Bool(b)) => *b,
                    Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
                    _ => false,
                };
                Value::Bool(b)
            }
            SchemaNode::Array { items, .. } => match value {
                Some(Value::Array(elements)) => Value::Array(
                    elements
                        .iter()
                        .filter(|e| !e.is_null())
                        .map(|e| items.normalize(Some(e)))
                        .collect(),
                ),
                _ => Value::Array(Vec::new()),
            },
            SchemaNode::Object { properties, .. } => {
                let source = value.and_then(Value::as_object);
                let mut out = Map::new();
                for property in properties {
                    let child = source
                        .and_then(|map| map.get(property.name))
                        .filter(|v| !v.is_null());
                    if child.is_none() && property.presence == Presence::Optional {
                        continue;
                    }
                    // An optional block the generator filled with a non-object is treated as absent.
                    if property.presence == Presence::Optional
                        && matches!(property.node, SchemaNode::Object { .. })
                        && !child.is_some_and(Value::is_object)
                    {
                        continue;
                    }
                    out.insert(property.name.to_string(), property.node.normalize(child));
                }
                Value::Object(out)
            }
        }
    }
}

fn canonical_variant(allowed: &'static [&'static str], text: &str) -> &'static str {
    let text = text.trim();
    allowed
        .iter()
        .find(|v| v.eq_ignore_ascii_case(text))
        .or_else(|| allowed.first())
        .copied()
        .unwrap_or_default()
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let trimmed = s.trim().trim_end_matches('%').trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Extraction,
    Report,
    Match,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Extraction => "extraction",
            ShapeKind::Report => "report",
            ShapeKind::Match => "match",
        }
    }
}

/// A top-level condition a decoded value must meet before a tier's result is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    NonEmptyText(&'static str),
    NonEmptyList(&'static str),
}

impl Requirement {
    pub fn key(&self) -> &'static str {
        match self {
            Requirement::NonEmptyText(key) | Requirement::NonEmptyList(key) => key,
        }
    }

    fn is_met(&self, value: &Value) -> bool {
        match self {
            Requirement::NonEmptyText(key) => value
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty()),
            Requirement::NonEmptyList(key) => value
                .get(key)
                .and_then(Value::as_array)
                .is_some_and(|a| !a.is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Shape {
    pub kind: ShapeKind,
    pub root: SchemaNode,
    /// Completeness predicate. Empty means any decodable result is accepted.
    pub complete_when: Vec<Requirement>,
}

impl Shape {
    pub fn response_schema(&self) -> Value {
        self.root.to_response_schema()
    }

    pub fn normalize(&self, decoded: &Value) -> Value {
        self.root.normalize(Some(decoded))
    }

    /// Keys whose requirement is not met. Empty when the value is complete.
    pub fn missing(&self, value: &Value) -> Vec<&'static str> {
        self.complete_when
            .iter()
            .filter(|r| !r.is_met(value))
            .map(Requirement::key)
            .collect()
    }
}
