//! Schema data model.
//!
//! Parsing from JSON is total. Shapes the matcher cannot use are still
//! represented (an unknown tag inside `type`, a non-object alternative) so
//! that they fail to match instead of failing to load.
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::options::Options;
use crate::tag::TypeSet;

/// Member name → nested schema, in declaration order.
pub type Props = IndexMap<String, Schema>;

#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
    Node(Box<SchemaNode>),
    /// Alternatives; the value has to match at least one.
    AnyOf(Vec<Schema>),
    /// Data that is not a schema node. Never matches.
    Malformed(Value),
}

/// One alternative: a type constraint plus structural constraints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaNode {
    /// `None` means `any`.
    pub types: Option<TypeSet>,
    /// Refinement options, normalized when the node is read. A mapping that
    /// fails strict construction makes this node never match; a non-mapping
    /// value is ignored.
    pub options: Option<NodeOptions>,
    pub props: Props,
    /// Only meaningful on a node sitting under a parent's `props`.
    pub required: bool,
    pub items: Option<Schema>,
}

/// A node's `options` entry after strict construction.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeOptions {
    Parsed { raw: Value, options: Options },
    /// A mapping with a malformed known key.
    Rejected(Value),
    /// Not a mapping; the defaults apply.
    Ignored(Value),
}

impl NodeOptions {
    pub fn from_value(raw: &Value) -> Self {
        if !raw.is_object() {
            return NodeOptions::Ignored(raw.clone());
        }
        match Options::new(raw) {
            Ok(options) => NodeOptions::Parsed { raw: raw.clone(), options },
            Err(_) => NodeOptions::Rejected(raw.clone()),
        }
    }

    /// The options as written in the schema.
    pub fn raw(&self) -> &Value {
        match self {
            NodeOptions::Parsed { raw, .. } => raw,
            NodeOptions::Rejected(raw) | NodeOptions::Ignored(raw) => raw,
        }
    }
}

impl Schema {
    /// Reads a schema. A top-level array is a list of alternatives; anything
    /// else is a single alternative.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(xs) => Schema::AnyOf(xs.iter().map(Self::alternative).collect()),
            other => Self::alternative(other),
        }
    }

    fn alternative(value: &Value) -> Self {
        match value {
            Value::Object(map) => Schema::Node(Box::new(SchemaNode::from_map(map))),
            other => Schema::Malformed(other.clone()),
        }
    }

    /// The alternatives to try, in order. A node is its own single
    /// alternative.
    pub fn alternatives(&self) -> &[Schema] {
        match self {
            Schema::AnyOf(xs) => xs,
            single => std::slice::from_ref(single),
        }
    }

    /// Whether this schema marks its key as mandatory on the parent value.
    /// Only a bare node can; a list of alternatives never does.
    pub fn is_required(&self) -> bool {
        matches!(self, Schema::Node(node) if node.required)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Schema::Node(node) => node.to_value(),
            Schema::AnyOf(xs) => Value::Array(xs.iter().map(Schema::to_value).collect()),
            Schema::Malformed(v) => v.clone(),
        }
    }
}

impl SchemaNode {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let props = match map.get("props") {
            Some(Value::Object(props)) => props
                .iter()
                .map(|(k, v)| (k.clone(), Schema::from_value(v)))
                .collect(),
            _ => Props::new(),
        };
        Self {
            types: map.get("type").map(TypeSet::from_value),
            options: map.get("options").map(NodeOptions::from_value),
            props,
            required: matches!(map.get("required"), Some(Value::Bool(true))),
            items: map.get("items").map(Schema::from_value),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        if let Some(types) = &self.types {
            out.insert("type".into(), types.to_value());
        }
        if let Some(options) = &self.options {
            out.insert("options".into(), options.raw().clone());
        }
        if !self.props.is_empty() {
            let props = self
                .props
                .iter()
                .map(|(k, s)| (k.clone(), s.to_value()))
                .collect();
            out.insert("props".into(), Value::Object(props));
        }
        if self.required {
            out.insert("required".into(), Value::Bool(true));
        }
        if let Some(items) = &self.items {
            out.insert("items".into(), items.to_value());
        }
        Value::Object(out)
    }
}

impl From<SchemaNode> for Schema {
    fn from(node: SchemaNode) -> Self {
        Schema::Node(Box::new(node))
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Schema::from_value(&v))
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TypeTag;
    use serde_json::json;

    #[test]
    fn nested_nodes_parse_in_declaration_order() {
        let schema = Schema::from_value(&json!({
            "type": "object",
            "props": {
                "z": { "type": "string", "required": true },
                "a": [{ "type": "number" }, { "type": "null" }]
            }
        }));
        let Schema::Node(node) = &schema else { panic!("expected a node") };
        assert!(node.types.as_ref().unwrap().is_exactly(TypeTag::Object));
        let keys: Vec<&str> = node.props.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a"]);
        assert!(node.props["z"].is_required());
        assert!(!node.props["a"].is_required());
        assert_eq!(node.props["a"].alternatives().len(), 2);
    }

    #[test]
    fn odd_shapes_are_kept_not_rejected() {
        let schema = Schema::from_value(&json!([{ "type": "number" }, "nope", [1]]));
        let alts = schema.alternatives();
        assert_eq!(alts.len(), 3);
        assert!(matches!(alts[1], Schema::Malformed(_)));
        assert!(matches!(alts[2], Schema::Malformed(_)));

        // only literal `true` marks a member required
        let Schema::Node(node) = Schema::from_value(&json!({ "required": "yes", "props": 3 })) else {
            panic!("expected a node")
        };
        assert!(!node.required);
        assert!(node.props.is_empty());
    }

    #[test]
    fn node_options_are_normalized_on_read() {
        let read = |options: Value| {
            let Schema::Node(node) = Schema::from_value(&json!({ "options": options })) else {
                panic!("expected a node")
            };
            node.options.expect("options present")
        };
        match read(json!({ "min": 2, "unknown": 1 })) {
            NodeOptions::Parsed { options, raw } => {
                assert_eq!(options.min, 2.0);
                assert_eq!(raw, json!({ "min": 2, "unknown": 1 }));
            }
            other => panic!("expected parsed options, got {other:?}"),
        }
        assert!(matches!(read(json!({ "min": "2" })), NodeOptions::Rejected(_)));
        assert!(matches!(read(json!("min=2")), NodeOptions::Ignored(_)));

        // written back exactly as given
        let raw = json!({ "type": "number", "options": { "min": "2" } });
        assert_eq!(Schema::from_value(&raw).to_value(), raw);
    }

    #[test]
    fn serde_goes_through_the_lenient_reader() {
        let raw = json!({ "type": ["string", "null"], "items": { "type": "boolean" } });
        let schema: Schema = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&schema).unwrap(), raw);
    }
}
