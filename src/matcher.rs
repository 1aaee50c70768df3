//! Recursive schema matching.
//!
//! A schema is a list of alternatives folded with OR. Inside one alternative
//! four gates are folded with AND:
//!
//! 1. type: the value carries one of the node's tags (absent `type` = `any`)
//! 2. required: every `props` entry marked `required` is present
//! 3. props: every present `props` entry matches its nested schema
//! 4. items: every element matches `items`, when the node is an array node
//!    that matched, or an untyped node looking at an array
//!
//! Matching is pure and keeps no state between calls. Nesting is bounded by
//! [`Validator::max_depth`]; going past it surfaces [`Error::DepthExceeded`]
//! from the `try_` entry points.
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::predicate::{JsonTypes, TypePredicate};
use crate::schema::{NodeOptions, Schema, SchemaNode};
use crate::tag::{TypeSet, TypeTag};
use crate::value::member;

pub const DEFAULT_MAX_DEPTH: usize = 128;

static DEFAULT_OPTIONS: Lazy<Options> = Lazy::new(Options::default);

#[derive(Clone, Debug)]
pub struct Validator<P = JsonTypes> {
    predicate: P,
    max_depth: usize,
}

impl Default for Validator<JsonTypes> {
    fn default() -> Self {
        Self::new(JsonTypes)
    }
}

impl<P: TypePredicate> Validator<P> {
    pub fn new(predicate: P) -> Self {
        Self { predicate, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    /// Whether `value` matches at least one alternative of `schema`.
    /// Running past the depth limit counts as no match.
    pub fn matches_schema(&self, value: &Value, schema: &Schema) -> bool {
        self.try_matches_schema(value, schema).unwrap_or_else(|error| {
            warn!(%error, "schema match abandoned");
            false
        })
    }

    pub fn try_matches_schema(&self, value: &Value, schema: &Schema) -> Result<bool> {
        self.schema_at(value, schema, 0)
    }

    /// Whether `value` carries any tag in `tags`. `any` short-circuits;
    /// unknown entries are dropped, and nothing left means no match.
    pub fn matches_any_type(&self, value: &Value, tags: &TypeSet, options: Option<&Options>) -> bool {
        self.try_matches_any_type(value, tags, options).unwrap_or_else(|error| {
            warn!(%error, "type match abandoned");
            false
        })
    }

    pub fn try_matches_any_type(
        &self,
        value: &Value,
        tags: &TypeSet,
        options: Option<&Options>,
    ) -> Result<bool> {
        match options {
            Some(options) => self.any_type_at(value, tags, options, 0),
            None => self.any_type_at(value, tags, &Options::default(), 0),
        }
    }

    // ————————————————————————————————————————————————————————————————————————
    // RECURSION
    // ————————————————————————————————————————————————————————————————————————

    fn schema_at(&self, value: &Value, schema: &Schema, depth: usize) -> Result<bool> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded { limit: self.max_depth });
        }
        for alternative in schema.alternatives() {
            let matched = match alternative {
                Schema::Node(node) => self.node_at(value, node, depth)?,
                Schema::AnyOf(_) => self.schema_at(value, alternative, depth + 1)?,
                Schema::Malformed(_) => false,
            };
            trace!(depth, matched, "alternative");
            if matched {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn node_at(&self, value: &Value, node: &SchemaNode, depth: usize) -> Result<bool> {
        let any = TypeSet::any();
        let types = node.types.as_ref().unwrap_or(&any);
        // one bad entry sinks the whole alternative
        if !types.is_valid() {
            return Ok(false);
        }

        let options = match &node.options {
            Some(NodeOptions::Parsed { options, .. }) => options,
            Some(NodeOptions::Rejected(_)) => return Ok(false),
            Some(NodeOptions::Ignored(_)) | None => &*DEFAULT_OPTIONS,
        };

        if !self.any_type_at(value, types, options, depth)? {
            return Ok(false);
        }

        let required_ok = node
            .props
            .iter()
            .filter(|(_, nested)| nested.is_required())
            .all(|(key, _)| member(value, key).is_some());
        if !required_ok {
            return Ok(false);
        }

        for (key, nested) in &node.props {
            if let Some(found) = member(value, key) {
                if !self.schema_at(found, nested, depth + 1)? {
                    return Ok(false);
                }
            }
        }

        let Some(items) = &node.items else {
            return Ok(true);
        };
        let array_node = types.is_exactly(TypeTag::Array);
        let inferred_array = types.is_exactly(TypeTag::Any) && value.is_array();
        if !(array_node || inferred_array) {
            return Ok(true);
        }
        // an array node can still match `null` through `allowNull`
        let Some(elements) = value.as_array() else {
            return Ok(true);
        };
        for element in elements {
            if !self.schema_at(element, items, depth + 1)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn any_type_at(&self, value: &Value, tags: &TypeSet, options: &Options, depth: usize) -> Result<bool> {
        if tags.contains(TypeTag::Any) {
            return Ok(true);
        }
        for tag in tags.tags() {
            if !self.predicate.is_of_type(value, tag, options) {
                continue;
            }
            let nested_ok = match &options.schema {
                Some(schema) if !(options.allow_null && value.is_null()) => {
                    self.schema_at(value, schema, depth + 1)?
                }
                _ => true,
            };
            if nested_ok {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
