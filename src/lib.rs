//! Structural validation of JSON values against declarative, recursive schemas.
//!
//! A schema is plain data: one node, or a list of nodes read as alternatives.
//! Each node can restrict the value's type tag(s), refine the type check with
//! [`Options`], describe named members under `props` (optionally `required`),
//! and describe every element of an array under `items`.
//!
//! ```
//! use json_conform::{matches_schema, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({
//!     "type": "object",
//!     "props": {
//!         "id": { "type": "integer", "required": true },
//!         "tags": { "type": "array", "items": { "type": "string" } }
//!     }
//! }));
//!
//! assert!(matches_schema(&json!({ "id": 7, "tags": ["a", "b"] }), &schema));
//! assert!(!matches_schema(&json!({ "tags": ["a"] }), &schema));
//! ```
//!
//! Matching never fails on malformed schema data: such nodes simply do not
//! match. The only fallible surfaces are strict [`Options`] construction and
//! the depth guard exposed through [`Validator::try_matches_schema`].
pub mod error;
pub mod matcher;
pub mod options;
pub mod path_de;
pub mod predicate;
pub mod schema;
pub mod tag;
pub mod value;

pub use error::{Error, Result};
pub use matcher::{Validator, DEFAULT_MAX_DEPTH};
pub use options::{is_valid_options, meta_schema, OptionField, Options};
pub use predicate::{is_multiple_of, JsonTypes, TypePredicate};
pub use schema::{NodeOptions, Props, Schema, SchemaNode};
pub use tag::{is_valid_type_tag, TypeEntry, TypeSet, TypeTag};
pub use value::{extend_object, member};

use serde_json::Value;

/// Tests `value` against `schema` with the stock [`JsonTypes`] predicate.
pub fn matches_schema(value: &Value, schema: &Schema) -> bool {
    Validator::<JsonTypes>::default().matches_schema(value, schema)
}

/// Tests `value` against one or more type tags with the stock predicate.
pub fn matches_any_type(value: &Value, tags: &TypeSet, options: Option<&Options>) -> bool {
    Validator::<JsonTypes>::default().matches_any_type(value, tags, options)
}
