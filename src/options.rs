//! Refinement options.
//!
//! Two ways in: [`is_valid_options`] answers yes/no and never fails, while
//! [`Options::new`] builds a fully defaulted instance and fails on the first
//! known key whose value has the wrong shape. Both read the same field table,
//! so they always agree on what is well formed.
use std::fmt;

use once_cell::sync::{Lazy, OnceCell};
use regex::{Regex, RegexBuilder};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::matcher::Validator;
use crate::predicate::JsonTypes;
use crate::schema::Schema;
use crate::tag::{is_valid_type_tag, TypeSet};

/// Catch-all pattern used when none is given.
pub const DEFAULT_PATTERN: &str = r"[\s\S]*";

/// Shape every `schema` option must have. Kept as data and checked with the
/// ordinary matcher.
static META_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::from_value(&json!({
        "type": "object",
        "props": {
            "type": [
                { "type": "string" },
                { "type": "number" },
                { "type": "array", "items": { "type": ["string", "number"] } }
            ],
            "props": { "type": "object" },
            "items": [
                { "type": "object" },
                { "type": "array", "items": { "type": "object" } }
            ],
            "required": { "type": "boolean" },
            "options": { "type": "object" }
        }
    }))
});

pub fn meta_schema() -> &'static Schema {
    &META_SCHEMA
}

// ————————————————————————————————————————————————————————————————————————————
// FIELD TABLE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldKind {
    Tags,
    Number,
    Boolean,
    Text,
    Schema,
}

/// Every key an options document may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionField {
    Type,
    Min,
    Max,
    ExclMin,
    ExclMax,
    MultipleOf,
    Pattern,
    PatternFlags,
    ExclEmpty,
    AllowNull,
    ArrayAsObject,
    Schema,
}

impl OptionField {
    pub const ALL: [OptionField; 12] = [
        OptionField::Type,
        OptionField::Min,
        OptionField::Max,
        OptionField::ExclMin,
        OptionField::ExclMax,
        OptionField::MultipleOf,
        OptionField::Pattern,
        OptionField::PatternFlags,
        OptionField::ExclEmpty,
        OptionField::AllowNull,
        OptionField::ArrayAsObject,
        OptionField::Schema,
    ];

    pub fn key(self) -> &'static str {
        match self {
            OptionField::Type => "type",
            OptionField::Min => "min",
            OptionField::Max => "max",
            OptionField::ExclMin => "exclMin",
            OptionField::ExclMax => "exclMax",
            OptionField::MultipleOf => "multipleOf",
            OptionField::Pattern => "pattern",
            OptionField::PatternFlags => "patternFlags",
            OptionField::ExclEmpty => "exclEmpty",
            OptionField::AllowNull => "allowNull",
            OptionField::ArrayAsObject => "arrayAsObject",
            OptionField::Schema => "schema",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    fn kind(self) -> FieldKind {
        match self {
            OptionField::Type => FieldKind::Tags,
            OptionField::Min | OptionField::Max | OptionField::MultipleOf => FieldKind::Number,
            OptionField::ExclMin
            | OptionField::ExclMax
            | OptionField::ExclEmpty
            | OptionField::AllowNull
            | OptionField::ArrayAsObject => FieldKind::Boolean,
            OptionField::Pattern | OptionField::PatternFlags => FieldKind::Text,
            OptionField::Schema => FieldKind::Schema,
        }
    }

    /// Per-field shape check.
    pub fn accepts(self, value: &Value) -> bool {
        match self.kind() {
            FieldKind::Tags => is_valid_type_tag(value),
            FieldKind::Number => value.as_f64().is_some_and(|n| !n.is_nan()),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Text => value.is_string(),
            FieldKind::Schema => {
                value.is_null() || Validator::<JsonTypes>::default().matches_schema(value, meta_schema())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OPTIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// Tags every element (array) or member value (object) must carry.
    pub types: TypeSet,
    pub min: f64,
    pub max: f64,
    pub excl_min: bool,
    pub excl_max: bool,
    /// `0` disables the check.
    pub multiple_of: f64,
    pub pattern: String,
    pub pattern_flags: String,
    pub excl_empty: bool,
    pub allow_null: bool,
    pub array_as_object: bool,
    /// Extra schema the value must also satisfy.
    pub schema: Option<Schema>,
    compiled: PatternCache,
}

/// Regex built from `pattern` + `pattern_flags` on first use, remembered
/// together with the source it was built from.
#[derive(Clone, Default)]
struct PatternCache(OnceCell<(String, String, Option<Regex>)>);

// derived data; two options are equal when their fields are
impl PartialEq for PatternCache {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PatternCache")
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            types: TypeSet::any(),
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            excl_min: false,
            excl_max: false,
            multiple_of: 0.0,
            pattern: DEFAULT_PATTERN.to_string(),
            pattern_flags: String::new(),
            excl_empty: false,
            allow_null: false,
            array_as_object: false,
            schema: None,
            compiled: PatternCache::default(),
        }
    }
}

impl Options {
    /// Strict construction. Anything other than a mapping yields the
    /// defaults. Unknown keys are skipped; the first known key with a
    /// malformed value aborts with [`Error::InvalidOption`].
    pub fn new(raw: &Value) -> Result<Self> {
        let mut out = Self::default();
        let Value::Object(map) = raw else {
            return Ok(out);
        };
        for (key, value) in map {
            let Some(field) = OptionField::from_key(key) else {
                continue;
            };
            if !field.accepts(value) {
                let error = Error::InvalidOption { key: key.clone(), input: raw.to_string() };
                debug!(%error, "rejecting options");
                return Err(error);
            }
            out.assign(field, value);
        }
        Ok(out)
    }

    /// Like [`Options::new`], with `None` standing for an absent document.
    pub fn from_raw(raw: Option<&Value>) -> Result<Self> {
        raw.map_or_else(|| Ok(Self::default()), Self::new)
    }

    // `value` has already passed `field.accepts`.
    fn assign(&mut self, field: OptionField, value: &Value) {
        let number = || value.as_f64().unwrap_or_default();
        let flag = || value.as_bool().unwrap_or_default();
        let text = || value.as_str().unwrap_or_default().to_string();
        match field {
            OptionField::Type => self.types = TypeSet::from_value(value),
            OptionField::Min => self.min = number(),
            OptionField::Max => self.max = number(),
            OptionField::ExclMin => self.excl_min = flag(),
            OptionField::ExclMax => self.excl_max = flag(),
            OptionField::MultipleOf => self.multiple_of = number(),
            OptionField::Pattern => self.pattern = text(),
            OptionField::PatternFlags => self.pattern_flags = text(),
            OptionField::ExclEmpty => self.excl_empty = flag(),
            OptionField::AllowNull => self.allow_null = flag(),
            OptionField::ArrayAsObject => self.array_as_object = flag(),
            OptionField::Schema => {
                self.schema = (!value.is_null()).then(|| Schema::from_value(value));
            }
        }
    }

    /// `pattern` compiled with `pattern_flags`, or `None` when the pattern
    /// does not compile or a flag is unknown. Built once per instance; a
    /// later edit to either field is honored but not cached.
    pub fn pattern_regex(&self) -> Option<Regex> {
        let (pattern, flags, compiled) = self.compiled.0.get_or_init(|| {
            let compiled = compile_pattern(&self.pattern, &self.pattern_flags);
            (self.pattern.clone(), self.pattern_flags.clone(), compiled)
        });
        if *pattern == self.pattern && *flags == self.pattern_flags {
            compiled.clone()
        } else {
            compile_pattern(&self.pattern, &self.pattern_flags)
        }
    }

    /// Whether `n` falls inside `min`/`max`, honoring exclusivity.
    pub fn in_range(&self, n: f64) -> bool {
        let above = if self.excl_min { n > self.min } else { n >= self.min };
        let below = if self.excl_max { n < self.max } else { n <= self.max };
        above && below
    }

    /// The fields that differ from their defaults, as an options document
    /// [`Options::new`] reads back to an equal value.
    pub fn to_value(&self) -> Value {
        let base = Self::default();
        let mut out = Map::new();
        let mut put = |field: OptionField, value: Value| {
            out.insert(field.key().to_string(), value);
        };
        if self.types != base.types {
            put(OptionField::Type, self.types.to_value());
        }
        if self.min != base.min {
            put(OptionField::Min, json!(self.min));
        }
        if self.max != base.max {
            put(OptionField::Max, json!(self.max));
        }
        if self.excl_min {
            put(OptionField::ExclMin, json!(true));
        }
        if self.excl_max {
            put(OptionField::ExclMax, json!(true));
        }
        if self.multiple_of != base.multiple_of {
            put(OptionField::MultipleOf, json!(self.multiple_of));
        }
        if self.pattern != base.pattern {
            put(OptionField::Pattern, json!(self.pattern));
        }
        if !self.pattern_flags.is_empty() {
            put(OptionField::PatternFlags, json!(self.pattern_flags));
        }
        if self.excl_empty {
            put(OptionField::ExclEmpty, json!(true));
        }
        if self.allow_null {
            put(OptionField::AllowNull, json!(true));
        }
        if self.array_as_object {
            put(OptionField::ArrayAsObject, json!(true));
        }
        if let Some(schema) = &self.schema {
            put(OptionField::Schema, schema.to_value());
        }
        Value::Object(out)
    }
}

fn compile_pattern(pattern: &str, flags: &str) -> Option<Regex> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'u' => builder.unicode(true),
            // global / sticky only affect stateful matching
            'g' | 'y' => &mut builder,
            _ => return None,
        };
    }
    builder.build().ok()
}

/// Permissive check. An absent or non-mapping document counts as empty and
/// is valid; unknown keys never fail it.
pub fn is_valid_options(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::Object(map)) => map.iter().all(|(key, value)| {
            OptionField::from_key(key).is_none_or(|field| field.accepts(value))
        }),
        _ => true,
    }
}
