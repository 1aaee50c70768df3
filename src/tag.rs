//! Type-tag vocabulary.
//!
//! Tags travel as their lowercase name (`"string"`) or as their numeric code
//! (`5`). A `type` field may hold one tag or a non-empty list of tags; unknown
//! entries are kept in [`TypeSet`] so callers can tell a bad field from a
//! missing one.
use std::fmt;

use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// Universal tag; absorbs every other tag in a set.
    Any,
    Null,
    Boolean,
    Number,
    /// A number without a fractional part.
    Integer,
    String,
    Array,
    Object,
}

impl TypeTag {
    pub const ALL: [TypeTag; 8] = [
        TypeTag::Any,
        TypeTag::Null,
        TypeTag::Boolean,
        TypeTag::Number,
        TypeTag::Integer,
        TypeTag::String,
        TypeTag::Array,
        TypeTag::Object,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Any => "any",
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::Integer => "integer",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    pub fn code(self) -> u64 {
        self as u64
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.code() == code)
    }

    /// Reads a single tag literal. Only exact names and non-negative integer
    /// codes are tags; `1.0`, `"String"` and `true` are not.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Self::from_name(name),
            Value::Number(n) => n.as_u64().and_then(Self::from_code),
            _ => None,
        }
    }

    pub fn to_value(self) -> Value {
        Value::from(self.name())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeEntry {
    Tag(TypeTag),
    Unknown(Value),
}

/// The contents of a `type` field: one tag, or an ordered list of tags.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSet {
    entries: Vec<TypeEntry>,
    many: bool,
}

impl TypeSet {
    pub fn any() -> Self {
        Self::one(TypeTag::Any)
    }

    pub fn one(tag: TypeTag) -> Self {
        Self { entries: vec![TypeEntry::Tag(tag)], many: false }
    }

    pub fn many<I: IntoIterator<Item = TypeTag>>(tags: I) -> Self {
        Self {
            entries: tags.into_iter().map(TypeEntry::Tag).collect(),
            many: true,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        fn entry(v: &Value) -> TypeEntry {
            match TypeTag::from_value(v) {
                Some(tag) => TypeEntry::Tag(tag),
                None => TypeEntry::Unknown(v.clone()),
            }
        }
        match value {
            Value::Array(xs) => Self { entries: xs.iter().map(entry).collect(), many: true },
            other => Self { entries: vec![entry(other)], many: false },
        }
    }

    pub fn entries(&self) -> &[TypeEntry] {
        &self.entries
    }

    /// Non-empty, and every entry is a known tag.
    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty()
            && self.entries.iter().all(|e| matches!(e, TypeEntry::Tag(_)))
    }

    /// Known tags in declaration order; unknown entries are skipped.
    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.entries.iter().filter_map(|e| match e {
            TypeEntry::Tag(tag) => Some(*tag),
            TypeEntry::Unknown(_) => None,
        })
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.tags().any(|t| t == tag)
    }

    /// True only for the bare single-tag form, so `["array"]` is not exactly
    /// `array`.
    pub fn is_exactly(&self, tag: TypeTag) -> bool {
        !self.many && matches!(self.entries.as_slice(), [TypeEntry::Tag(t)] if *t == tag)
    }

    pub fn to_value(&self) -> Value {
        let entry = |e: &TypeEntry| match e {
            TypeEntry::Tag(tag) => tag.to_value(),
            TypeEntry::Unknown(v) => v.clone(),
        };
        match (self.many, self.entries.as_slice()) {
            (false, [single]) => entry(single),
            _ => Value::Array(self.entries.iter().map(entry).collect()),
        }
    }
}

impl Default for TypeSet {
    fn default() -> Self {
        Self::any()
    }
}

impl From<TypeTag> for TypeSet {
    fn from(tag: TypeTag) -> Self {
        Self::one(tag)
    }
}

/// Whether `value` is a tag, or a non-empty list made only of tags.
pub fn is_valid_type_tag(value: &Value) -> bool {
    TypeSet::from_value(value).is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_and_codes_both_resolve() {
        assert_eq!(TypeTag::from_value(&json!("string")), Some(TypeTag::String));
        assert_eq!(TypeTag::from_value(&json!(5)), Some(TypeTag::String));
        assert_eq!(TypeTag::from_value(&json!(0)), Some(TypeTag::Any));
        assert_eq!(TypeTag::from_value(&json!(8)), None);
        assert_eq!(TypeTag::from_value(&json!(1.5)), None);
        assert_eq!(TypeTag::from_value(&json!("String")), None);
        assert_eq!(TypeTag::from_value(&json!(true)), None);
    }

    #[test]
    fn tag_validity_over_single_and_sequence() {
        assert!(is_valid_type_tag(&json!("array")));
        assert!(is_valid_type_tag(&json!(["number", "string"])));
        assert!(is_valid_type_tag(&json!([3, "null"])));
        assert!(!is_valid_type_tag(&json!([])));
        assert!(!is_valid_type_tag(&json!(["number", "float"])));
        assert!(!is_valid_type_tag(&json!(null)));
        assert!(!is_valid_type_tag(&json!({"type": "number"})));
    }

    #[test]
    fn unknown_entries_are_kept_but_not_yielded() {
        let set = TypeSet::from_value(&json!(["bogus", "number"]));
        assert!(!set.is_valid());
        assert_eq!(set.entries().len(), 2);
        assert_eq!(set.tags().collect::<Vec<_>>(), vec![TypeTag::Number]);
        assert_eq!(set.to_value(), json!(["bogus", "number"]));
    }

    #[test]
    fn exact_form_distinguishes_list_of_one() {
        assert!(TypeSet::from_value(&json!("array")).is_exactly(TypeTag::Array));
        assert!(!TypeSet::from_value(&json!(["array"])).is_exactly(TypeTag::Array));
        assert!(TypeSet::default().is_exactly(TypeTag::Any));
    }
}
