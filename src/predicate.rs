//! Single-tag, single-value type checks.
//!
//! [`TypePredicate`] is the seam the matcher calls through; [`JsonTypes`] is
//! the stock implementation over `serde_json::Value`. Any
//! `Fn(&Value, TypeTag, &Options) -> bool` works as a predicate too.
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::options::{Options, DEFAULT_PATTERN};
use crate::tag::TypeTag;

static DEFAULT_OPTIONS: Lazy<Options> = Lazy::new(Options::default);

pub trait TypePredicate {
    /// Whether `value` is of kind `tag` under the refinements in `options`.
    /// The nested `schema` option is not this trait's concern.
    fn is_of_type(&self, value: &Value, tag: TypeTag, options: &Options) -> bool;
}

impl<F> TypePredicate for F
where
    F: Fn(&Value, TypeTag, &Options) -> bool,
{
    fn is_of_type(&self, value: &Value, tag: TypeTag, options: &Options) -> bool {
        self(value, tag, options)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonTypes;

impl TypePredicate for JsonTypes {
    fn is_of_type(&self, value: &Value, tag: TypeTag, options: &Options) -> bool {
        if options.allow_null && value.is_null() {
            return true;
        }
        match tag {
            TypeTag::Any => true,
            TypeTag::Null => value.is_null(),
            TypeTag::Boolean => value.is_boolean(),
            TypeTag::Number => value.as_f64().is_some_and(|n| number_fits(n, options)),
            TypeTag::Integer => value
                .as_f64()
                .is_some_and(|n| n.fract() == 0.0 && number_fits(n, options)),
            TypeTag::String => value.as_str().is_some_and(|s| string_fits(s, options)),
            TypeTag::Array => value
                .as_array()
                .is_some_and(|xs| size_fits(xs.len(), options) && self.members_fit(xs, options)),
            TypeTag::Object => match value {
                Value::Object(map) => {
                    size_fits(map.len(), options) && self.members_fit(map.values(), options)
                }
                Value::Array(xs) if options.array_as_object => {
                    size_fits(xs.len(), options) && self.members_fit(xs, options)
                }
                _ => false,
            },
        }
    }
}

impl JsonTypes {
    /// Every member carries one of the tags in `options.types`.
    fn members_fit<'a, I>(&self, members: I, options: &Options) -> bool
    where
        I: IntoIterator<Item = &'a Value>,
    {
        if options.types.contains(TypeTag::Any) {
            return true;
        }
        members.into_iter().all(|member| {
            options
                .types
                .tags()
                .any(|tag| self.is_of_type(member, tag, &DEFAULT_OPTIONS))
        })
    }
}

fn number_fits(n: f64, options: &Options) -> bool {
    options.in_range(n) && is_multiple_of(n, options.multiple_of)
}

fn size_fits(len: usize, options: &Options) -> bool {
    !(options.excl_empty && len == 0) && options.in_range(len as f64)
}

fn string_fits(s: &str, options: &Options) -> bool {
    size_fits(s.chars().count(), options) && pattern_matches(s, options)
}

/// Unanchored search. An unknown flag or a pattern that does not compile
/// matches nothing.
fn pattern_matches(s: &str, options: &Options) -> bool {
    if options.pattern == DEFAULT_PATTERN && options.pattern_flags.is_empty() {
        return true;
    }
    options.pattern_regex().is_some_and(|re| re.is_match(s))
}

/// Whether `value` is a whole multiple of `multiple_of`. A zero
/// `multiple_of` disables the check; infinities never qualify.
pub fn is_multiple_of(value: f64, multiple_of: f64) -> bool {
    multiple_of == 0.0
        || (value != f64::INFINITY
            && value != f64::NEG_INFINITY
            // abs folds a -0.0 remainder
            && (value % multiple_of).abs() == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(raw: Value) -> Options {
        Options::new(&raw).unwrap()
    }

    #[test]
    fn multiple_of_rules() {
        assert!(is_multiple_of(9.0, 3.0));
        assert!(is_multiple_of(9.0, 0.0));
        assert!(is_multiple_of(-9.0, 3.0));
        assert!(!is_multiple_of(f64::INFINITY, 3.0));
        assert!(!is_multiple_of(f64::NEG_INFINITY, 3.0));
        assert!(!is_multiple_of(10.0, 3.0));
        assert!(is_multiple_of(1.5, 0.5));
        assert!(!is_multiple_of(f64::NAN, 3.0));
    }

    #[test]
    fn plain_kinds() {
        let p = JsonTypes;
        let d = Options::default();
        assert!(p.is_of_type(&json!(null), TypeTag::Null, &d));
        assert!(p.is_of_type(&json!(false), TypeTag::Boolean, &d));
        assert!(p.is_of_type(&json!(2.5), TypeTag::Number, &d));
        assert!(p.is_of_type(&json!(2), TypeTag::Integer, &d));
        assert!(!p.is_of_type(&json!(2.5), TypeTag::Integer, &d));
        assert!(p.is_of_type(&json!("x"), TypeTag::String, &d));
        assert!(!p.is_of_type(&json!("1"), TypeTag::Number, &d));
        assert!(p.is_of_type(&json!([]), TypeTag::Array, &d));
        assert!(p.is_of_type(&json!({}), TypeTag::Object, &d));
        assert!(!p.is_of_type(&json!([]), TypeTag::Object, &d));
        assert!(!p.is_of_type(&json!(null), TypeTag::Object, &d));
    }

    #[test]
    fn numeric_refinements() {
        let p = JsonTypes;
        let o = opts(json!({ "min": 0, "max": 10, "exclMax": true, "multipleOf": 2 }));
        assert!(p.is_of_type(&json!(0), TypeTag::Number, &o));
        assert!(p.is_of_type(&json!(8), TypeTag::Integer, &o));
        assert!(!p.is_of_type(&json!(10), TypeTag::Number, &o));
        assert!(!p.is_of_type(&json!(3), TypeTag::Number, &o));
        assert!(!p.is_of_type(&json!(-2), TypeTag::Number, &o));
    }

    #[test]
    fn string_refinements() {
        let p = JsonTypes;
        let o = opts(json!({ "pattern": "^ab+c$", "patternFlags": "i" }));
        assert!(p.is_of_type(&json!("ABBC"), TypeTag::String, &o));
        assert!(!p.is_of_type(&json!("ac"), TypeTag::String, &o));

        let o = opts(json!({ "pattern": "b" }));
        assert!(p.is_of_type(&json!("abc"), TypeTag::String, &o));

        let o = opts(json!({ "exclEmpty": true, "max": 3 }));
        assert!(!p.is_of_type(&json!(""), TypeTag::String, &o));
        assert!(p.is_of_type(&json!("äöü"), TypeTag::String, &o));
        assert!(!p.is_of_type(&json!("abcd"), TypeTag::String, &o));
        assert!(p.is_of_type(&json!(""), TypeTag::String, &Options::default()));
    }

    #[test]
    fn broken_patterns_match_nothing() {
        let p = JsonTypes;
        assert!(!p.is_of_type(&json!("a"), TypeTag::String, &opts(json!({ "pattern": "(" }))));
        let o = opts(json!({ "pattern": "a", "patternFlags": "q" }));
        assert!(!p.is_of_type(&json!("a"), TypeTag::String, &o));
        let o = opts(json!({ "pattern": "a", "patternFlags": "g" }));
        assert!(p.is_of_type(&json!("a"), TypeTag::String, &o));
    }

    #[test]
    fn collection_refinements() {
        let p = JsonTypes;
        let o = opts(json!({ "type": ["integer", "null"], "min": 1 }));
        assert!(p.is_of_type(&json!([1, null, 3]), TypeTag::Array, &o));
        assert!(!p.is_of_type(&json!([1, "2"]), TypeTag::Array, &o));
        assert!(!p.is_of_type(&json!([]), TypeTag::Array, &o));
        assert!(p.is_of_type(&json!({ "a": 1 }), TypeTag::Object, &o));
        assert!(!p.is_of_type(&json!({ "a": 1.5 }), TypeTag::Object, &o));

        let o = opts(json!({ "arrayAsObject": true, "exclEmpty": true }));
        assert!(p.is_of_type(&json!([0]), TypeTag::Object, &o));
        assert!(!p.is_of_type(&json!([]), TypeTag::Object, &o));
        assert!(!p.is_of_type(&json!({}), TypeTag::Object, &o));
    }

    #[test]
    fn allow_null_satisfies_any_tag() {
        let p = JsonTypes;
        let o = opts(json!({ "allowNull": true }));
        for tag in TypeTag::ALL {
            assert!(p.is_of_type(&Value::Null, tag, &o), "{tag}");
        }
        assert!(!p.is_of_type(&Value::Null, TypeTag::String, &Options::default()));
    }

    #[test]
    fn closures_are_predicates() {
        let only_strings = |v: &Value, _: TypeTag, _: &Options| v.is_string();
        assert!(only_strings.is_of_type(&json!("s"), TypeTag::Number, &Options::default()));
        assert!(!only_strings.is_of_type(&json!(1), TypeTag::Number, &Options::default()));
    }
}
