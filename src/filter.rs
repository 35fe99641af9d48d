/// Declarative record predicates.
///
/// [`Filter`] is a small, serializable predicate language over open-schema
/// JSON records. It is the declarative form of the group engine's
/// pre-filter; anything implementing [`RecordPredicate`] (including plain
/// closures) can be used in its place.
///
/// # Example
///
/// ```
/// use koru_lens::filter::{Filter, RecordPredicate};
/// use serde_json::json;
///
/// let cheap_hotels = Filter::and(vec![
///     Filter::eq("category", "Hotel"),
///     Filter::lte("price", 150),
/// ]);
/// assert!(cheap_hotels.test(&json!({"category": "Hotel", "price": 120})));
///
/// let parsed: Filter = "price >= 100".parse().unwrap();
/// assert!(parsed.test(&json!({"price": 100})));
/// ```
use crate::error::{LensError, LensResult};
use crate::path::FieldPath;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Operators of the compact text form. At any position the two-character
/// operators are tried before their one-character prefixes.
const OPERATORS: [&str; 7] = [">=", "<=", "!=", "=", ">", "<", "~"];

/// Anything that can decide whether a record is kept.
pub trait RecordPredicate {
    /// Return `true` to keep `record`.
    fn test(&self, record: &JsonValue) -> bool;
}

impl<F> RecordPredicate for F
where
    F: Fn(&JsonValue) -> bool,
{
    fn test(&self, record: &JsonValue) -> bool {
        self(record)
    }
}

/// A regular expression compiled once, when the filter is built.
///
/// Serializes as its source text; deserializing an invalid pattern fails.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile `pattern`, rejecting invalid syntax with
    /// [`LensError::InvalidPattern`].
    pub fn new(pattern: &str) -> LensResult<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| LensError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether `text` contains a match.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = LensError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        Self::new(pattern)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source).map_err(serde::de::Error::custom)
    }
}

/// A filter condition over a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Field equals value.
    Eq {
        /// Path to the compared field.
        field: FieldPath,
        /// Value it must equal.
        value: JsonValue,
    },
    /// Field not equals value (absent fields pass).
    Ne {
        /// Path to the compared field.
        field: FieldPath,
        /// Value it must differ from.
        value: JsonValue,
    },
    /// Field greater than value.
    Gt {
        /// Path to the compared field.
        field: FieldPath,
        /// Exclusive lower bound.
        value: JsonValue,
    },
    /// Field greater than or equal to value.
    Gte {
        /// Path to the compared field.
        field: FieldPath,
        /// Inclusive lower bound.
        value: JsonValue,
    },
    /// Field less than value.
    Lt {
        /// Path to the compared field.
        field: FieldPath,
        /// Exclusive upper bound.
        value: JsonValue,
    },
    /// Field less than or equal to value.
    Lte {
        /// Path to the compared field.
        field: FieldPath,
        /// Inclusive upper bound.
        value: JsonValue,
    },
    /// Field contains substring (for strings) or element (for arrays).
    Contains {
        /// Path to the searched field.
        field: FieldPath,
        /// Substring, element or key to look for.
        value: JsonValue,
    },
    /// Field exists and is not null.
    Exists {
        /// Path that must resolve.
        field: FieldPath,
    },
    /// Field matches regex pattern (for strings).
    Matches {
        /// Path to a string field.
        field: FieldPath,
        /// Compiled expression.
        pattern: Pattern,
    },
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
    /// Logical NOT of a filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Create an equality filter.
    pub fn eq(field: impl Into<FieldPath>, value: impl Into<JsonValue>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a not-equals filter.
    pub fn ne(field: impl Into<FieldPath>, value: impl Into<JsonValue>) -> Self {
        Self::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than filter.
    pub fn gt(field: impl Into<FieldPath>, value: impl Into<JsonValue>) -> Self {
        Self::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than-or-equal filter.
    pub fn gte(field: impl Into<FieldPath>, value: impl Into<JsonValue>) -> Self {
        Self::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than filter.
    pub fn lt(field: impl Into<FieldPath>, value: impl Into<JsonValue>) -> Self {
        Self::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than-or-equal filter.
    pub fn lte(field: impl Into<FieldPath>, value: impl Into<JsonValue>) -> Self {
        Self::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a contains filter.
    pub fn contains(field: impl Into<FieldPath>, value: impl Into<JsonValue>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an exists filter.
    pub fn exists(field: impl Into<FieldPath>) -> Self {
        Self::Exists {
            field: field.into(),
        }
    }

    /// Create a regex match filter.
    ///
    /// An invalid pattern is a [`LensError::InvalidPattern`].
    pub fn matches(field: impl Into<FieldPath>, pattern: &str) -> LensResult<Self> {
        Ok(Self::Matches {
            field: field.into(),
            pattern: Pattern::new(pattern)?,
        })
    }

    /// Combine filters with AND.
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    /// Combine filters with OR.
    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    /// Negate a filter.
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Evaluate this filter against a record.
    pub fn matches_value(&self, record: &JsonValue) -> bool {
        match self {
            Filter::Eq { field, value } => field.resolve(record).is_some_and(|v| v == value),
            Filter::Ne { field, value } => field.resolve(record).is_none_or(|v| v != value),
            Filter::Gt { field, value } => {
                compare_field(record, field, value).is_some_and(Ordering::is_gt)
            }
            Filter::Gte { field, value } => {
                compare_field(record, field, value).is_some_and(Ordering::is_ge)
            }
            Filter::Lt { field, value } => {
                compare_field(record, field, value).is_some_and(Ordering::is_lt)
            }
            Filter::Lte { field, value } => {
                compare_field(record, field, value).is_some_and(Ordering::is_le)
            }
            Filter::Contains { field, value } => field
                .resolve(record)
                .is_some_and(|v| json_contains(v, value)),
            Filter::Exists { field } => field.resolve(record).is_some_and(|v| !v.is_null()),
            Filter::Matches { field, pattern } => field
                .resolve(record)
                .and_then(JsonValue::as_str)
                .is_some_and(|s| pattern.is_match(s)),
            Filter::And(filters) => filters.iter().all(|f| f.matches_value(record)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches_value(record)),
            Filter::Not(filter) => !filter.matches_value(record),
        }
    }
}

impl RecordPredicate for Filter {
    fn test(&self, record: &JsonValue) -> bool {
        self.matches_value(record)
    }
}

/// Parses the compact `field OP value` form, e.g. `price >= 100`,
/// `category = Hotel` or `name ~ ^Sea`.
impl FromStr for Filter {
    type Err = LensError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let expr = expr.trim();

        let Some((field, op, value_str)) = split_operator(expr).filter(|(f, _, _)| !f.is_empty())
        else {
            return Err(LensError::input_type(format!(
                "invalid filter expression '{expr}' (expected: field OP value, OP one of >= <= != = > < ~)"
            )));
        };

        if op == "~" {
            return Filter::matches(field, value_str);
        }

        let value = parse_literal(value_str)?;
        Ok(match op {
            "=" => Filter::eq(field, value),
            "!=" => Filter::ne(field, value),
            ">" => Filter::gt(field, value),
            "<" => Filter::lt(field, value),
            ">=" => Filter::gte(field, value),
            _ => Filter::lte(field, value),
        })
    }
}

/// Split at the leftmost operator into trimmed `(field, op, value)`.
fn split_operator(expr: &str) -> Option<(&str, &'static str, &str)> {
    expr.char_indices().find_map(|(idx, _)| {
        let rest = &expr[idx..];
        OPERATORS.iter().find(|op| rest.starts_with(**op)).map(|op| {
            (
                expr[..idx].trim(),
                *op,
                expr[idx + op.len()..].trim(),
            )
        })
    })
}

/// Interpret a filter literal: quoted string, boolean, number, or bare text.
fn parse_literal(value_str: &str) -> Result<JsonValue, LensError> {
    if value_str.starts_with('"') && value_str.ends_with('"') && value_str.len() >= 2 {
        return Ok(serde_json::from_str(value_str)?);
    }
    Ok(match value_str {
        "true" => JsonValue::Bool(true),
        "false" => JsonValue::Bool(false),
        "null" => JsonValue::Null,
        _ => {
            if let Ok(num) = value_str.parse::<i64>() {
                JsonValue::from(num)
            } else if let Ok(num) = value_str.parse::<f64>() {
                JsonValue::from(num)
            } else {
                JsonValue::from(value_str)
            }
        }
    })
}

fn compare_field(record: &JsonValue, field: &FieldPath, expected: &JsonValue) -> Option<Ordering> {
    field
        .resolve(record)
        .and_then(|actual| compare_json(actual, expected))
}

/// Compare two JSON values of the same scalar type.
/// Mixed types and non-scalars have no ordering.
fn compare_json(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        (JsonValue::Bool(a), JsonValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Check if a JSON value contains another value.
fn json_contains(container: &JsonValue, item: &JsonValue) -> bool {
    match container {
        JsonValue::String(s) => item.as_str().is_some_and(|substr| s.contains(substr)),
        JsonValue::Array(arr) => arr.contains(item),
        JsonValue::Object(map) => item.as_str().is_some_and(|key| map.contains_key(key)),
        _ => false,
    }
}
