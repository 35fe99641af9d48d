/// Dot-separated field paths over open-schema JSON records.
///
/// A [`FieldPath`] such as `location.city` walks nested objects one segment
/// at a time. Resolution never fails loudly: if any step is missing or lands
/// on something that is not an object, the whole path is absent.
///
/// This is the generic "mapping walk" used where the record schema is
/// genuinely open (grouping, declarative pre-filters). Fixed-schema listings
/// use the typed accessors in [`crate::listing`] instead.
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A parsed dot-separated path into a JSON record.
///
/// Equality and hashing are structural on the original path string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a path such as `"price"` or `"location.city"`.
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// The path exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The individual segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The innermost segment; `location.city` yields `city`.
    pub fn last_segment(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Resolve this path against a record.
    ///
    /// Returns `None` when any segment is missing or an intermediate value
    /// is not an object.
    pub fn resolve<'a>(&self, record: &'a JsonValue) -> Option<&'a JsonValue> {
        self.segments
            .iter()
            .try_fold(record, |current, segment| match current {
                JsonValue::Object(map) => map.get(segment),
                _ => None,
            })
    }

    /// Resolve this path and keep the result only if it is a JSON number.
    pub fn resolve_number(&self, record: &JsonValue) -> Option<f64> {
        self.resolve(record).and_then(JsonValue::as_f64)
    }
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for FieldPath {}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for FieldPath {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}
