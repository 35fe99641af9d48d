/// Group-and-aggregate over open-schema JSON records.
///
/// The group engine runs a fixed pipeline:
///
/// 1. **Pre-filter** (optional): drop records the predicate rejects.
/// 2. **Partition**: one linear scan assigns each record to the group of
///    its [`GroupKey`], built from one or more dot-path fields.
/// 3. **Aggregate**: compute each requested statistic per group.
/// 4. **Sort** (optional): order groups by one aggregate value.
///
/// Groups come out in the order their first member appeared. Sorting by an
/// aggregate is stable, so groups with equal values keep that order.
///
/// # Example
///
/// ```
/// use koru_lens::aggregate::AggregationKind;
/// use koru_lens::group::{GroupEngine, GroupSpec};
/// use koru_lens::sort::SortOrder;
/// use serde_json::json;
///
/// let bookings = vec![
///     json!({"category": "Hotel", "price": 200, "nights": 2}),
///     json!({"category": "Flight", "price": 350}),
///     json!({"category": "Hotel", "price": 120, "nights": 1}),
/// ];
///
/// let spec = GroupSpec::by("category")
///     .aggregate("price", AggregationKind::Sum)
///     .aggregate("nights", AggregationKind::Avg)
///     .sort_by("price", SortOrder::Desc);
///
/// let groups = GroupEngine::execute(&spec, &bookings).unwrap();
/// assert_eq!(groups[0].identity["category"], json!("Flight"));
/// assert_eq!(groups[1].aggregates["price"], Some(320.0));
/// assert_eq!(groups[0].aggregates["nights"], None);
/// ```
use crate::aggregate::AggregationKind;
use crate::error::{LensError, LensResult};
use crate::filter::{Filter, RecordPredicate};
use crate::path::FieldPath;
use crate::sort::SortOrder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

/// How groups whose sort aggregate is `null` are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAggregate {
    /// Compare a missing value as `0`. "No data" and "zero" sort together.
    #[default]
    AsZero,
    /// Place missing values after every real value, in either direction.
    Last,
}

/// One resolved component of a [`GroupKey`].
///
/// Values are normalised so equal numbers written differently (`1` and
/// `1.0`) land in the same group, while a string `"1"` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// The path did not resolve.
    Missing,
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number, keyed by its canonical decimal form.
    Number(String),
    /// A string.
    Text(String),
    /// An array or object, keyed by its serialized form.
    Composite(String),
}

impl KeyPart {
    fn from_value(value: Option<&JsonValue>) -> Self {
        match value {
            None => KeyPart::Missing,
            Some(JsonValue::Null) => KeyPart::Null,
            Some(JsonValue::Bool(b)) => KeyPart::Bool(*b),
            Some(JsonValue::Number(n)) => KeyPart::Number(
                n.as_f64()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| n.to_string()),
            ),
            Some(JsonValue::String(s)) => KeyPart::Text(s.clone()),
            Some(other) => KeyPart::Composite(other.to_string()),
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Missing => f.write_str("<missing>"),
            KeyPart::Null => f.write_str("null"),
            KeyPart::Bool(b) => write!(f, "{b}"),
            KeyPart::Number(n) | KeyPart::Text(n) | KeyPart::Composite(n) => f.write_str(n),
        }
    }
}

/// The identity of a group: one [`KeyPart`] per group-by path, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(Vec<KeyPart>);

impl GroupKey {
    /// Resolve every path on `record`.
    pub fn build(record: &JsonValue, paths: &[FieldPath]) -> Self {
        Self(
            paths
                .iter()
                .map(|path| KeyPart::from_value(path.resolve(record)))
                .collect(),
        )
    }

    /// The resolved parts, one per path.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Delimiter-joined form, for display and logging.
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Order groups by one aggregated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSort {
    /// An aggregated field path.
    pub field: FieldPath,
    /// Sort order.
    #[serde(default)]
    pub order: SortOrder,
}

/// What to group by and what to compute.
pub struct GroupSpec {
    group_by: Vec<FieldPath>,
    aggregations: IndexMap<FieldPath, AggregationKind>,
    sort_by: Option<AggregateSort>,
    pre_filter: Option<Box<dyn RecordPredicate + Send + Sync>>,
    missing_aggregate: MissingAggregate,
}

impl GroupSpec {
    /// Group by a single field path.
    pub fn by(path: impl Into<FieldPath>) -> Self {
        Self::with_paths(vec![path.into()])
    }

    /// Group by a composite key of several field paths.
    ///
    /// An empty list is an [`LensError::InputType`].
    pub fn by_all<I, P>(paths: I) -> LensResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        let group_by: Vec<FieldPath> = paths.into_iter().map(Into::into).collect();
        if group_by.is_empty() {
            return Err(LensError::input_type("groupBy requires at least one field"));
        }
        Ok(Self::with_paths(group_by))
    }

    fn with_paths(group_by: Vec<FieldPath>) -> Self {
        Self {
            group_by,
            aggregations: IndexMap::new(),
            sort_by: None,
            pre_filter: None,
            missing_aggregate: MissingAggregate::default(),
        }
    }

    /// Compute `kind` over `field` for every group.
    ///
    /// Each field carries one statistic; a later call for the same field
    /// replaces the earlier one.
    pub fn aggregate(mut self, field: impl Into<FieldPath>, kind: AggregationKind) -> Self {
        self.aggregations.insert(field.into(), kind);
        self
    }

    /// Like [`GroupSpec::aggregate`], with the kind given by name.
    pub fn aggregate_named(self, field: impl Into<FieldPath>, kind: &str) -> LensResult<Self> {
        let field = field.into();
        let kind = AggregationKind::parse(field.as_str(), kind)?;
        Ok(self.aggregate(field, kind))
    }

    /// Sort groups by the aggregate of `field`.
    pub fn sort_by(mut self, field: impl Into<FieldPath>, order: SortOrder) -> Self {
        self.sort_by = Some(AggregateSort {
            field: field.into(),
            order,
        });
        self
    }

    /// Drop records `predicate` rejects before grouping.
    pub fn pre_filter<P>(mut self, predicate: P) -> Self
    where
        P: RecordPredicate + Send + Sync + 'static,
    {
        self.pre_filter = Some(Box::new(predicate));
        self
    }

    /// Choose how `null` aggregates compare when sorting.
    pub fn missing_aggregate(mut self, missing: MissingAggregate) -> Self {
        self.missing_aggregate = missing;
        self
    }

    /// The group-by paths.
    pub fn group_by(&self) -> &[FieldPath] {
        &self.group_by
    }

    /// The requested aggregations, in request order.
    pub fn aggregations(&self) -> &IndexMap<FieldPath, AggregationKind> {
        &self.aggregations
    }

    /// Build a spec from its JSON form:
    ///
    /// ```json
    /// {
    ///   "groupBy": ["category", "location.city"],
    ///   "aggregations": {"price": "sum", "nights": "avg"},
    ///   "sortBy": {"field": "price", "order": "desc"},
    ///   "where": [{"gte": {"field": "price", "value": 100}}],
    ///   "missingAggregate": "last"
    /// }
    /// ```
    ///
    /// A missing or malformed `groupBy` is an [`LensError::InputType`]; an
    /// unknown aggregation kind is an [`LensError::UnknownAggregation`].
    pub fn from_json(value: &JsonValue) -> LensResult<Self> {
        let raw = RawGroupSpec::deserialize(value)?;

        let paths: Vec<String> = match raw.group_by {
            Some(JsonValue::String(path)) => vec![path],
            Some(JsonValue::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    JsonValue::String(path) => Ok(path),
                    other => Err(LensError::input_type(format!(
                        "groupBy entries must be strings, got {other}"
                    ))),
                })
                .collect::<LensResult<_>>()?,
            Some(other) => {
                return Err(LensError::input_type(format!(
                    "groupBy must be a string or list of strings, got {other}"
                )));
            }
            None => return Err(LensError::input_type("groupBy is required")),
        };

        let mut spec = Self::by_all(paths)?;
        for (field, kind) in raw.aggregations {
            spec = spec.aggregate_named(field, &kind)?;
        }
        if let Some(sort) = raw.sort_by {
            spec = spec.sort_by(sort.field, sort.order);
        }
        let mut filters = raw.filters;
        let pre_filter = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::and(filters)),
        };
        if let Some(filter) = pre_filter {
            spec = spec.pre_filter(filter);
        }
        if let Some(missing) = raw.missing_aggregate {
            spec = spec.missing_aggregate(missing);
        }
        Ok(spec)
    }

    fn validate(&self) -> LensResult<()> {
        if let Some(sort) = &self.sort_by {
            if !self.aggregations.contains_key(&sort.field) {
                return Err(LensError::UnknownAggregate {
                    field: sort.field.to_string(),
                });
            }
        }
        Ok(())
    }

    fn compare_groups(&self, sort: &AggregateSort, a: &Group<'_>, b: &Group<'_>) -> Ordering {
        let key = sort.field.as_str();
        let a = a.aggregates.get(key).copied().flatten();
        let b = b.aggregates.get(key).copied().flatten();
        match self.missing_aggregate {
            MissingAggregate::AsZero => sort
                .order
                .apply(a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0))),
            MissingAggregate::Last => match (a, b) {
                (Some(a), Some(b)) => sort.order.apply(a.total_cmp(&b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl fmt::Debug for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSpec")
            .field("group_by", &self.group_by)
            .field("aggregations", &self.aggregations)
            .field("sort_by", &self.sort_by)
            .field("pre_filter", &self.pre_filter.is_some())
            .field("missing_aggregate", &self.missing_aggregate)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroupSpec {
    group_by: Option<JsonValue>,
    #[serde(default)]
    aggregations: IndexMap<String, String>,
    sort_by: Option<AggregateSort>,
    #[serde(default, rename = "where")]
    filters: Vec<Filter>,
    missing_aggregate: Option<MissingAggregate>,
}

/// One output group.
///
/// Serializes as the identity fields flattened alongside `aggregates`,
/// `items` and `count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<'a> {
    /// Last path segment of each group-by path mapped to its resolved
    /// value (`null` when absent).
    ///
    /// Flattened into the serialized group, so a path ending in
    /// `aggregates`, `items` or `count` emits that key twice.
    #[serde(flatten)]
    pub identity: IndexMap<String, JsonValue>,
    /// Aggregated field path mapped to its statistic, `None` when no
    /// member had a numeric value.
    pub aggregates: IndexMap<String, Option<f64>>,
    /// Members in input order.
    pub items: Vec<&'a JsonValue>,
    /// Number of members.
    pub count: usize,
    #[serde(skip)]
    key: GroupKey,
}

impl Group<'_> {
    /// The key shared by every member.
    pub fn key(&self) -> &GroupKey {
        &self.key
    }
}

/// Runs group-and-aggregate pipelines.
pub struct GroupEngine;

impl GroupEngine {
    /// Group `records` according to `spec`.
    pub fn execute<'a>(spec: &GroupSpec, records: &'a [JsonValue]) -> LensResult<Vec<Group<'a>>> {
        spec.validate()?;

        let kept: Vec<&JsonValue> = match &spec.pre_filter {
            Some(predicate) => records.iter().filter(|r| predicate.test(r)).collect(),
            None => records.iter().collect(),
        };

        let mut partitions: IndexMap<GroupKey, Vec<&'a JsonValue>> = IndexMap::new();
        for record in kept {
            partitions
                .entry(GroupKey::build(record, &spec.group_by))
                .or_default()
                .push(record);
        }

        let mut groups: Vec<Group<'a>> = partitions
            .into_iter()
            .map(|(key, items)| Self::summarize(spec, key, items))
            .collect();

        if let Some(sort) = &spec.sort_by {
            groups.sort_by(|a, b| spec.compare_groups(sort, a, b));
        }

        tracing::debug!(
            "Grouped {} records into {} groups by [{}]",
            records.len(),
            groups.len(),
            spec.group_by
                .iter()
                .map(FieldPath::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(groups)
    }

    /// Group a JSON value that must be an array of records.
    pub fn execute_json<'a>(spec: &GroupSpec, records: &'a JsonValue) -> LensResult<Vec<Group<'a>>> {
        let records = records
            .as_array()
            .ok_or_else(|| LensError::input_type("records must be a JSON array"))?;
        Self::execute(spec, records)
    }

    fn summarize<'a>(spec: &GroupSpec, key: GroupKey, items: Vec<&'a JsonValue>) -> Group<'a> {
        let mut identity = IndexMap::with_capacity(spec.group_by.len());
        if let Some(first) = items.first() {
            for path in &spec.group_by {
                identity.insert(
                    path.last_segment().to_string(),
                    path.resolve(first).cloned().unwrap_or(JsonValue::Null),
                );
            }
        }

        let aggregates: IndexMap<String, Option<f64>> = spec
            .aggregations
            .iter()
            .map(|(field, kind)| (field.to_string(), kind.over_members(field, &items)))
            .collect();

        tracing::trace!("Group {} aggregates: {:?}", key, aggregates);

        Group {
            identity,
            aggregates,
            count: items.len(),
            items,
            key,
        }
    }
}
