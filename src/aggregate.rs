/// Per-group aggregate statistics.
///
/// Aggregates only look at members whose field resolves to a JSON number.
/// Absent fields, strings, booleans and nulls are skipped, and a group with
/// no numeric values at all yields `None` (serialized as `null`) for every
/// kind, `count` included.
///
/// Note that [`AggregationKind::Count`] counts numeric resolutions, not
/// members: a group of five records where two lack `price` has a `price`
/// count of three.
use crate::error::{LensError, LensResult};
use crate::path::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// The closed set of supported statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    /// Arithmetic total.
    Sum,
    /// Arithmetic mean.
    Avg,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Number of numeric values.
    Count,
}

impl AggregationKind {
    /// All kinds, in declaration order.
    pub const ALL: [AggregationKind; 5] = [
        AggregationKind::Sum,
        AggregationKind::Avg,
        AggregationKind::Min,
        AggregationKind::Max,
        AggregationKind::Count,
    ];

    /// Parse a kind requested for `field`.
    ///
    /// Names are the lowercase forms used in JSON; anything else, including
    /// `"Sum"`, is a configuration error naming both the field and the kind.
    pub fn parse(field: &str, kind: &str) -> LensResult<Self> {
        match kind {
            "sum" => Ok(Self::Sum),
            "avg" => Ok(Self::Avg),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" => Ok(Self::Count),
            _ => Err(LensError::UnknownAggregation {
                field: field.to_string(),
                kind: kind.to_string(),
            }),
        }
    }

    /// Lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
        }
    }

    /// Compute this statistic over `values`.
    pub fn compute<I>(&self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let acc = values.into_iter().fold(Accumulator::default(), Accumulator::push);
        acc.finish(*self)
    }

    /// Resolve `field` on each member and compute this statistic over the
    /// numeric resolutions.
    pub fn over_members(&self, field: &FieldPath, members: &[&JsonValue]) -> Option<f64> {
        self.compute(members.iter().filter_map(|m| field.resolve_number(m)))
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running totals for a single pass over the numeric values.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn push(mut self, value: f64) -> Self {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self
    }

    fn finish(self, kind: AggregationKind) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        match kind {
            AggregationKind::Sum => Some(self.sum),
            AggregationKind::Avg => Some(self.sum / self.count as f64),
            AggregationKind::Min => self.min,
            AggregationKind::Max => self.max,
            AggregationKind::Count => Some(self.count as f64),
        }
    }
}
