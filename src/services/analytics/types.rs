use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Share of non-null values that must coerce for a column to take a kind.
pub const CLASSIFY_THRESHOLD: f64 = 0.7;
/// Line charts render at most this many leading points.
pub const CHART_POINT_LIMIT: usize = 50;
/// Category values are truncated to this many chars before grouping, so
/// near-duplicate long text collapses into one bucket.
pub const DISTRIBUTION_GROUP_WIDTH: usize = 100;
/// Display width for distribution legend labels.
pub const DISTRIBUTION_LABEL_WIDTH: usize = 40;
pub const DISTRIBUTION_MAX_ENTRIES: usize = 8;
/// Columns whose distinct/total ratio exceeds this are not categorical
/// (free text, IDs) and get no distribution.
pub const DISTRIBUTION_UNIQUE_RATIO: f64 = 0.5;
pub const DISTRIBUTION_UNIQUE_CAP: usize = 50;
/// Rows sampled into the digest payload.
pub const SAMPLE_SIZE: usize = 3;
/// Longest string field the digest will carry before truncation.
pub const DIGEST_FIELD_WIDTH: usize = 200;
pub const DIGEST_TRUNCATION_MARKER: &str = "... [truncated]";
/// Half-to-half mean changes below this percentage count as stable.
pub const TREND_STABLE_BAND: f64 = 5.0;
/// Deviations beyond this many population standard deviations are anomalies.
pub const ANOMALY_SIGMA: f64 = 2.0;

/// A single cell value. Columns are heterogeneous by design: a numeric
/// column may carry stray strings, and that is normal input, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

/// Display form doubles as the grouping/filtering string: nulls are empty,
/// whole numbers render without a trailing `.0`.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

pub type Row = BTreeMap<String, Scalar>;

/// An in-memory tabular dataset as supplied by an external parser.
/// The analytics engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Per-column type label. Total and mutually exclusive: every column with at
/// least one non-null value receives exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Date,
    Categorical,
}

/// Summary statistics for a numeric or date column. For date columns
/// `min`/`max` are epoch milliseconds and `avg`/`sum` are zeroed; averaging
/// timestamps is not meaningful and is never presented as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub sum: f64,
    pub count: usize,
    pub is_date: bool,
}

/// One point of a line-chart series, labeled `"Row N"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
}

/// One slice of a categorical column's frequency breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub date_columns: Vec<String>,
}

/// Full output of a single analysis run. Recomputed on demand; nothing is
/// cached between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetAnalysis {
    pub summary: DatasetSummary,
    pub statistics: BTreeMap<String, ColumnStatistics>,
    pub chart_series: BTreeMap<String, Vec<SeriesPoint>>,
    pub category_distribution: BTreeMap<String, Vec<CategoryShare>>,
}

/// Transient row predicate. Filtering is limited to a single active column
/// at a time by design.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub column: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub categories: Option<Vec<String>>,
}

/// Directional summary of a numeric sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Bounded dataset summary fed to the external insight narrator. Carries
/// aggregate statistics plus a fixed-size row sample; the full row set never
/// crosses this boundary regardless of dataset size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestPayload {
    pub dataset_name: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub statistics: BTreeMap<String, ColumnStatistics>,
    pub sample_rows: SmallVec<[Row; SAMPLE_SIZE]>,
}
