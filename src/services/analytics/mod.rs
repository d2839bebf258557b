pub mod analyzer;
pub mod digest;
pub mod filter;
pub mod signals;
pub mod types;
pub mod utils;

pub use analyzer::{analyze_dataset, classify_column};
pub use digest::build_digest;
pub use filter::filter_rows;
pub use signals::{detect_anomalies, estimate_trend};
pub use types::{
    CategoryShare, ColumnKind, ColumnStatistics, Dataset, DatasetAnalysis, DatasetSummary,
    DigestPayload, FilterState, Row, Scalar, SeriesPoint, Trend,
};
