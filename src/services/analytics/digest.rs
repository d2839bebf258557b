use super::types::{
    Dataset, DatasetAnalysis, DigestPayload, Row, Scalar, DIGEST_FIELD_WIDTH,
    DIGEST_TRUNCATION_MARKER, SAMPLE_SIZE,
};
use super::utils::truncate_with;

/// Assembles the bounded payload handed to the external insight narrator:
/// aggregate statistics plus the first few rows, with every oversized string
/// field truncated. The full row set never crosses this boundary.
pub fn build_digest(dataset: &Dataset, analysis: &DatasetAnalysis) -> DigestPayload {
    let sample_rows = dataset
        .rows
        .iter()
        .take(SAMPLE_SIZE)
        .map(truncate_row)
        .collect();

    DigestPayload {
        dataset_name: dataset.name.clone(),
        total_rows: analysis.summary.total_rows,
        total_columns: analysis.summary.total_columns,
        numeric_columns: analysis.summary.numeric_columns.clone(),
        text_columns: analysis.summary.text_columns.clone(),
        date_columns: analysis.summary.date_columns.clone(),
        statistics: analysis.statistics.clone(),
        sample_rows,
    }
}

fn truncate_row(row: &Row) -> Row {
    row.iter()
        .map(|(key, value)| {
            let value = match value {
                Scalar::Text(s) if s.chars().count() > DIGEST_FIELD_WIDTH => Scalar::Text(
                    truncate_with(s, DIGEST_FIELD_WIDTH, DIGEST_TRUNCATION_MARKER),
                ),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}
