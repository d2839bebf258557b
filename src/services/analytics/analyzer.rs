use std::collections::{BTreeMap, HashMap};

use super::types::*;
use super::utils::{parse_number, scalar_date_millis, truncate_with};

/// Classifies every column and computes the aggregates that hang off each
/// kind: statistics and chart series for numeric columns, min/max timestamps
/// for date columns, frequency distributions for categorical ones.
///
/// Columns with zero non-null values are skipped entirely. A column takes a
/// kind when strictly more than 70% of its non-null values coerce; the
/// numeric check runs before the date check, so all-digit columns (years,
/// codes) classify as numeric rather than leaking into a loose date parse.
pub fn analyze_dataset(dataset: &Dataset) -> DatasetAnalysis {
    let mut numeric_columns = Vec::new();
    let mut text_columns = Vec::new();
    let mut date_columns = Vec::new();
    let mut statistics = BTreeMap::new();
    let mut chart_series = BTreeMap::new();
    let mut category_distribution = BTreeMap::new();

    for header in &dataset.headers {
        let values: Vec<&Scalar> = dataset
            .rows
            .iter()
            .filter_map(|row| row.get(header))
            .filter(|value| !value.is_null())
            .collect();

        match classify_column(&values) {
            None => continue,
            Some(ColumnKind::Numeric) => {
                let numbers: Vec<f64> =
                    values.iter().filter_map(|v| parse_number(v)).collect();
                numeric_columns.push(header.clone());
                if let Some(stats) = numeric_statistics(&numbers) {
                    statistics.insert(header.clone(), stats);
                }
                chart_series.insert(header.clone(), build_chart_series(&numbers));
            }
            Some(ColumnKind::Date) => {
                let timestamps: Vec<i64> =
                    values.iter().filter_map(|v| scalar_date_millis(v)).collect();
                date_columns.push(header.clone());
                if let Some(stats) = date_statistics(&timestamps) {
                    statistics.insert(header.clone(), stats);
                }
            }
            Some(ColumnKind::Categorical) => {
                text_columns.push(header.clone());
                if let Some(shares) = build_distribution(&values) {
                    category_distribution.insert(header.clone(), shares);
                }
            }
        }
    }

    DatasetAnalysis {
        summary: DatasetSummary {
            total_rows: dataset.rows.len(),
            total_columns: dataset.headers.len(),
            numeric_columns,
            text_columns,
            date_columns,
        },
        statistics,
        chart_series,
        category_distribution,
    }
}

/// Classification alone, without aggregates. `None` means the column had no
/// non-null values and is excluded downstream.
pub fn classify_column(values: &[&Scalar]) -> Option<ColumnKind> {
    if values.is_empty() {
        return None;
    }

    let threshold = values.len() as f64 * CLASSIFY_THRESHOLD;

    let numeric = values.iter().filter(|v| parse_number(v).is_some()).count();
    if numeric as f64 > threshold {
        return Some(ColumnKind::Numeric);
    }

    let dates = values.iter().filter(|v| scalar_date_millis(v).is_some()).count();
    if dates as f64 > threshold {
        return Some(ColumnKind::Date);
    }

    Some(ColumnKind::Categorical)
}

/// Count is the length of the successfully-parsed subsequence, never the
/// raw column length.
fn numeric_statistics(values: &[f64]) -> Option<ColumnStatistics> {
    if values.is_empty() {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
        sum += value;
    }

    Some(ColumnStatistics {
        min,
        max,
        avg: sum / values.len() as f64,
        sum,
        count: values.len(),
        is_date: false,
    })
}

fn date_statistics(timestamps: &[i64]) -> Option<ColumnStatistics> {
    let min = *timestamps.iter().min()?;
    let max = *timestamps.iter().max()?;

    Some(ColumnStatistics {
        min: min as f64,
        max: max as f64,
        // averaging timestamps is meaningless, flagged via is_date
        avg: 0.0,
        sum: 0.0,
        count: timestamps.len(),
        is_date: true,
    })
}

/// First 50 points of the parsed numeric sequence. Rows whose value failed
/// to parse are invisible here, so indices shift past them.
fn build_chart_series(values: &[f64]) -> Vec<SeriesPoint> {
    values
        .iter()
        .take(CHART_POINT_LIMIT)
        .enumerate()
        .map(|(idx, &value)| SeriesPoint {
            name: format!("Row {}", idx + 1),
            value,
        })
        .collect()
}

/// Frequency breakdown of a categorical column, or `None` when the column
/// has too many distinct values to be usefully categorical.
///
/// Two separate truncation stages: values are cut to 100 chars before
/// grouping (collapses near-duplicate long text), and legend names are cut
/// to 40 chars after. Ties in frequency keep first-seen order via a stable
/// sort.
fn build_distribution(values: &[&Scalar]) -> Option<Vec<CategoryShare>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for value in values {
        let key = truncate_with(&value.to_string(), DISTRIBUTION_GROUP_WIDTH, "...");
        match counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                counts.insert(key.clone(), 1);
                first_seen.push(key);
            }
        }
    }

    let unique_ratio = counts.len() as f64 / values.len() as f64;
    if unique_ratio > DISTRIBUTION_UNIQUE_RATIO || counts.len() > DISTRIBUTION_UNIQUE_CAP {
        return None;
    }

    let total = values.len() as f64;
    let mut shares: Vec<CategoryShare> = first_seen
        .into_iter()
        .map(|name| {
            let count = counts[&name];
            CategoryShare {
                name: truncate_with(&name, DISTRIBUTION_LABEL_WIDTH, "..."),
                value: count,
                // against the full value count, before the top-8 cut
                percentage: count as f64 / total * 100.0,
            }
        })
        .collect();

    shares.sort_by(|a, b| b.value.cmp(&a.value));
    shares.truncate(DISTRIBUTION_MAX_ENTRIES);
    Some(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Scalar {
        Scalar::Number(n)
    }

    fn text(s: &str) -> Scalar {
        Scalar::Text(s.to_string())
    }

    fn dataset(headers: &[&str], rows: Vec<Vec<Scalar>>) -> Dataset {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|cells| headers.iter().cloned().zip(cells).collect())
            .collect();
        Dataset {
            name: "test".to_string(),
            headers,
            rows,
        }
    }

    #[test]
    fn classifier_boundary_is_strict() {
        // 69 of 100 numeric: below threshold, categorical
        let mut below: Vec<Scalar> = (0..69).map(|i| num(i as f64)).collect();
        below.extend((0..31).map(|_| text("x")));
        let refs: Vec<&Scalar> = below.iter().collect();
        assert_eq!(classify_column(&refs), Some(ColumnKind::Categorical));

        // 71 of 100 numeric: above threshold, numeric
        let mut above: Vec<Scalar> = (0..71).map(|i| num(i as f64)).collect();
        above.extend((0..29).map(|_| text("x")));
        let refs: Vec<&Scalar> = above.iter().collect();
        assert_eq!(classify_column(&refs), Some(ColumnKind::Numeric));

        // exactly 70 of 100: strictly-greater check keeps it out of numeric
        let mut exact: Vec<Scalar> = (0..70).map(|i| num(i as f64)).collect();
        exact.extend((0..30).map(|_| text("x")));
        let refs: Vec<&Scalar> = exact.iter().collect();
        assert_eq!(classify_column(&refs), Some(ColumnKind::Categorical));
    }

    #[test]
    fn date_columns_classify_after_the_numeric_check() {
        let values = vec![
            text("2024-01-01"),
            text("2024-02-01"),
            text("2024-03-01"),
            text("banana"),
        ];
        let refs: Vec<&Scalar> = values.iter().collect();
        assert_eq!(classify_column(&refs), Some(ColumnKind::Date));

        // all-digit year strings parse as numbers first
        let years = vec![text("2021"), text("2022"), text("2023")];
        let refs: Vec<&Scalar> = years.iter().collect();
        assert_eq!(classify_column(&refs), Some(ColumnKind::Numeric));
    }

    #[test]
    fn empty_column_is_skipped() {
        assert_eq!(classify_column(&[]), None);

        let ds = dataset(
            &["a", "b"],
            vec![
                vec![num(1.0), Scalar::Null],
                vec![num(2.0), Scalar::Null],
            ],
        );
        let analysis = analyze_dataset(&ds);
        assert_eq!(analysis.summary.numeric_columns, vec!["a".to_string()]);
        assert!(analysis.summary.text_columns.is_empty());
        assert!(analysis.summary.date_columns.is_empty());
        assert!(!analysis.statistics.contains_key("b"));
    }

    #[test]
    fn numeric_statistics_match_parsed_values() {
        let ds = dataset(
            &["price"],
            vec![
                vec![num(10.0)],
                vec![num(20.0)],
                vec![text("30")],
                vec![text("bad")],
            ],
        );
        let analysis = analyze_dataset(&ds);
        let stats = &analysis.statistics["price"];
        // parse failures are excluded from count, not counted as zero
        assert_eq!(stats.count, 3);
        assert!((stats.sum - 60.0).abs() < 1e-9);
        assert!((stats.avg - 20.0).abs() < 1e-9);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert!(!stats.is_date);
    }

    #[test]
    fn date_statistics_use_epoch_millis_and_void_avg_sum() {
        let ds = dataset(
            &["when"],
            vec![
                vec![text("1970-01-01")],
                vec![text("1970-01-03")],
                vec![text("1970-01-02")],
            ],
        );
        let analysis = analyze_dataset(&ds);
        assert_eq!(analysis.summary.date_columns, vec!["when".to_string()]);
        let stats = &analysis.statistics["when"];
        assert!(stats.is_date);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 172_800_000.0);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.avg, 0.0);
        assert_eq!(stats.sum, 0.0);
    }

    #[test]
    fn chart_series_is_bounded_and_gap_free() {
        let rows: Vec<Vec<Scalar>> = (0..80).map(|i| vec![num(i as f64)]).collect();
        let ds = dataset(&["v"], rows);
        let analysis = analyze_dataset(&ds);
        let series = &analysis.chart_series["v"];
        assert_eq!(series.len(), CHART_POINT_LIMIT);
        for (idx, point) in series.iter().enumerate() {
            assert_eq!(point.name, format!("Row {}", idx + 1));
            assert_eq!(point.value, idx as f64);
        }
    }

    #[test]
    fn chart_series_indexes_the_parsed_sequence() {
        let ds = dataset(
            &["v"],
            vec![
                vec![num(1.0)],
                vec![text("bad")],
                vec![num(3.0)],
                vec![num(4.0)],
            ],
        );
        let analysis = analyze_dataset(&ds);
        let series = &analysis.chart_series["v"];
        // the failed parse is invisible, later values shift forward
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].name, "Row 2");
        assert_eq!(series[1].value, 3.0);
    }

    #[test]
    fn distribution_sorted_descending_with_full_set_percentages() {
        let mut rows = Vec::new();
        for _ in 0..5 {
            rows.push(vec![text("A")]);
        }
        for _ in 0..3 {
            rows.push(vec![text("B")]);
        }
        for _ in 0..2 {
            rows.push(vec![text("C")]);
        }
        let ds = dataset(&["cat"], rows);
        let analysis = analyze_dataset(&ds);
        let shares = &analysis.category_distribution["cat"];

        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].name, "A");
        assert_eq!(shares[0].value, 5);
        assert_eq!(shares[1].value, 3);
        assert_eq!(shares[2].value, 2);

        let total_pct: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_truncates_to_top_eight_with_stable_ties() {
        let mut rows = Vec::new();
        // ten categories, each appearing three times: all tied
        for _ in 0..3 {
            for c in 0..10 {
                rows.push(vec![text(&format!("cat{}", c))]);
            }
        }
        let ds = dataset(&["cat"], rows);
        let analysis = analyze_dataset(&ds);
        let shares = &analysis.category_distribution["cat"];

        assert_eq!(shares.len(), DISTRIBUTION_MAX_ENTRIES);
        // stable sort keeps first-seen order on equal frequencies
        for (idx, share) in shares.iter().enumerate() {
            assert_eq!(share.name, format!("cat{}", idx));
            // percentage computed against all 30 values, not the top 8
            assert!((share.percentage - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn high_cardinality_columns_get_no_distribution() {
        let rows: Vec<Vec<Scalar>> = (0..100)
            .map(|i| vec![text(&format!("unique-{}", i))])
            .collect();
        let ds = dataset(&["id"], rows);
        let analysis = analyze_dataset(&ds);
        assert_eq!(analysis.summary.text_columns, vec!["id".to_string()]);
        assert!(analysis.category_distribution.is_empty());
    }

    #[test]
    fn long_values_group_before_display_truncation() {
        let long_a = "x".repeat(150);
        let long_b = format!("{}{}", "x".repeat(100), "different tail");
        let rows = vec![
            vec![text(&long_a)],
            vec![text(&long_b)],
            vec![text(&long_a)],
            vec![text("short")],
        ];
        let ds = dataset(&["desc"], rows);
        let analysis = analyze_dataset(&ds);
        let shares = &analysis.category_distribution["desc"];

        // both long strings share the first 100 chars, so they collapse
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].value, 3);
        // legend label is display-truncated separately
        assert_eq!(shares[0].name, format!("{}...", "x".repeat(40)));
    }

    #[test]
    fn end_to_end_mixed_dataset() {
        let ds = dataset(
            &["price", "category"],
            vec![
                vec![num(10.0), text("A")],
                vec![num(20.0), text("B")],
                vec![num(30.0), text("A")],
                vec![text("bad"), text("B")],
            ],
        );
        let analysis = analyze_dataset(&ds);

        // 3 of 4 parse (0.75 > 0.7), so price is numeric
        assert_eq!(analysis.summary.numeric_columns, vec!["price".to_string()]);
        assert_eq!(analysis.summary.text_columns, vec!["category".to_string()]);
        assert_eq!(analysis.summary.total_rows, 4);
        assert_eq!(analysis.summary.total_columns, 2);

        let stats = &analysis.statistics["price"];
        assert_eq!(stats.count, 3);
        assert!((stats.sum - 60.0).abs() < 1e-9);

        let shares = &analysis.category_distribution["category"];
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].value, 2);
        assert_eq!(shares[1].value, 2);
    }

    #[test]
    fn empty_dataset_yields_empty_outputs() {
        let ds = Dataset {
            name: "empty".to_string(),
            headers: vec!["a".to_string()],
            rows: Vec::new(),
        };
        let analysis = analyze_dataset(&ds);
        assert_eq!(analysis.summary.total_rows, 0);
        assert!(analysis.statistics.is_empty());
        assert!(analysis.chart_series.is_empty());
        assert!(analysis.category_distribution.is_empty());
    }
}
