use super::types::{FilterState, Row};
use super::utils::parse_number;

/// Applies a transient filter over raw rows, producing a new sequence; the
/// input is never mutated. With no active predicate every row passes.
///
/// Numeric range: the cell is coerced to a number and kept when it lies in
/// `[min, max]` inclusive; cells that fail coercion are dropped. Category
/// allow-list: the cell's display string must be a member. Both predicates
/// target the single active column.
pub fn filter_rows(rows: &[Row], filters: &FilterState) -> Vec<Row> {
    let mut filtered: Vec<Row> = rows.to_vec();

    if let (Some(column), Some(min), Some(max)) =
        (&filters.column, filters.min_value, filters.max_value)
    {
        filtered.retain(|row| {
            row.get(column)
                .and_then(parse_number)
                .map_or(false, |value| value >= min && value <= max)
        });
    }

    if let Some(column) = &filters.column {
        if let Some(categories) = filters.categories.as_deref().filter(|c| !c.is_empty()) {
            filtered.retain(|row| {
                let value = row
                    .get(column)
                    .map(|cell| cell.to_string())
                    .unwrap_or_default();
                categories.iter().any(|category| *category == value)
            });
        }
    }

    filtered
}
