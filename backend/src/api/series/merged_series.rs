use common::{
    dimension_filter_model::DimensionFilterModel,
    result_merge::{outer_join, Row},
};
use serde_json::{Number, Value};

use crate::db_utils::mondrian_utils::QueryExecutor;

/// Two queries whose results are joined row by row, e.g. a count and its total.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSeriesRequest {
    pub primary_query: String,
    pub secondary_query: String,
    pub connection: String,
    pub key_fields: Vec<String>,
    pub merge_fields: Vec<String>,
    /// Filter dimensions left unfiltered for both queries.
    pub unfiltered_dimensions: Vec<String>,
}

/// Filter both queries, run them concurrently and left-join the secondary rows onto the primary.
pub async fn fetch_merged_series<E: QueryExecutor>(
    executor: &E,
    model: &DimensionFilterModel,
    request: &MergedSeriesRequest,
) -> anyhow::Result<Vec<Row>> {
    let primary_query = model.filter_query(&request.primary_query, &request.unfiltered_dimensions);
    let secondary_query = model.filter_query(&request.secondary_query, &request.unfiltered_dimensions);

    let (primary, secondary) = futures::try_join!(
        executor.execute_query(&primary_query, &request.connection, false),
        executor.execute_query(&secondary_query, &request.connection, false),
    )?;

    Ok(outer_join(
        &primary.values,
        &secondary.values,
        &request.key_fields,
        &request.merge_fields,
    ))
}

/// Add `ratio_field = numerator / denominator` to every row; `null` when it cannot be computed.
pub fn with_ratio(rows: Vec<Row>, numerator: &str, denominator: &str, ratio_field: &str) -> Vec<Row> {
    rows.into_iter()
        .map(|mut row| {
            let n = row.get(numerator).and_then(Value::as_f64);
            let d = row.get(denominator).and_then(Value::as_f64);
            let ratio = match (n, d) {
                (Some(n), Some(d)) if d != 0.0 => Number::from_f64(n / d).map(Value::Number).unwrap_or(Value::Null),
                _ => Value::Null,
            };
            row.insert(ratio_field.to_string(), ratio);
            row
        })
        .collect()
}
