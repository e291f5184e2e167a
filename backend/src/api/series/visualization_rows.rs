use common::{
    dashboard_config::{ConfigError, DashboardConfig, VisualizationConfig},
    dimension_filter_model::DimensionFilterModel,
    result_merge::Row,
};
use serde_json::Value;

use crate::api::series::merged_series::{fetch_merged_series, MergedSeriesRequest};
use crate::db_utils::mondrian_utils::QueryExecutor;

/// Filtered rows for a configured chart, keeping only rows that carry its axis fields.
pub async fn fetch_visualization_rows<E: QueryExecutor>(
    executor: &E,
    model: &DimensionFilterModel,
    config: &DashboardConfig,
    viz_id: &str,
) -> anyhow::Result<Vec<Row>> {
    let viz = config
        .visualization(viz_id)
        .ok_or_else(|| ConfigError::UnknownVisualization(viz_id.to_string()))?;
    if viz.is_two_dimensional() {
        return fetch_two_dimensional_rows(executor, model, config, viz).await;
    }

    let connection = viz.connection.as_deref().unwrap_or(&config.connection);
    let rows = match &viz.secondary_query {
        Some(secondary_query) => {
            let key_fields = if viz.join_fields.is_empty() {
                viz.x_dimension.iter().cloned().collect()
            } else {
                viz.join_fields.clone()
            };
            let request = MergedSeriesRequest {
                primary_query: viz.query.clone(),
                secondary_query: secondary_query.clone(),
                connection: connection.to_string(),
                key_fields,
                merge_fields: viz.merge_fields.clone(),
                unfiltered_dimensions: viz.unfiltered_dimensions.clone(),
            };
            fetch_merged_series(executor, model, &request).await?
        }
        None => {
            let mdx = model.filter_query(&viz.query, &viz.unfiltered_dimensions);
            executor.execute_query(&mdx, connection, false).await?.values
        }
    };

    let axis_fields: Vec<&str> = viz.x_dimension.iter().map(String::as_str).collect();
    Ok(retain_rows_with(rows, &axis_fields))
}

/// Rows for a chart plotted against two dimensions.
///
/// The secondary dimension is mandatory; a chart configured without one fails before any
/// query is issued.
pub async fn fetch_two_dimensional_rows<E: QueryExecutor>(
    executor: &E,
    model: &DimensionFilterModel,
    config: &DashboardConfig,
    viz: &VisualizationConfig,
) -> anyhow::Result<Vec<Row>> {
    let y_dimension = viz.required_y_dimension()?;
    let connection = viz.connection.as_deref().unwrap_or(&config.connection);
    let mdx = model.filter_query(&viz.query, &viz.unfiltered_dimensions);
    let rows = executor.execute_query(&mdx, connection, false).await?.values;

    let mut axis_fields = vec![y_dimension];
    if let Some(x_dimension) = viz.x_dimension.as_deref() {
        axis_fields.push(x_dimension);
    }
    Ok(retain_rows_with(rows, &axis_fields))
}

fn retain_rows_with(mut rows: Vec<Row>, fields: &[&str]) -> Vec<Row> {
    rows.retain(|row| {
        fields
            .iter()
            .all(|field| !matches!(row.get(*field), None | Some(Value::Null)))
    });
    rows
}
