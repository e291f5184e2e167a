//! Builds the filter model for a session: discover, build the catalog, fetch every member list.

use common::{
    dashboard_config::DashboardConfig,
    dimension_catalog::build_catalog,
    dimension_filter_model::DimensionFilterModel,
    filter_dimension::FilterDimension,
    member_selection::MemberSelectionSet,
    result_merge::Row,
};
use futures::future::join_all;
use serde_json::Value;
use tracing::{info, warn};

use crate::db_utils::mondrian_utils::QueryExecutor;

/// Discover the cube's dimensions and load every filterable one with its members.
///
/// Discovery errors propagate. A failed or empty membership query only leaves that one
/// dimension without members, which makes it an unfiltered no-op.
pub async fn populate_dimension_filter_model<E: QueryExecutor>(
    executor: &E,
    config: &DashboardConfig,
) -> anyhow::Result<DimensionFilterModel> {
    let discovered = executor.discover_dimensions(&config.connection, &config.cube).await?;
    let catalog = build_catalog(
        &discovered,
        &config.connection,
        &config.cube,
        &config.filter_dimensions,
        &config.excluded_dimensions,
    );

    // all membership queries in flight at once; the model is ready when every one resolved
    let selections = join_all(
        catalog
            .iter()
            .map(|dimension| load_member_selection(executor, config, dimension)),
    )
    .await;

    let mut model = DimensionFilterModel::new();
    for (dimension, selection) in catalog.into_iter().zip(selections) {
        if let Err(err) = model.add_dimension_levels(dimension, selection) {
            warn!("Skipping dimension: {}", err);
        }
    }
    info!("Filter model ready with {} dimensions", model.len());
    Ok(model)
}

async fn load_member_selection<E: QueryExecutor>(
    executor: &E,
    config: &DashboardConfig,
    dimension: &FilterDimension,
) -> MemberSelectionSet {
    match executor
        .execute_query(&dimension.membership_query, &dimension.connection, false)
        .await
    {
        Ok(result) => {
            let selection = member_selection_from_rows(&result.values, &dimension.path, |member| {
                config.default_selection(&dimension.path, member)
            });
            if selection.is_empty() {
                warn!("Membership query for {} returned no members", dimension.path);
            }
            selection
        }
        Err(err) => {
            warn!("Membership query for {} failed: {:#}", dimension.path, err);
            MemberSelectionSet::new()
        }
    }
}

/// Read each row's value for the dimension path as a member key.
///
/// Rows without a usable value are skipped; numbers are keyed by their text.
pub fn member_selection_from_rows(
    rows: &[Row],
    dimension_path: &str,
    default_selection: impl Fn(&str) -> bool,
) -> MemberSelectionSet {
    let mut selection = MemberSelectionSet::new();
    for row in rows {
        let member = match row.get(dimension_path) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        if selection.contains(&member) {
            continue;
        }
        let included = default_selection(&member);
        selection.insert(member, included);
    }
    selection
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_members_from_the_path_field() {
        let rows: Vec<Row> = vec![
            json!({"[Time].[Year]": "2019", "Nul": null}),
            json!({"[Time].[Year]": 2020}),
            json!({"[Time].[Year]": "2019"}),
            json!({"other": "x"}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let selection = member_selection_from_rows(&rows, "[Time].[Year]", |m| m != "2019");

        assert_eq!(selection.members().collect::<Vec<_>>(), vec!["2019", "2020"]);
        assert_eq!(selection.get("2019"), Some(false));
        assert_eq!(selection.get("2020"), Some(true));
    }
}
