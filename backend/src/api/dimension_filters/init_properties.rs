use common::dashboard_config::DashboardConfig;
use futures::future::join_all;
use serde_json::Value;
use tracing::warn;

use crate::db_utils::mondrian_utils::QueryExecutor;

/// Fill `#property#` tokens in the data caveat text with values fetched at start-up.
///
/// Returns `None` when there is no caveat text. Properties whose query fails or yields no
/// value leave their token untouched.
pub async fn replace_property_placeholders<E: QueryExecutor>(
    executor: &E,
    config: &DashboardConfig,
) -> Option<String> {
    let mut text = config.data_caveat_text.clone()?;

    let fetches = config.init_properties.iter().map(|(name, property)| async move {
        let value = match executor.execute_query(&property.query, &config.connection, false).await {
            Ok(result) => result
                .values
                .first()
                .and_then(|row| row.get(&property.dimension))
                .and_then(property_text),
            Err(err) => {
                warn!("Property query for {} failed: {:#}", name, err);
                None
            }
        };
        (name, value)
    });

    for (name, value) in join_all(fetches).await {
        match value {
            Some(value) => text = text.replace(&format!("#{}#", name), &value),
            None => warn!("No value for property {}", name),
        }
    }
    Some(text)
}

fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
