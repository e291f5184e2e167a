use std::future::Future;

use common::dimension_catalog::DiscoveredDimension;
use common::result_merge::Row;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Tidy result set: one flat record per cell tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryResult {
    #[serde(default)]
    pub values: Vec<Row>,
}

/// Runs query text against the cube backend.
pub trait QueryExecutor {
    fn execute_query(
        &self,
        mdx: &str,
        connection: &str,
        simplify_names: bool,
    ) -> impl Future<Output = anyhow::Result<QueryResult>> + Send;

    /// Dimensions, hierarchies and levels of a cube.
    fn discover_dimensions(
        &self,
        connection: &str,
        cube: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<DiscoveredDimension>>> + Send;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MondrianQueryRequest<'a> {
    connection_name: &'a str,
    query: &'a str,
    tidy: TidyOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TidyOptions {
    enabled: bool,
    simplify_names: bool,
}

/// Client for a mondrian-rest style HTTP endpoint.
#[derive(Debug, Clone)]
pub struct MondrianRestClient {
    base_url: String,
    client: reqwest::Client,
}

impl MondrianRestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl QueryExecutor for MondrianRestClient {
    async fn execute_query(&self, mdx: &str, connection: &str, simplify_names: bool) -> anyhow::Result<QueryResult> {
        let request = MondrianQueryRequest {
            connection_name: connection,
            query: mdx,
            tidy: TidyOptions { enabled: true, simplify_names },
        };
        let body = serde_json::to_string(&request)?;
        let t0 = std::time::Instant::now();

        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let response_txt = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            anyhow::bail!("Error: {}: {}", status, response_txt);
        }
        let dt_ms = t0.elapsed().as_millis() as u32;
        info!("QUERY RESPONSE: len = {} ({}ms, query len = {})", response_txt.len(), dt_ms, mdx.len());

        let result: QueryResult = serde_json::from_str(&response_txt)?;
        Ok(result)
    }

    async fn discover_dimensions(&self, connection: &str, cube: &str) -> anyhow::Result<Vec<DiscoveredDimension>> {
        let response = self
            .client
            .get(format!("{}/getDimensions", self.base_url))
            .query(&[("connectionName", connection), ("cube", cube)])
            .send()
            .await?;
        let status = response.status();
        let response_txt = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            anyhow::bail!("Error: {}: {}", status, response_txt);
        }
        let dimensions = common::dimension_catalog::parse_discovery_payload(&response_txt)?;
        info!("Discovered {} dimensions in cube {}", dimensions.len(), cube);
        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_backend_field_names() {
        let request = MondrianQueryRequest {
            connection_name: "foodmart",
            query: "SELECT 1",
            tidy: TidyOptions { enabled: true, simplify_names: false },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "connectionName": "foodmart",
                "query": "SELECT 1",
                "tidy": {"enabled": true, "simplifyNames": false},
            })
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(MondrianRestClient::new("http://localhost:8080/rest/").base_url(), "http://localhost:8080/rest");
    }

    #[test]
    fn missing_values_parse_as_empty() {
        let result: QueryResult = serde_json::from_str("{}").unwrap();
        assert!(result.values.is_empty());
    }
}
