#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use backend::db_utils::mondrian_utils::{QueryExecutor, QueryResult};
use backend::db_utils::state_store::StateStore;
use common::dashboard_config::DashboardConfig;
use common::dimension_catalog::{membership_query, DiscoveredDimension};
use common::result_merge::Row;
use serde_json::{json, Value};

pub const CUBE: &str = "Warehouse";
pub const CONNECTION: &str = "foodmart";
pub const STATE_PATH: &str = "[Store].[Store State]";
pub const YEAR_PATH: &str = "[Time].[Year]";

/// Answers queries from a fixed table keyed by the exact query text.
#[derive(Default)]
pub struct FakeExecutor {
    discovery: Vec<DiscoveredDimension>,
    responses: HashMap<String, Vec<Row>>,
    failing: HashSet<String>,
    executed: Mutex<Vec<String>>,
}

impl FakeExecutor {
    pub fn new(discovery: Vec<DiscoveredDimension>) -> Self {
        Self {
            discovery,
            ..Default::default()
        }
    }

    pub fn respond(mut self, query: impl Into<String>, rows: Vec<Row>) -> Self {
        self.responses.insert(query.into(), rows);
        self
    }

    pub fn fail(mut self, query: impl Into<String>) -> Self {
        self.failing.insert(query.into());
        self
    }

    pub fn with_members(self, path: &str, members: &[&str]) -> Self {
        let rows = members.iter().map(|m| row(json!({ path: m, "Nul": null }))).collect();
        self.respond(membership_query(path, CUBE), rows)
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl QueryExecutor for FakeExecutor {
    async fn execute_query(&self, mdx: &str, _connection: &str, _simplify_names: bool) -> anyhow::Result<QueryResult> {
        self.executed.lock().unwrap().push(mdx.to_string());
        if self.failing.contains(mdx) {
            anyhow::bail!("Error: 500 Internal Server Error: {}", mdx);
        }
        match self.responses.get(mdx) {
            Some(values) => Ok(QueryResult { values: values.clone() }),
            None => anyhow::bail!("unexpected query: {}", mdx),
        }
    }

    async fn discover_dimensions(&self, _connection: &str, _cube: &str) -> anyhow::Result<Vec<DiscoveredDimension>> {
        Ok(self.discovery.clone())
    }
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

/// Measures plus store state and year levels, each under an `(All)` root.
pub fn warehouse_discovery() -> Vec<DiscoveredDimension> {
    serde_json::from_value(json!([
        {
            "name": "Measures",
            "hierarchies": [{
                "name": "Measures",
                "levels": [{"name": "MeasuresLevel", "uniqueName": "[Measures].[MeasuresLevel]", "caption": "Measures"}]
            }]
        },
        {
            "name": "Store",
            "hierarchies": [{
                "name": "Store",
                "levels": [
                    {"name": "(All)", "uniqueName": "[Store].[(All)]", "caption": "(All)"},
                    {"name": "Store State", "uniqueName": STATE_PATH, "caption": "Store State"}
                ]
            }]
        },
        {
            "name": "Time",
            "hierarchies": [{
                "name": "Time",
                "levels": [
                    {"name": "(All)", "uniqueName": "[Time].[(All)]", "caption": "(All)"},
                    {"name": "Year", "uniqueName": YEAR_PATH, "caption": "Year"}
                ]
            }]
        }
    ]))
    .unwrap()
}

pub fn warehouse_config() -> DashboardConfig {
    DashboardConfig {
        connection: CONNECTION.to_string(),
        cube: CUBE.to_string(),
        ..Default::default()
    }
}

/// Keeps the latest state per name and a log of every write.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every encoded write, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl StateStore for InMemoryStateStore {
    async fn load_encoded(&self, name: &str) -> anyhow::Result<Option<String>> {
        Ok(self.states.lock().unwrap().get(name).cloned())
    }

    async fn save_encoded(&self, name: &str, encoded: String) -> anyhow::Result<()> {
        self.states.lock().unwrap().insert(name.to_string(), encoded.clone());
        self.writes.lock().unwrap().push(encoded);
        Ok(())
    }
}
