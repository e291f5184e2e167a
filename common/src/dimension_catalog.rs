//! Filterable dimensions derived from the cube's schema discovery payload.

use serde::{Deserialize, Serialize};

use crate::filter_dimension::{DimensionOverride, FilterDimension};

const MEASURES_DIMENSION: &str = "Measures";
const ALL_LEVEL: &str = "(All)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredDimension {
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub hierarchies: Vec<DiscoveredHierarchy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredHierarchy {
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub levels: Vec<DiscoveredLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredLevel {
    pub name: String,
    pub unique_name: String,
    pub caption: String,
}

/// Parse the raw discovery JSON. Missing hierarchies or levels are an error.
pub fn parse_discovery_payload(json: &str) -> Result<Vec<DiscoveredDimension>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Query listing every member of a level without depending on any real measure.
pub fn membership_query(level_path: &str, cube: &str) -> String {
    format!(
        "WITH MEMBER Measures.Nul as Null SELECT {{[Measures].[Nul]}}*{{{}.Members}} ON COLUMNS FROM [{}]",
        level_path, cube
    )
}

/// One `FilterDimension` per real level, skipping the measures dimension and `(All)` levels.
pub fn build_filter_dimensions(
    discovered: &[DiscoveredDimension],
    connection: &str,
    cube: &str,
) -> Vec<FilterDimension> {
    discovered
        .iter()
        .filter(|dimension| dimension.name != MEASURES_DIMENSION)
        .flat_map(|dimension| dimension.hierarchies.iter())
        .flat_map(|hierarchy| hierarchy.levels.iter())
        .filter(|level| level.name != ALL_LEVEL)
        .map(|level| {
            FilterDimension::new(
                level.unique_name.clone(),
                level.caption.clone(),
                membership_query(&level.unique_name, cube),
                connection,
            )
        })
        .collect()
}

/// Apply every matching override. Overrides for unknown paths are ignored.
pub fn apply_overrides(dimensions: &mut [FilterDimension], overrides: &[DimensionOverride]) {
    for dimension in dimensions.iter_mut() {
        for dimension_override in overrides {
            dimension.update_from(dimension_override);
        }
    }
}

/// Drop dimensions whose path is configured as excluded.
pub fn remove_excluded<S: AsRef<str>>(dimensions: Vec<FilterDimension>, excluded: &[S]) -> Vec<FilterDimension> {
    dimensions
        .into_iter()
        .filter(|dimension| !excluded.iter().any(|e| e.as_ref() == dimension.path))
        .collect()
}

/// Full catalog step: discovered levels, then overrides, then exclusions.
pub fn build_catalog<S: AsRef<str>>(
    discovered: &[DiscoveredDimension],
    connection: &str,
    cube: &str,
    overrides: &[DimensionOverride],
    excluded: &[S],
) -> Vec<FilterDimension> {
    let mut dimensions = build_filter_dimensions(discovered, connection, cube);
    apply_overrides(&mut dimensions, overrides);
    remove_excluded(dimensions, excluded)
}
