//! Read-only dashboard configuration, as served by the config endpoint.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter_dimension::DimensionOverride;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub title: Option<DashboardTitle>,
    pub connection: String,
    pub cube: String,
    pub mondrian_rest_url: String,
    /// Label/query overrides for discovered dimensions.
    pub filter_dimensions: Vec<DimensionOverride>,
    /// Members initially selected per dimension path; unlisted members start deselected.
    pub default_selections: BTreeMap<String, Vec<String>>,
    pub excluded_dimensions: Vec<String>,
    pub init_properties: BTreeMap<String, InitProperty>,
    pub data_caveat_text: Option<String>,
    pub visualizations: BTreeMap<String, VisualizationConfig>,
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson(e.to_string()))
    }

    /// Initial flag of a freshly discovered member.
    pub fn default_selection(&self, dimension_path: &str, member: &str) -> bool {
        match self.default_selections.get(dimension_path) {
            Some(selected) => selected.iter().any(|m| m == member),
            None => true,
        }
    }

    pub fn visualization(&self, id: &str) -> Option<&VisualizationConfig> {
        self.visualizations.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashboardTitle {
    pub short: Option<String>,
    pub long: Option<String>,
}

/// A value fetched once at start-up and substituted into `#name#` tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitProperty {
    pub query: String,
    pub dimension: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    StackedBar,
    Heatmap,
}

impl ChartKind {
    /// Charts plotted against a primary and a secondary dimension.
    pub fn is_two_dimensional(self) -> bool {
        matches!(self, Self::StackedBar | Self::Heatmap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationConfig {
    pub viz_type: ChartKind,
    pub query: String,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub x_dimension: Option<String>,
    #[serde(default)]
    pub y_dimension: Option<String>,
    /// Second query joined onto the first, e.g. a denominator series.
    #[serde(default)]
    pub secondary_query: Option<String>,
    /// Key fields shared by both queries' rows.
    #[serde(default)]
    pub join_fields: Vec<String>,
    /// Fields copied from the secondary rows.
    #[serde(default)]
    pub merge_fields: Vec<String>,
    /// Filter dimensions this chart ignores.
    #[serde(default)]
    pub unfiltered_dimensions: Vec<String>,
}

impl VisualizationConfig {
    /// The secondary dimension of a two-dimensional chart. Its absence is a configuration bug.
    pub fn required_y_dimension(&self) -> Result<&str, ConfigError> {
        match self.y_dimension.as_deref() {
            Some(y) if !y.is_empty() => Ok(y),
            _ => Err(ConfigError::MissingSecondaryDimension {
                viz_type: self.viz_type,
            }),
        }
    }

    pub fn is_two_dimensional(&self) -> bool {
        self.viz_type.is_two_dimensional()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidJson(String),
    MissingSecondaryDimension { viz_type: ChartKind },
    UnknownVisualization(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "Invalid dashboard configuration: {}", err),
            Self::MissingSecondaryDimension { viz_type } => write!(
                f,
                "Error in configuration: {:?} chart requires a y dimension but none is configured",
                viz_type
            ),
            Self::UnknownVisualization(id) => write!(f, "Error in configuration: no visualization named {}", id),
        }
    }
}

impl std::error::Error for ConfigError {}
