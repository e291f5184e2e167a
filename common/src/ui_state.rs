//! Dashboard UI state persisted between sessions.

use serde::{Deserialize, Serialize};

use crate::dimension_filter_model::DimensionFilterModel;
use crate::encoded_state::{EncodedState, StateCodecError};

/// Bumped whenever the persisted layout changes incompatibly.
pub const CURRENT_STATE_VERSION: u32 = 2;

pub const DEFAULT_STATE_NAME: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInterfaceState {
    #[serde(default)]
    pub version: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub widget_state_grid: Vec<Vec<WidgetState>>,
    #[serde(default)]
    pub dimension_filter_model: Option<DimensionFilterModel>,
}

impl Default for UserInterfaceState {
    fn default() -> Self {
        Self {
            version: Some(CURRENT_STATE_VERSION),
            name: DEFAULT_STATE_NAME.to_string(),
            widget_state_grid: Vec::new(),
            dimension_filter_model: None,
        }
    }
}

impl UserInterfaceState {
    /// State written by an older build, or one without a marker, cannot be trusted.
    pub fn is_compatible(&self) -> bool {
        matches!(self.version, Some(v) if v >= CURRENT_STATE_VERSION)
    }

    pub fn encode(&self) -> Result<String, StateCodecError> {
        EncodedState(self).encode()
    }

    pub fn decode(encoded: &str) -> Result<Self, StateCodecError> {
        Ok(encoded.parse::<EncodedState<Self>>()?.0)
    }

    pub fn widget(&self, row: usize, column: usize) -> Option<&WidgetState> {
        self.widget_state_grid.get(row)?.get(column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    pub viz_id: Option<String>,
}

impl WidgetState {
    pub fn new(viz_id: impl Into<String>) -> Self {
        Self { viz_id: Some(viz_id.into()) }
    }
}
