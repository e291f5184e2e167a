//! Per-dimension member selection state shared by every query of the dashboard.
//!
//! The model is populated once per discovered dimension, overlaid with the selections saved
//! in a previous session (`sync_with`), then mutated by user toggles. Queries are rewritten
//! against it in [`crate::mdx_rewrite`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter_dimension::FilterDimension;
use crate::member_selection::MemberSelectionSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterModelError {
    DuplicateDimension(String),
    MisalignedLevelValues { dimensions: usize, level_values: usize },
    SelectedIndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for FilterModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDimension(path) => write!(f, "Dimension {} is already in the filter model", path),
            Self::MisalignedLevelValues { dimensions, level_values } => write!(
                f,
                "Filter model has {} dimensions but {} member selections",
                dimensions, level_values
            ),
            Self::SelectedIndexOutOfRange { index, len } => {
                write!(f, "Selected dimension index {} is out of range for {} dimensions", index, len)
            }
        }
    }
}

impl std::error::Error for FilterModelError {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "DimensionFilterModelState", into = "DimensionFilterModelState")]
pub struct DimensionFilterModel {
    pub(crate) dimensions: Vec<FilterDimension>,
    pub(crate) dimension_level_values: Vec<MemberSelectionSet>,
    pub(crate) selected_dimension_index: usize,
    // alternates select-all / deselect-all; runtime only
    pub(crate) toggle_all_value: bool,
}

impl DimensionFilterModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Append a dimension with its initial member flags.
    pub fn add_dimension_levels(
        &mut self,
        dimension: FilterDimension,
        level_values: MemberSelectionSet,
    ) -> Result<(), FilterModelError> {
        if self.position(&dimension.path).is_some() {
            return Err(FilterModelError::DuplicateDimension(dimension.path));
        }
        self.dimensions.push(dimension);
        self.dimension_level_values.push(level_values);
        Ok(())
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.path == path)
    }

    pub fn dimension(&self, path: &str) -> Option<&FilterDimension> {
        self.dimensions.iter().find(|d| d.path == path)
    }

    pub fn level_values(&self, path: &str) -> Option<&MemberSelectionSet> {
        self.position(path).map(|i| &self.dimension_level_values[i])
    }

    pub fn level_values_mut(&mut self, path: &str) -> Option<&mut MemberSelectionSet> {
        self.position(path).map(move |i| &mut self.dimension_level_values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterDimension, &MemberSelectionSet)> {
        self.dimensions.iter().zip(self.dimension_level_values.iter())
    }

    /// Dimension paths in model order.
    pub fn dimensions(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.path.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.label.as_str()).collect()
    }

    pub fn filter_dimensions(&self) -> &[FilterDimension] {
        &self.dimensions
    }

    pub fn selected_dimension_index(&self) -> usize {
        self.selected_dimension_index
    }

    pub fn select_dimension(&mut self, index: usize) -> Result<(), FilterModelError> {
        if index >= self.dimensions.len() {
            return Err(FilterModelError::SelectedIndexOutOfRange {
                index,
                len: self.dimensions.len(),
            });
        }
        self.selected_dimension_index = index;
        Ok(())
    }

    pub fn selected_dimension(&self) -> Option<&FilterDimension> {
        self.dimensions.get(self.selected_dimension_index)
    }

    pub fn selected_dimension_level_values(&self) -> Option<&MemberSelectionSet> {
        self.dimension_level_values.get(self.selected_dimension_index)
    }

    /// Flip one member of the dimension being edited and return its new flag.
    pub fn toggle_selected_dimension_value(&mut self, member: &str) -> Option<bool> {
        self.dimension_level_values
            .get_mut(self.selected_dimension_index)?
            .toggle(member)
    }

    /// Alternately select and deselect every member of the dimension being edited.
    ///
    /// This is a plain alternator: the next call does the opposite of the previous call,
    /// whatever individual toggles happened in between.
    pub fn toggle_all_selected_dimension_level_values(&mut self) {
        if let Some(level_values) = self.dimension_level_values.get_mut(self.selected_dimension_index) {
            level_values.set_all(!self.toggle_all_value);
        }
        self.toggle_all_value = !self.toggle_all_value;
    }

    /// Overlay flags saved in a previous session onto this freshly populated model.
    ///
    /// Members that no longer exist are dropped; new members keep their defaults.
    pub fn sync_with(&mut self, saved: Option<&DimensionFilterModel>) {
        let Some(saved) = saved else {
            return;
        };
        for (saved_dimension, saved_values) in saved.iter() {
            let Some(current_values) = self.level_values_mut(&saved_dimension.path) else {
                debug!("Saved dimension {} is no longer filterable", saved_dimension.path);
                continue;
            };
            let mut stale = 0;
            for (member, included) in saved_values.iter() {
                if !current_values.set(member, included) {
                    stale += 1;
                }
            }
            if stale > 0 {
                debug!("Dropped {} stale members of {}", stale, saved_dimension.path);
            }
        }
    }
}

/// Persisted layout: descriptors, selected index and aligned member maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilterModelState {
    pub dimensions: Vec<FilterDimension>,
    pub selected_dimension_index: usize,
    pub dimension_level_values: Vec<MemberSelectionSet>,
}

impl From<DimensionFilterModel> for DimensionFilterModelState {
    fn from(model: DimensionFilterModel) -> Self {
        Self {
            dimensions: model.dimensions,
            selected_dimension_index: model.selected_dimension_index,
            dimension_level_values: model.dimension_level_values,
        }
    }
}

impl TryFrom<DimensionFilterModelState> for DimensionFilterModel {
    type Error = FilterModelError;

    fn try_from(state: DimensionFilterModelState) -> Result<Self, Self::Error> {
        if state.dimensions.len() != state.dimension_level_values.len() {
            return Err(FilterModelError::MisalignedLevelValues {
                dimensions: state.dimensions.len(),
                level_values: state.dimension_level_values.len(),
            });
        }
        if !state.dimensions.is_empty() && state.selected_dimension_index >= state.dimensions.len() {
            return Err(FilterModelError::SelectedIndexOutOfRange {
                index: state.selected_dimension_index,
                len: state.dimensions.len(),
            });
        }
        let mut seen = HashSet::new();
        for dimension in &state.dimensions {
            if !seen.insert(dimension.path.as_str()) {
                return Err(FilterModelError::DuplicateDimension(dimension.path.clone()));
            }
        }
        Ok(Self {
            dimensions: state.dimensions,
            dimension_level_values: state.dimension_level_values,
            selected_dimension_index: state.selected_dimension_index,
            toggle_all_value: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimension(path: &str, label: &str) -> FilterDimension {
        FilterDimension::new(path, label, format!("SELECT {{{}.Members}} ON COLUMNS FROM [Warehouse]", path), "foodmart")
    }

    fn values(members: &[(&str, bool)]) -> MemberSelectionSet {
        members.iter().map(|&(m, f)| (m, f)).collect()
    }

    fn model_with(rows: Vec<(&str, &[(&str, bool)])>) -> DimensionFilterModel {
        let mut model = DimensionFilterModel::new();
        for (path, members) in rows {
            model.add_dimension_levels(dimension(path, path), values(members)).unwrap();
        }
        model
    }

    #[test]
    fn rejects_duplicate_paths() {
        let mut model = model_with(vec![("[Store].[Store State]", &[("OH", true)])]);
        let err = model
            .add_dimension_levels(dimension("[Store].[Store State]", "again"), MemberSelectionSet::new())
            .unwrap_err();
        assert_eq!(err, FilterModelError::DuplicateDimension("[Store].[Store State]".to_string()));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn toggles_only_the_selected_dimension() {
        let mut model = model_with(vec![
            ("[Store].[Store State]", &[("OH", true), ("MI", true)]),
            ("[Time].[Year]", &[("2019", true), ("2020", true)]),
        ]);
        model.select_dimension(1).unwrap();
        assert_eq!(model.toggle_selected_dimension_value("2019"), Some(false));
        assert_eq!(model.level_values("[Time].[Year]").unwrap().get("2019"), Some(false));
        assert!(model.level_values("[Store].[Store State]").unwrap().partition().all_selected());
        assert_eq!(model.toggle_selected_dimension_value("2019"), Some(true));
    }

    #[test]
    fn select_dimension_rejects_out_of_range() {
        let mut model = model_with(vec![("[Time].[Year]", &[("2019", true)])]);
        assert!(model.select_dimension(1).is_err());
        assert_eq!(model.selected_dimension_index(), 0);
    }

    #[test]
    fn toggle_on_empty_model_is_none() {
        let mut model = DimensionFilterModel::new();
        assert_eq!(model.toggle_selected_dimension_value("OH"), None);
        model.toggle_all_selected_dimension_level_values();
        assert!(model.selected_dimension().is_none());
    }

    #[test]
    fn toggle_all_alternates_regardless_of_individual_toggles() {
        let mut model = model_with(vec![("[Store].[Store State]", &[("OH", true), ("MI", true), ("VT", true)])]);

        // first call selects everything, even though everything is already selected
        model.toggle_all_selected_dimension_level_values();
        assert!(model.selected_dimension_level_values().unwrap().partition().all_selected());

        model.toggle_selected_dimension_value("OH");
        model.toggle_all_selected_dimension_level_values();
        assert!(model.selected_dimension_level_values().unwrap().partition().included.is_empty());

        model.toggle_selected_dimension_value("OH");
        model.toggle_all_selected_dimension_level_values();
        assert!(model.selected_dimension_level_values().unwrap().partition().all_selected());
    }

    #[test]
    fn sync_copies_shared_members_only() {
        let mut current = model_with(vec![("A", &[("x", true), ("y", true)])]);
        let saved = model_with(vec![("A", &[("x", false), ("z", true)])]);

        current.sync_with(Some(&saved));

        let a = current.level_values("A").unwrap();
        assert_eq!(a.get("x"), Some(false));
        assert_eq!(a.get("y"), Some(true));
        assert!(!a.contains("z"));
    }

    #[test]
    fn sync_leaves_unshared_dimensions_alone() {
        let mut current = model_with(vec![("A", &[("x", true)]), ("B", &[("p", true)])]);
        let saved = model_with(vec![("C", &[("p", false)]), ("B", &[("p", false)])]);

        current.sync_with(Some(&saved));
        current.sync_with(None);

        assert_eq!(current.dimensions(), vec!["A", "B"]);
        assert_eq!(current.level_values("A").unwrap().get("x"), Some(true));
        assert_eq!(current.level_values("B").unwrap().get("p"), Some(false));
    }

    #[test]
    fn serializes_descriptors_index_and_aligned_maps() {
        let mut model = model_with(vec![
            ("[Store].[Store State]", &[("OH", true), ("MI", false)]),
            ("[Time].[Year]", &[("2020", true)]),
        ]);
        model.select_dimension(1).unwrap();

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["selectedDimensionIndex"], 1);
        assert_eq!(json["dimensions"][0]["path"], "[Store].[Store State]");
        assert_eq!(json["dimensions"][1]["membershipQuery"], "SELECT {[Time].[Year].Members} ON COLUMNS FROM [Warehouse]");
        assert_eq!(json["dimensionLevelValues"][0]["MI"], false);

        let back: DimensionFilterModel = serde_json::from_value(json).unwrap();
        assert_eq!(back, model);
        let states = back.level_values("[Store].[Store State]").unwrap();
        assert_eq!(states.members().collect::<Vec<_>>(), vec!["OH", "MI"]);
    }

    #[test]
    fn deserialize_rejects_misaligned_state() {
        let json = serde_json::json!({
            "dimensions": [{"path": "A", "label": "A", "membershipQuery": "q", "connection": "c"}],
            "selectedDimensionIndex": 0,
            "dimensionLevelValues": [],
        });
        assert!(serde_json::from_value::<DimensionFilterModel>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_out_of_range_index() {
        let json = serde_json::json!({
            "dimensions": [{"path": "A", "label": "A", "membershipQuery": "q", "connection": "c"}],
            "selectedDimensionIndex": 3,
            "dimensionLevelValues": [{"x": true}],
        });
        assert!(serde_json::from_value::<DimensionFilterModel>(json).is_err());
    }
}
