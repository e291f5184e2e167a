//! Filterable dimension descriptors and their configuration overrides.

use serde::{Deserialize, Serialize};

/// One filterable axis of the cube, usually a single level of a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDimension {
    /// Unique level path, e.g. `[Store].[Store State]`.
    pub path: String,
    pub label: String,
    /// Query listing every member of this level, one row per member.
    pub membership_query: String,
    pub connection: String,
}

impl FilterDimension {
    pub fn new(
        path: impl Into<String>,
        label: impl Into<String>,
        membership_query: impl Into<String>,
        connection: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            membership_query: membership_query.into(),
            connection: connection.into(),
        }
    }

    /// The path with its trailing `.[level]` segment removed.
    pub fn hierarchy(&self) -> &str {
        hierarchy_of(&self.path)
    }

    /// The expression naming every member of this level.
    pub fn members_expression(&self) -> String {
        format!("{}.Members", self.path)
    }

    /// Quote a member key as a fully qualified member of this level.
    pub fn member_expression(&self, member: &str) -> String {
        format!("{}.[{}]", self.path, member)
    }

    /// Replace label and membership query with the override's non-empty fields.
    ///
    /// Returns `true` when anything changed. An override for a different path is ignored.
    pub fn update_from(&mut self, dimension_override: &DimensionOverride) -> bool {
        if dimension_override.path != self.path {
            return false;
        }
        let mut changed = false;
        if let Some(label) = non_empty(&dimension_override.label) {
            if label != self.label {
                self.label = label.to_string();
                changed = true;
            }
        }
        if let Some(query) = non_empty(&dimension_override.membership_query) {
            if query != self.membership_query {
                self.membership_query = query.to_string();
                changed = true;
            }
        }
        changed
    }
}

/// Configuration-supplied replacement for a discovered dimension's label or query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DimensionOverride {
    #[serde(rename = "dimension", alias = "path")]
    pub path: String,
    pub label: Option<String>,
    #[serde(rename = "query", alias = "membershipQuery")]
    pub membership_query: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Strip a trailing `.[...]` segment from a dimension path.
pub fn hierarchy_of(path: &str) -> &str {
    if !path.ends_with(']') {
        return path;
    }
    match path.rfind(".[") {
        // need at least one character on each side of the separator
        Some(pos) if pos > 0 && pos + 3 < path.len() => &path[..pos],
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_dimension() -> FilterDimension {
        FilterDimension::new(
            "[Store].[Store State]",
            "Store State",
            "SELECT {[Store].[Store State].Members} ON COLUMNS FROM [Warehouse]",
            "foodmart",
        )
    }

    #[test]
    fn hierarchy_strips_the_level_segment() {
        assert_eq!(state_dimension().hierarchy(), "[Store]");
        assert_eq!(hierarchy_of("[Time].[Year].[Quarter]"), "[Time].[Year]");
        assert_eq!(hierarchy_of("[Store]"), "[Store]");
        assert_eq!(hierarchy_of("Measures"), "Measures");
    }

    #[test]
    fn member_expressions_are_bracketed_after_the_path() {
        let dimension = state_dimension();
        assert_eq!(dimension.members_expression(), "[Store].[Store State].Members");
        assert_eq!(dimension.member_expression("OH"), "[Store].[Store State].[OH]");
    }

    #[test]
    fn update_from_only_applies_present_fields() {
        let mut dimension = state_dimension();
        let previous_query = dimension.membership_query.clone();
        let changed = dimension.update_from(&DimensionOverride {
            path: "[Store].[Store State]".to_string(),
            label: Some("State (Custom)".to_string()),
            membership_query: None,
        });
        assert!(changed);
        assert_eq!(dimension.label, "State (Custom)");
        assert_eq!(dimension.membership_query, previous_query);
    }

    #[test]
    fn update_from_ignores_other_paths() {
        let mut dimension = state_dimension();
        let changed = dimension.update_from(&DimensionOverride {
            path: "[Time].[Year]".to_string(),
            label: Some("Year".to_string()),
            membership_query: Some("SELECT 1".to_string()),
        });
        assert!(!changed);
        assert_eq!(dimension, state_dimension());
    }

    #[test]
    fn override_reads_config_field_names() {
        let parsed: DimensionOverride = serde_json::from_value(serde_json::json!({
            "dimension": "[Store].[Store State]",
            "label": "State (Custom)",
        }))
        .unwrap();
        assert_eq!(parsed.path, "[Store].[Store State]");
        assert_eq!(parsed.membership_query, None);
    }
}
