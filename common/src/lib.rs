//! Dimension filter state, MDX rewriting and result merging shared by the dashboard crates.

extern crate serde;


pub mod filter_dimension;
pub mod member_selection;
pub mod dimension_catalog;
pub mod dimension_filter_model;
pub mod mdx_rewrite;
pub mod result_merge;
pub mod dashboard_config;
pub mod encoded_state;
pub mod ui_state;
