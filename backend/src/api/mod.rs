//! Dashboard operations built on the query executor and state store.

pub mod dimension_filters;
pub mod series;
pub mod session;
