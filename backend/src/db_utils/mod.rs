//! Clients for the cube backend and the state store.

pub mod clickhouse_utils;
pub mod mondrian_utils;
pub mod state_store;
