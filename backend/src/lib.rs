//! Async collaborators of the dashboard: query execution, state persistence and session set-up.

pub mod api;
pub mod db_utils;
pub mod server_extra;
pub mod settings;
