//! Filtered chart data: single queries, two-dimensional series and joined series.

mod merged_series;
pub use merged_series::{fetch_merged_series, with_ratio, MergedSeriesRequest};

mod visualization_rows;
pub use visualization_rows::{fetch_two_dimensional_rows, fetch_visualization_rows};
