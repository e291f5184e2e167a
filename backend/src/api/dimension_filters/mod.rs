//! Filter model population and start-up property substitution.

mod populate;
pub use populate::{member_selection_from_rows, populate_dimension_filter_model};

mod init_properties;
pub use init_properties::replace_property_placeholders;
