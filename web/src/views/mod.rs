pub mod not_found;
pub mod tracking_map;
