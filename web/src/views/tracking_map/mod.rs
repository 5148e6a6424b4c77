pub mod route_map;
pub mod tracking_map;
pub mod tracking_sidebar;

pub use route_map::RouteMap;
pub use tracking_map::TrackingMap;
pub use tracking_sidebar::TrackingSidebar;
