pub mod checkpoint;
pub mod config;
pub mod error;
pub mod events;
pub mod geofence;
pub mod models;
pub mod notification;
pub mod params;
pub mod socket_io;

pub use checkpoint::{build_checkpoints, Checkpoint, CheckpointKind};
pub use config::TrackingConfig;
pub use error::{ChannelError, LoadError};
pub use events::{ChannelEvent, CoordinatesUpdated, DustbinVisited};
pub use geofence::{Geofence, GeofenceTracker, Milestone};
pub use models::{Area, Driver, Dustbin, GeoPoint, LatLong, TrackingData};
pub use notification::{DispatchLog, DispatchStatus, Notification, NotificationDispatch};
pub use params::{decode_param, encode_param, LoadRequest, TrackingParams};
