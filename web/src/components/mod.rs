pub mod error;
pub mod loading;
pub mod tracking_progress_bar;

// Re-export commonly used types
pub use error::ErrorView;
pub use loading::LoadingView;
pub use tracking_progress_bar::TrackingProgressBar;
