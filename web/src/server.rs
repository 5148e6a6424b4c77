use leptos::prelude::*;
use leptos::server;
use shared_types::{LoadError, LoadRequest, Notification, TrackingConfig, TrackingData};

#[cfg(feature = "ssr")]
use crate::{
    backend::HttpBackend,
    config::get_config,
    loader::{load_tracking_data, TrackingBackend},
};

/// Public settings the browser needs before it can open the live channel.
#[server]
pub async fn get_tracking_config() -> Result<TrackingConfig, ServerFnError> {
    Ok(get_config().tracking.clone())
}

/// Loads the area and driver for the tracking page. Domain failures come
/// back in the inner result so the page can tell them from transport errors.
#[server]
pub async fn fetch_tracking_data(
    request: LoadRequest,
) -> Result<Result<TrackingData, LoadError>, ServerFnError> {
    let backend = HttpBackend::new(get_config())
        .map_err(|e| ServerFnError::new(format!("Failed to build HTTP client: {}", e)))?;

    let outcome = load_tracking_data(&backend, &request).await;
    match &outcome {
        Ok(data) => tracing::info!(
            area = %data.area.id,
            driver = %data.driver.id,
            dustbins = data.area.dustbins.len(),
            "tracking data loaded"
        ),
        Err(e) => tracing::warn!(error = %e, "tracking data load failed"),
    }
    Ok(outcome)
}

#[server]
pub async fn send_notification(
    notification: Notification,
    token: Option<String>,
) -> Result<(), ServerFnError> {
    let backend = HttpBackend::new(get_config())
        .map_err(|e| ServerFnError::new(format!("Failed to build HTTP client: {}", e)))?;

    match backend
        .post_notification(&notification, token.as_deref())
        .await
    {
        Ok(()) => {
            tracing::info!(driver = %notification.driver_id, title = %notification.title, "notification created");
            Ok(())
        }
        Err(e) => {
            tracing::error!(driver = %notification.driver_id, error = %e, "notification failed");
            Err(ServerFnError::new(format!(
                "Failed to create notification: {}",
                e
            )))
        }
    }
}
