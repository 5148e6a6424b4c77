use std::future::Future;

use shared_types::{Area, Driver, LoadError, LoadRequest, Notification, TrackingData};

/// The tracking backend's REST surface used by the page.
pub trait TrackingBackend {
    type Error: std::fmt::Display;

    fn fetch_area(
        &self,
        area_id: &str,
        token: &str,
    ) -> impl Future<Output = Result<Area, Self::Error>> + Send;

    fn fetch_driver(
        &self,
        driver_id: &str,
        token: &str,
    ) -> impl Future<Output = Result<Driver, Self::Error>> + Send;

    fn post_notification(
        &self,
        notification: &Notification,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Fetches the area and the driver concurrently and reconciles both
/// outcomes into one result. The area error wins when both fail.
pub async fn load_tracking_data<B: TrackingBackend>(
    backend: &B,
    request: &LoadRequest,
) -> Result<TrackingData, LoadError> {
    request.validate()?;
    let token = request.token.as_str();

    let area = async {
        match request.area_id.as_deref() {
            Some(id) => backend
                .fetch_area(id, token)
                .await
                .map_err(|e| LoadError::AreaFetch(e.to_string())),
            None => Err(LoadError::MissingIdentifier("areaId".to_string())),
        }
    };
    let driver = async {
        match request.driver_id.as_deref() {
            Some(id) => backend
                .fetch_driver(id, token)
                .await
                .map_err(|e| LoadError::DriverFetch(e.to_string())),
            None => Err(LoadError::MissingIdentifier("driverId".to_string())),
        }
    };

    let (area, driver) = futures::join!(area, driver);
    Ok(TrackingData {
        area: area?,
        driver: driver?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use shared_types::TrackingParams;

    #[derive(Default)]
    struct MockBackend {
        area_calls: AtomicUsize,
        driver_calls: AtomicUsize,
        fail_area: bool,
        fail_driver: bool,
    }

    impl TrackingBackend for MockBackend {
        type Error = String;

        async fn fetch_area(&self, area_id: &str, token: &str) -> Result<Area, String> {
            self.area_calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(token, "jwt");
            if self.fail_area {
                return Err("status 404 Not Found".to_string());
            }
            Ok(Area {
                id: area_id.to_string(),
                name: "Ward 7".to_string(),
                dustbins: Vec::new(),
            })
        }

        async fn fetch_driver(&self, driver_id: &str, _token: &str) -> Result<Driver, String> {
            self.driver_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_driver {
                return Err("status 500 Internal Server Error".to_string());
            }
            Ok(Driver {
                id: driver_id.to_string(),
                name: "Ravi".to_string(),
                phone_numbers: vec!["9876543210".to_string()],
                vehicle_id: Some("WB-01".to_string()),
            })
        }

        async fn post_notification(
            &self,
            _notification: &Notification,
            _token: Option<&str>,
        ) -> Result<(), String> {
            Ok(())
        }
    }

    fn request() -> LoadRequest {
        LoadRequest {
            area_id: Some("area-1".to_string()),
            driver_id: Some("drv-1".to_string()),
            token: "jwt".to_string(),
        }
    }

    #[tokio::test]
    async fn test_loads_area_and_driver() {
        let backend = MockBackend::default();
        let data = load_tracking_data(&backend, &request()).await.unwrap();

        assert_eq!(data.area.id, "area-1");
        assert_eq!(data.driver.name, "Ravi");
        assert_eq!(backend.area_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.driver_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_token_never_reaches_backend() {
        let backend = MockBackend::default();
        let params = TrackingParams {
            area_id: Some("area-1".to_string()),
            ..Default::default()
        };
        assert_eq!(params.authorize(None), Err(LoadError::MissingCredential));

        let mut request = request();
        request.token = String::new();
        let result = load_tracking_data(&backend, &request).await;

        assert_eq!(result, Err(LoadError::MissingCredential));
        assert_eq!(backend.area_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.driver_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_driver_failure_fails_the_load() {
        let backend = MockBackend {
            fail_driver: true,
            ..Default::default()
        };
        let result = load_tracking_data(&backend, &request()).await;

        assert_eq!(
            result,
            Err(LoadError::DriverFetch("status 500 Internal Server Error".to_string()))
        );
        assert_eq!(backend.area_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_area_error_reported_when_both_fail() {
        let backend = MockBackend {
            fail_area: true,
            fail_driver: true,
            ..Default::default()
        };
        let result = load_tracking_data(&backend, &request()).await;
        assert!(matches!(result, Err(LoadError::AreaFetch(_))));
        assert_eq!(backend.driver_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_identifier_skips_that_request() {
        let backend = MockBackend::default();
        let mut request = request();
        request.area_id = None;
        let result = load_tracking_data(&backend, &request).await;

        assert_eq!(
            result,
            Err(LoadError::MissingIdentifier("areaId".to_string()))
        );
        assert_eq!(backend.area_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.driver_calls.load(Ordering::SeqCst), 1);
    }
}
