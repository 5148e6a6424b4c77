use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared_types::{Area, Driver, Notification};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::loader::TrackingBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend responded with status {0}")]
    Status(StatusCode),
}

/// Talks to the tracking REST API on behalf of the browser.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ServerConfig) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(HttpBackend {
            client,
            base_url: config.api_url.clone(),
        })
    }

    fn endpoint(&self, path: &str, id: &str) -> String {
        format!("{}{}/{}", self.base_url, path, urlencoding::encode(id))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, token: &str) -> Result<T, BackendError> {
        tracing::debug!(%url, "fetching");
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "tracking backend rejected request");
            return Err(BackendError::Status(status));
        }
        Ok(response.json::<T>().await?)
    }

    async fn send(request: RequestBuilder) -> Result<(), BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Status(status))
        }
    }
}

impl TrackingBackend for HttpBackend {
    type Error = BackendError;

    async fn fetch_area(&self, area_id: &str, token: &str) -> Result<Area, BackendError> {
        self.get_json(self.endpoint("/areas/get-area-details", area_id), token)
            .await
    }

    async fn fetch_driver(&self, driver_id: &str, token: &str) -> Result<Driver, BackendError> {
        self.get_json(self.endpoint("/drivers/get-all-drivers", driver_id), token)
            .await
    }

    async fn post_notification(
        &self,
        notification: &Notification,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = format!("{}/updates/notifications", self.base_url);
        let mut request = self.client.post(&url).json(notification);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::send(request).await
    }
}
