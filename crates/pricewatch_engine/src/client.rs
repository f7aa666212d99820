use std::time::Duration;

use pricewatch_logging::pw_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    ApiError, FailureKind, HistoryEntry, HistoryQuery, JobStatusReport, Product, ProductUpdate,
    Reading, Settings, TestOutcome,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The remote tracker service: job control, history and the record store.
#[async_trait::async_trait]
pub trait TrackerApi: Send + Sync {
    async fn start_job(&self) -> Result<(), ApiError>;
    async fn job_status(&self) -> Result<JobStatusReport, ApiError>;
    async fn fetch_history(&self, query: HistoryQuery) -> Result<Vec<HistoryEntry>, ApiError>;
    async fn save_reading(&self, reading: &Reading) -> Result<(), ApiError>;

    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn create_product(&self, product: &Product) -> Result<Product, ApiError>;
    async fn update_product(&self, id: &str, update: &ProductUpdate) -> Result<Product, ApiError>;
    async fn toggle_product(&self, id: &str, active: bool) -> Result<(), ApiError>;
    async fn delete_product(&self, id: &str) -> Result<(), ApiError>;
    async fn test_product(&self, id: &str) -> Result<TestOutcome, ApiError>;

    async fn settings(&self) -> Result<Settings, ApiError>;
    async fn save_settings(&self, settings: &Settings) -> Result<Settings, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let mut base_url = settings.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base} cannot be used as a base url"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base is never cannot-be-a-base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Vec<u8>, ApiError> {
        pw_debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(match error_detail(&bytes) {
                Some(detail) => ApiError::new(FailureKind::Rejected(status.as_u16()), detail),
                None => ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string()),
            });
        }
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let bytes = self.send(Method::GET, url, None).await?;
        decode(&bytes)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let body = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        self.send(method, url, Some(body)).await
    }
}

#[async_trait::async_trait]
impl TrackerApi for ReqwestApi {
    async fn start_job(&self) -> Result<(), ApiError> {
        self.send(Method::POST, self.endpoint(&["api", "scrape", "start"]), None)
            .await
            .map(|_| ())
    }

    async fn job_status(&self) -> Result<JobStatusReport, ApiError> {
        self.get_json(self.endpoint(&["api", "scrape", "status"])).await
    }

    async fn fetch_history(&self, query: HistoryQuery) -> Result<Vec<HistoryEntry>, ApiError> {
        let mut url = self.endpoint(&["api", "history"]);
        url.query_pairs_mut()
            .append_pair("days", &query.days.to_string())
            .append_pair("active_only", if query.active_only { "true" } else { "false" });
        self.get_json(url).await
    }

    async fn save_reading(&self, reading: &Reading) -> Result<(), ApiError> {
        self.send_json(Method::POST, self.endpoint(&["api", "history"]), reading)
            .await
            .map(|_| ())
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json(self.endpoint(&["api", "products"])).await
    }

    async fn create_product(&self, product: &Product) -> Result<Product, ApiError> {
        let bytes = self
            .send_json(Method::POST, self.endpoint(&["api", "products"]), product)
            .await?;
        decode(&bytes)
    }

    async fn update_product(&self, id: &str, update: &ProductUpdate) -> Result<Product, ApiError> {
        let bytes = self
            .send_json(Method::PUT, self.endpoint(&["api", "products", id]), update)
            .await?;
        decode(&bytes)
    }

    async fn toggle_product(&self, id: &str, active: bool) -> Result<(), ApiError> {
        let body = serde_json::json!({ "active": active });
        self.send_json(
            Method::PATCH,
            self.endpoint(&["api", "products", id, "toggle"]),
            &body,
        )
        .await
        .map(|_| ())
    }

    async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, self.endpoint(&["api", "products", id]), None)
            .await
            .map(|_| ())
    }

    async fn test_product(&self, id: &str) -> Result<TestOutcome, ApiError> {
        let bytes = self
            .send(
                Method::POST,
                self.endpoint(&["api", "products", id, "test"]),
                None,
            )
            .await?;
        decode(&bytes)
    }

    async fn settings(&self) -> Result<Settings, ApiError> {
        self.get_json(self.endpoint(&["api", "settings"])).await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<Settings, ApiError> {
        let bytes = self
            .send_json(Method::PUT, self.endpoint(&["api", "settings"]), settings)
            .await?;
        decode(&bytes)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// Pulls a human-readable `detail` out of an error body, if there is one.
fn error_detail(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let api = ReqwestApi::new(&ApiSettings {
            base_url: "http://localhost:9000/tracker".to_string(),
            ..ApiSettings::default()
        })
        .unwrap();
        assert_eq!(
            api.endpoint(&["api", "products", "a b"]).as_str(),
            "http://localhost:9000/tracker/api/products/a%20b"
        );
    }

    #[test]
    fn error_detail_reads_fastapi_body() {
        assert_eq!(
            error_detail(br#"{"detail":"Product ID already exists"}"#),
            Some("Product ID already exists".to_string())
        );
        assert_eq!(error_detail(b"<html>"), None);
    }
}
