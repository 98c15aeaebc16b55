use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{LubeLoggerError, Result};
use crate::models::{GasRecord, PostResponse, Vehicle};

/// Header carrying the API credential.
pub const API_KEY_HEADER: &str = "x-api-key";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one LubeLogger instance.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base API URL, e.g. `https://lubelogger.example.com/api`.
    pub api_uri: String,
    pub authorization: String,
    /// Applies to each request; an elapsed timeout fails that request.
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_uri: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            api_uri: api_uri.into(),
            authorization: authorization.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The LubeLogger operations the sync needs.
#[async_trait]
pub trait LubeLoggerApi: Send + Sync {
    async fn vehicles(&self) -> Result<Vec<Vehicle>>;

    async fn gas_records(&self, vehicle_id: i64) -> Result<Vec<GasRecord>>;

    async fn add_gas_record(&self, vehicle_id: i64, record: &GasRecord) -> Result<PostResponse>;
}

/// Client for interacting with the LubeLogger API
#[derive(Clone, Debug)]
pub struct LubeLoggerClient {
    http_client: reqwest::Client,
    api_uri: String,
    authorization: String,
}

impl LubeLoggerClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http_client,
            api_uri: config.api_uri.trim_end_matches('/').to_string(),
            authorization: config.authorization.clone(),
        })
    }

    pub fn api_uri(&self) -> &str {
        &self.api_uri
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_uri, endpoint)
    }

    async fn get_json<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.authorization)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("GET {} -> {} ({} bytes)", endpoint, status, body.len());

        if !status.is_success() {
            return Err(LubeLoggerError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| LubeLoggerError::JsonError { source, body })
    }

    async fn post_form(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        form: &[(String, String)],
    ) -> Result<PostResponse> {
        let url = self.endpoint_url(endpoint);
        debug!("POST {} {:?} ({} form fields)", url, query, form.len());

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.authorization)
            .query(query)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("POST {} -> {} ({} bytes)", endpoint, status, body.len());

        interpret_post_response(endpoint, status, body)
    }
}

/// Maps a write endpoint's reply onto a [`PostResponse`].
///
/// An empty body is a success only when the status is; a non-empty body must be a JSON
/// `PostResponse` whatever the status.
pub fn interpret_post_response(
    endpoint: &str,
    status: StatusCode,
    body: String,
) -> Result<PostResponse> {
    if body.is_empty() {
        if status.is_success() {
            info!("POST to {} succeeded with empty response body", endpoint);
            return Ok(PostResponse {
                success: true,
                message: String::new(),
            });
        }
        return Err(LubeLoggerError::EmptyResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    serde_json::from_str(&body).map_err(|source| LubeLoggerError::JsonError { source, body })
}

#[async_trait]
impl LubeLoggerApi for LubeLoggerClient {
    async fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.get_json("vehicles", &[]).await
    }

    async fn gas_records(&self, vehicle_id: i64) -> Result<Vec<GasRecord>> {
        let records: Vec<GasRecord> = self
            .get_json(
                "vehicle/gasrecords",
                &[("vehicleID", vehicle_id.to_string())],
            )
            .await?;
        info!(
            "Loaded LubeLogger gas records (vehicle_id={}, count={})",
            vehicle_id,
            records.len()
        );
        Ok(records)
    }

    async fn add_gas_record(&self, vehicle_id: i64, record: &GasRecord) -> Result<PostResponse> {
        debug!("Adding gas record (vehicle_id={}): {:?}", vehicle_id, record);
        self.post_form(
            "vehicle/gasrecords/add",
            &[("vehicleID", vehicle_id.to_string())],
            &record.form_fields(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            LubeLoggerClient::new(&ApiConfig::new("https://ll.example.com/api/", "key")).unwrap();
        assert_eq!(client.api_uri(), "https://ll.example.com/api");
        assert_eq!(
            client.endpoint_url("vehicles"),
            "https://ll.example.com/api/vehicles"
        );
    }

    #[test]
    fn empty_body_follows_status() {
        let ok = interpret_post_response("add", StatusCode::OK, String::new()).unwrap();
        assert_eq!(
            ok,
            PostResponse {
                success: true,
                message: String::new()
            }
        );
        assert!(interpret_post_response("add", StatusCode::CREATED, String::new())
            .unwrap()
            .success);

        let err = interpret_post_response("add", StatusCode::INTERNAL_SERVER_ERROR, String::new())
            .unwrap_err();
        assert!(matches!(
            err,
            LubeLoggerError::EmptyResponse { status: 500, .. }
        ));
    }

    #[test]
    fn whitespace_body_is_not_empty() {
        let err = interpret_post_response("add", StatusCode::OK, " \n".into()).unwrap_err();
        assert!(matches!(err, LubeLoggerError::JsonError { ref body, .. } if body == " \n"));
    }

    #[test]
    fn unparsable_body_keeps_raw_text() {
        let err = interpret_post_response("add", StatusCode::OK, "<html>oops</html>".into())
            .unwrap_err();
        assert!(err.to_string().contains("<html>oops</html>"));
    }

    #[test]
    fn json_body_is_decoded_even_on_failure_status() {
        let response = interpret_post_response(
            "add",
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Input object invalid"}"#.into(),
        )
        .unwrap();
        assert!(!response.success);
        assert_eq!(response.message, "Input object invalid");
    }
}
