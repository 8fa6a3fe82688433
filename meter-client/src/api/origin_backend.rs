use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::SmartMeterRead;
use crate::error::{ClientError, ClientResult};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
}

/// Client for the origin backend's device smart-meter endpoints.
///
/// One client holds one authenticated session; simulator workers each build
/// their own.
#[derive(Clone)]
pub struct OriginBackendClient {
    base_url: String,
    client: Client,
    access_token: Option<String>,
}

impl OriginBackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            client,
            access_token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Exchange credentials for a bearer token used by every later request.
    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<()> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let response = check_status(response, "POST", &url).await?;
        let login: LoginResponse = response.json().await?;

        info!(base_url = %self.base_url, "authenticated against origin backend");
        self.access_token = Some(login.access_token);
        Ok(())
    }

    /// All reads stored for a device, oldest first.
    pub async fn smart_meter_reads(&self, device_id: u64) -> ClientResult<Vec<SmartMeterRead>> {
        let url = self.smart_meter_url(device_id);
        let response = self.authorized(self.client.get(&url))?.send().await?;
        let response = check_status(response, "GET", &url).await?;
        let reads: Vec<SmartMeterRead> = response.json().await?;

        debug!(device_id, count = reads.len(), "fetched smart meter reads");
        Ok(reads)
    }

    pub async fn latest_smart_meter_read(
        &self,
        device_id: u64,
    ) -> ClientResult<Option<SmartMeterRead>> {
        let mut reads = self.smart_meter_reads(device_id).await?;
        Ok(reads.pop())
    }

    /// Submit a batch of reads in a single request.
    pub async fn save_smart_meter_reads(
        &self,
        device_id: u64,
        reads: &[SmartMeterRead],
    ) -> ClientResult<()> {
        let url = self.smart_meter_url(device_id);
        let response = self
            .authorized(self.client.put(&url))?
            .json(reads)
            .send()
            .await?;
        check_status(response, "PUT", &url).await?;

        debug!(device_id, count = reads.len(), "saved smart meter reads");
        Ok(())
    }

    fn smart_meter_url(&self, device_id: u64) -> String {
        format!("{}/device/{}/smartMeterReading", self.base_url, device_id)
    }

    fn authorized(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }
}

async fn check_status(
    response: Response,
    method: &'static str,
    url: &str,
) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::HttpStatus {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Server};
    use serde_json::json;

    async fn logged_in_client(server: &mut Server) -> OriginBackendClient {
        let _login = server
            .mock("POST", "/auth/login")
            .match_body(Matcher::Json(json!({
                "username": "admin@mailinator.com",
                "password": "test"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(json!({ "accessToken": "token-1" }).to_string())
            .create_async()
            .await;

        let mut client = OriginBackendClient::new(server.url(), Duration::from_secs(5)).unwrap();
        client.login("admin@mailinator.com", "test").await.unwrap();
        client
    }

    #[tokio::test]
    async fn login_stores_bearer_token() {
        let mut server = Server::new_async().await;
        let client = logged_in_client(&mut server).await;

        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn requests_without_login_are_rejected_locally() {
        let client = OriginBackendClient::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        let res = client.smart_meter_reads(7).await;

        assert!(matches!(res, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn latest_read_is_last_element() {
        let mut server = Server::new_async().await;
        let client = logged_in_client(&mut server).await;
        let mock = server
            .mock("GET", "/device/7/smartMeterReading")
            .match_header("authorization", "Bearer token-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    { "meterReading": "100", "timestamp": 1_700_000_000 },
                    { "meterReading": "250", "timestamp": 1_700_000_900 }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let latest = client.latest_smart_meter_read(7).await.unwrap().unwrap();

        assert_eq!(latest.meter_reading, 250);
        assert_eq!(latest.timestamp.timestamp(), 1_700_000_900);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn latest_read_is_none_for_device_without_reads() {
        let mut server = Server::new_async().await;
        let client = logged_in_client(&mut server).await;
        let _reads = server
            .mock("GET", "/device/3/smartMeterReading")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        assert!(client.latest_smart_meter_read(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_puts_whole_batch() {
        let mut server = Server::new_async().await;
        let client = logged_in_client(&mut server).await;
        let mock = server
            .mock("PUT", "/device/7/smartMeterReading")
            .match_header("authorization", "Bearer token-1")
            .match_body(Matcher::Json(json!([
                { "meterReading": "50", "timestamp": 1_718_323_200 },
                { "meterReading": "80", "timestamp": 1_718_324_100 }
            ])))
            .with_status(200)
            .create_async()
            .await;

        let reads = vec![
            SmartMeterRead {
                meter_reading: 50,
                timestamp: Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap(),
            },
            SmartMeterRead {
                meter_reading: 80,
                timestamp: Utc.with_ymd_and_hms(2024, 6, 14, 0, 15, 0).unwrap(),
            },
        ];
        client.save_smart_meter_reads(7, &reads).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_keeps_response_body() {
        let mut server = Server::new_async().await;
        let client = logged_in_client(&mut server).await;
        let _save = server
            .mock("PUT", "/device/7/smartMeterReading")
            .with_status(422)
            .with_body(r#"{"message":"Smart meter reading has to be higher than the previous one"}"#)
            .create_async()
            .await;

        let err = client.save_smart_meter_reads(7, &[]).await.unwrap_err();

        match &err {
            ClientError::HttpStatus { method, status, .. } => {
                assert_eq!(*method, "PUT");
                assert_eq!(*status, 422);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.http_response_body().unwrap().contains("higher than the previous"));
    }
}
