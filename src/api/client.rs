use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::io::roster_from_values;
use crate::models::Roster;

/// Configuration for the jobs API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. "https://jobs.example.com"
    pub base_url: String,
    /// Bearer token from login
    pub token: String,
}

impl ApiConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("JOBNOTE_API_URL")
            .context("JOBNOTE_API_URL environment variable not set")?;
        let token = std::env::var("JOBNOTE_API_TOKEN")
            .context("JOBNOTE_API_TOKEN environment variable not set")?;
        Ok(Self::new(base_url, token))
    }

    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Absolute URL for an API path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[derive(Debug, Serialize)]
struct NoteRequest<'a> {
    text: &'a str,
}

/// Server acknowledgement of a submitted note
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteReceipt {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Client for the team directory and note submission endpoints
pub struct JobsApiClient {
    client: Client,
    config: ApiConfig,
}

impl JobsApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Fetch the team roster
    pub async fn get_team_members(&self) -> Result<Roster> {
        let request = self.client.get(self.config.url("/api/users"));
        let body = self.send(request).await?;

        let roster = members_from_body(body)?;
        debug!("Fetched {} team members", roster.len());
        Ok(roster)
    }

    /// Attach a note to a job
    pub async fn add_note(&self, job_id: &str, text: &str) -> Result<NoteReceipt> {
        let endpoint = format!("/api/jobs/{}/notes", job_id);
        let request = self
            .client
            .post(self.config.url(&endpoint))
            .json(&NoteRequest { text });
        let body = self.send(request).await?;

        serde_json::from_value(body).context("Failed to parse note response")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.config.token)
            .header("content-type", "application/json")
            .send()
            .await
            .context("Failed to send request to jobs API")?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read jobs API response")?;
    parse_response(status, &body)
}

/// Non-success statuses fail with the status and the body's `error` field
fn parse_response(status: StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(body)
            .map(|value| error_message(&value))
            .unwrap_or_else(|_| "Request failed".to_string());
        error!("Jobs API error: {} - {}", status, message);
        anyhow::bail!("Jobs API error: {} - {}", status, message);
    }

    serde_json::from_str(body).context("Failed to parse jobs API response")
}

/// Roster entries from either a bare array or a `{ "users": [...] }` wrapper
fn members_from_body(body: Value) -> Result<Roster> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("users") {
            Some(Value::Array(entries)) => entries,
            _ => anyhow::bail!("Unexpected team member response shape"),
        },
        _ => anyhow::bail!("Unexpected team member response shape"),
    };
    Ok(roster_from_values(&entries))
}

/// The server's `error` field, or a generic message
fn error_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .unwrap_or("Request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = ApiConfig::new("https://jobs.example.com/", "t");
        assert_eq!(
            config.url("/api/jobs/12/notes"),
            "https://jobs.example.com/api/jobs/12/notes"
        );
    }

    #[test]
    fn test_error_message() {
        let body = serde_json::json!({"error": "Job not found"});
        assert_eq!(error_message(&body), "Job not found");
        assert_eq!(error_message(&serde_json::json!({})), "Request failed");
    }

    #[test]
    fn test_non_json_error_keeps_status() {
        let err = parse_response(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("502"), "{}", message);
        assert!(message.contains("Request failed"), "{}", message);
    }

    #[test]
    fn test_json_error_field_reported() {
        let body = r#"{"error": "Job not found"}"#;
        let err = parse_response(StatusCode::NOT_FOUND, body).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("404"), "{}", message);
        assert!(message.contains("Job not found"), "{}", message);
    }

    #[test]
    fn test_success_body_parsed() {
        let body = parse_response(StatusCode::OK, r#"{"id": 3, "text": "hi"}"#).unwrap();
        assert_eq!(body["id"], 3);
        assert!(parse_response(StatusCode::OK, "not json").is_err());
    }

    #[test]
    fn test_members_from_body_shapes() {
        let wrapped = serde_json::json!({"users": [{"id": "joseph", "name": "Joseph Smith"}]});
        assert_eq!(members_from_body(wrapped).unwrap().len(), 1);

        let bare = serde_json::json!([{"id": 4, "name": "Sam Lee"}]);
        assert_eq!(members_from_body(bare).unwrap().len(), 1);

        let err = members_from_body(serde_json::json!({"members": []})).unwrap_err();
        assert!(err.to_string().contains("Unexpected team member response shape"));
        assert!(members_from_body(serde_json::json!("users")).is_err());
    }

    #[tokio::test]
    async fn test_add_note_reports_gateway_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = "<html>Bad Gateway</html>";
            let response = format!(
                "HTTP/1.1 502 Bad Gateway\r\ncontent-type: text/html\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let client = JobsApiClient::new(ApiConfig::new(format!("http://{}", addr), "t"));
        let err = client.add_note("12", "tell @joseph").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("502"), "{}", message);
        assert!(message.contains("Request failed"), "{}", message);
    }

    #[test]
    fn test_note_request_shape() {
        let json = serde_json::to_value(NoteRequest { text: "tell @joseph" }).unwrap();
        assert_eq!(json, serde_json::json!({"text": "tell @joseph"}));
    }
}
