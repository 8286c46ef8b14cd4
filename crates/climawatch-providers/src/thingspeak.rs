//! ThingSpeak channel client.
//!
//! `field1` carries temperature and `field2` humidity. Reads fetch the single
//! most recent entry; writes post one entry and return its id. Pacing between
//! writes is the caller's job.

use climawatch_core::settings::FeedSettings;
use climawatch_core::{ClimaError, FeedWriter, Reading, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    feeds: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    field1: Option<serde_json::Value>,
    #[serde(default)]
    field2: Option<serde_json::Value>,
}

/// ThingSpeak sends fields as strings, but tolerate bare numbers too.
fn field_text(value: &Option<serde_json::Value>) -> Option<String> {
    match value.as_ref()? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ThingSpeakClient {
    http: reqwest::Client,
    settings: FeedSettings,
}

impl ThingSpeakClient {
    pub fn new(settings: FeedSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: crate::http_client(timeout)?,
            settings,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.base_url.trim_end_matches('/'))
    }

    /// Read the latest entry of the configured channel.
    pub async fn read_configured(&self) -> Result<Option<Reading>> {
        let channel_id = self.settings.channel_id()?;
        self.read_latest(channel_id, self.settings.read_key.as_deref())
            .await
    }

    /// Fetch the most recent entry of `channel_id`.
    ///
    /// `Ok(None)` means the channel has no entries yet.
    pub async fn read_latest(
        &self,
        channel_id: &str,
        read_key: Option<&str>,
    ) -> Result<Option<Reading>> {
        let mut query = vec![("results", "1")];
        if let Some(key) = read_key {
            query.push(("api_key", key));
        }

        let url = self.url(&format!("/channels/{channel_id}/feeds.json"));
        debug!(%url, "reading latest feed entry");
        let resp = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(upstream)?;

        let status = resp.status();
        let body = resp.text().await.map_err(upstream)?;
        if !status.is_success() {
            return Err(ClimaError::UpstreamUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let parsed: FeedResponse = serde_json::from_str(&body).map_err(|e| {
            ClimaError::UpstreamUnavailable(format!("respuesta inesperada del feed ({e}): {}", body.trim()))
        })?;

        let Some(entry) = parsed.feeds.into_iter().next() else {
            return Ok(None);
        };
        let temperature = field_text(&entry.field1);
        let humidity = field_text(&entry.field2);
        Ok(Some(Reading::from_fields(
            temperature.as_deref(),
            humidity.as_deref(),
            entry.created_at,
        )))
    }

    /// Post one entry and return the provider's entry id.
    pub async fn write_reading(&self, temperature: f64, humidity: f64) -> Result<String> {
        let write_key = self.settings.write_key()?;
        let form = [
            ("api_key", write_key.to_string()),
            ("field1", temperature.to_string()),
            ("field2", humidity.to_string()),
        ];

        let resp = self
            .http
            .post(self.url("/update"))
            .form(&form)
            .send()
            .await
            .map_err(upstream)?;

        let status = resp.status();
        let body = resp.text().await.map_err(upstream)?;
        let token = body.trim();
        if !status.is_success() {
            return Err(ClimaError::UpstreamUnavailable(format!(
                "HTTP {}: {token}",
                status.as_u16()
            )));
        }
        if token.is_empty() || token == "0" {
            warn!(temperature, humidity, "feed refused write");
            return Err(ClimaError::WriteRejected(
                "entry id 0 (actualización no aceptada; las escrituras deben separarse al menos 15 s)".into(),
            ));
        }
        Ok(token.to_string())
    }
}

impl FeedWriter for ThingSpeakClient {
    async fn write_reading(&self, temperature: f64, humidity: f64) -> Result<String> {
        ThingSpeakClient::write_reading(self, temperature, humidity).await
    }
}

fn upstream(e: reqwest::Error) -> ClimaError {
    ClimaError::UpstreamUnavailable(e.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(base_url: String) -> ThingSpeakClient {
        client_with_timeout(base_url, Duration::from_secs(2))
    }

    fn client_with_timeout(base_url: String, timeout: Duration) -> ThingSpeakClient {
        ThingSpeakClient::new(
            FeedSettings {
                base_url,
                channel_id: Some("123".into()),
                read_key: Some("READ".into()),
                write_key: Some("WRITE".into()),
            },
            timeout,
        )
        .unwrap()
    }

    /// Accepts connections and never answers.
    async fn silent_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn read_latest_parses_entry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/channels/123/feeds.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("results".into(), "1".into()),
                Matcher::UrlEncoded("api_key".into(), "READ".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"channel":{"id":123},"feeds":[{"created_at":"2024-05-01T10:00:00Z","entry_id":7,"field1":"23.8","field2":"61"}]}"#,
            )
            .create_async()
            .await;

        let reading = client(server.url()).read_configured().await.unwrap().unwrap();
        assert_eq!(reading.temperature, Some(23));
        assert_eq!(reading.humidity, Some(61));
        assert_eq!(reading.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_feed_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/channels/123/feeds.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"channel":{"id":123},"feeds":[]}"#)
            .create_async()
            .await;

        assert!(client(server.url()).read_configured().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_numeric_field_becomes_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/channels/123/feeds.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"feeds":[{"created_at":null,"field1":"err","field2":45.5}]}"#)
            .create_async()
            .await;

        let reading = client(server.url()).read_configured().await.unwrap().unwrap();
        assert_eq!(reading.temperature, None);
        assert_eq!(reading.humidity, Some(45));
    }

    #[tokio::test]
    async fn read_without_key_omits_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/channels/9/feeds.json")
            .match_query(Matcher::Exact("results=1".into()))
            .with_body(r#"{"feeds":[]}"#)
            .create_async()
            .await;

        client(server.url()).read_latest("9", None).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_upstream_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/channels/123/feeds.json")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        match client(server.url()).read_configured().await {
            Err(ClimaError::UpstreamUnavailable(msg)) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("maintenance"));
            }
            other => panic!("expected UpstreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_upstream_unavailable() {
        let c = client("http://127.0.0.1:1".into());
        assert!(matches!(
            c.read_configured().await,
            Err(ClimaError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn slow_feed_times_out_as_upstream_unavailable() {
        let c = client_with_timeout(silent_endpoint().await, Duration::from_millis(200));
        assert!(matches!(
            c.read_configured().await,
            Err(ClimaError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            c.write_reading(20.0, 50.0).await,
            Err(ClimaError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn write_returns_entry_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/update")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "WRITE".into()),
                Matcher::UrlEncoded("field1".into(), "10.5".into()),
                Matcher::UrlEncoded("field2".into(), "85".into()),
            ]))
            .with_body("4711")
            .create_async()
            .await;

        let token = client(server.url()).write_reading(10.5, 85.0).await.unwrap();
        assert_eq!(token, "4711");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn write_zero_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/update")
            .with_body("0")
            .create_async()
            .await;

        assert!(matches!(
            client(server.url()).write_reading(10.0, 85.0).await,
            Err(ClimaError::WriteRejected(_))
        ));
    }

    #[tokio::test]
    async fn write_without_key_is_config_missing() {
        let c = ThingSpeakClient::new(
            FeedSettings {
                base_url: "http://127.0.0.1:1".into(),
                channel_id: None,
                read_key: None,
                write_key: None,
            },
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(matches!(
            c.write_reading(1.0, 2.0).await,
            Err(ClimaError::ConfigMissing(_))
        ));
    }
}
