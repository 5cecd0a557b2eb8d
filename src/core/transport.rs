use crate::config::ImportSettings;
use crate::domain::model::{BulkItem, BulkItemStatus, BulkResponse, FlushResult};
use crate::domain::ports::BulkSink;
use crate::utils::error::{ImportError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::io::{Stdout, Write};
use std::sync::Mutex;
use url::{Host, Url};

const MAX_ERROR_BODY_CHARS: usize = 500;

/// Credentials may travel over TLS, or in clear text to this machine only.
pub fn may_send_credentials(url: &Url) -> bool {
    if url.scheme() == "https" {
        return true;
    }
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// POSTs batches to `<address>/_bulk`, one fresh connection per batch.
pub struct HttpBulkTransport {
    client: Client,
    url: Url,
    credentials: Option<(String, String)>,
}

impl HttpBulkTransport {
    pub fn new(settings: &ImportSettings) -> Result<Self> {
        let url = Url::parse(&settings.bulk_url()).map_err(|e| ImportError::InvalidConfigValueError {
            field: "elastic_address".to_string(),
            value: settings.elastic_address.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let credentials = match settings.credentials() {
            Some((user, password)) if may_send_credentials(&url) => {
                Some((user.to_string(), password.to_string()))
            }
            Some(_) => {
                tracing::warn!(
                    "⚠️ Not sending credentials to {}: connection is neither encrypted nor local (use --ssl)",
                    url
                );
                None
            }
            None => None,
        };

        Ok(Self {
            client,
            url,
            credentials,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn sends_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait::async_trait]
impl BulkSink for HttpBulkTransport {
    async fn send_bulk(&self, body: String) -> Result<FlushResult> {
        tracing::debug!("POST {} ({} bytes)", self.url, body.len());

        let mut request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/plain")
            .body(body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send().await?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let text = response.text().await?;

        tracing::debug!("Bulk response status: {}", status);

        if !status.is_success() {
            return Err(ImportError::HttpStatusError {
                status: status.as_u16(),
                reason,
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body: BulkResponse =
            serde_json::from_str(&text).map_err(|source| ImportError::ResponseError { source })?;

        Ok(FlushResult {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

/// Writes each batch instead of sending it (`--dry-run`), so the output is
/// exactly the NDJSON that would have been POSTed.
pub struct DryRunSink<W: Write + Send> {
    out: Mutex<W>,
    to_stdout: bool,
}

impl DryRunSink<Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: Mutex::new(std::io::stdout()),
            to_stdout: true,
        }
    }
}

impl<W: Write + Send> DryRunSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: Mutex::new(writer),
            to_stdout: false,
        }
    }
}

#[async_trait::async_trait]
impl<W: Write + Send> BulkSink for DryRunSink<W> {
    async fn send_bulk(&self, body: String) -> Result<FlushResult> {
        {
            let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            out.write_all(body.as_bytes())?;
            out.flush()?;
        }
        let items = (0..body.lines().count() / 2)
            .map(|_| {
                BulkItem::Index(BulkItemStatus {
                    index: None,
                    id: None,
                    result: Some("noop".to_string()),
                    status: 200,
                    error: None,
                })
            })
            .collect();
        Ok(FlushResult {
            status: 200,
            reason: "DRY RUN".to_string(),
            body: BulkResponse {
                took: None,
                errors: false,
                items,
            },
        })
    }

    fn writes_to_stdout(&self) -> bool {
        self.to_stdout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings_for(server: &MockServer) -> ImportSettings {
        ImportSettings {
            elastic_address: server.address().to_string(),
            csv_file: "input.csv".to_string(),
            json_struct: "{}".to_string(),
            elastic_index: "people".to_string(),
            ..ImportSettings::default()
        }
    }

    #[test]
    fn test_credentials_policy() {
        let url = |s: &str| Url::parse(s).unwrap();
        assert!(may_send_credentials(&url("https://search.example.com:9200/_bulk")));
        assert!(may_send_credentials(&url("http://localhost:9200/_bulk")));
        assert!(may_send_credentials(&url("http://127.0.0.1:9200/_bulk")));
        assert!(may_send_credentials(&url("http://[::1]:9200/_bulk")));
        assert!(!may_send_credentials(&url("http://search.example.com:9200/_bulk")));
        assert!(!may_send_credentials(&url("http://10.0.0.5:9200/_bulk")));
    }

    #[test]
    fn test_remote_plain_http_drops_credentials() {
        let settings = ImportSettings {
            elastic_address: "search.example.com:9200".to_string(),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..ImportSettings::default()
        };
        let transport = HttpBulkTransport::new(&settings).unwrap();
        assert!(!transport.sends_credentials());

        let secure = ImportSettings { ssl: true, ..settings };
        assert!(HttpBulkTransport::new(&secure).unwrap().sends_credentials());
    }

    #[tokio::test]
    async fn test_send_bulk_posts_body_with_headers_and_auth() {
        let server = MockServer::start();
        let bulk_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/_bulk")
                .header("content-type", "application/json")
                .header("accept", "text/plain")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body("{\"index\":{\"_index\":\"people\"}}\n{\"a\":1}\n");
            then.status(200).json_body(serde_json::json!({
                "took": 1,
                "errors": false,
                "items": [{"index": {"_index": "people", "_id": "x", "status": 201, "result": "created"}}]
            }));
        });

        let settings = ImportSettings {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..settings_for(&server)
        };
        let transport = HttpBulkTransport::new(&settings).unwrap();
        let result = transport
            .send_bulk("{\"index\":{\"_index\":\"people\"}}\n{\"a\":1}\n".to_string())
            .await
            .unwrap();

        bulk_mock.assert();
        assert_eq!(result.status, 200);
        assert_eq!(result.reason, "OK");
        assert!(!result.body.errors);
        assert_eq!(result.body.items.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start();
        let bulk_mock = server.mock(|when, then| {
            when.method(POST).path("/_bulk");
            then.status(401).body("unauthorized");
        });

        let transport = HttpBulkTransport::new(&settings_for(&server)).unwrap();
        let err = transport.send_bulk("{}\n{}\n".to_string()).await.unwrap_err();

        bulk_mock.assert();
        match err {
            ImportError::HttpStatusError { status, reason, body } => {
                assert_eq!(status, 401);
                assert_eq!(reason, "Unauthorized");
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dry_run_writes_body_verbatim() {
        let sink = DryRunSink::new(Vec::new());
        let body = "{\"index\":{\"_index\":\"people\"}}\n{\"a\":1}\n";
        let result = sink.send_bulk(body.to_string()).await.unwrap();

        assert_eq!(result.body.items.len(), 1);
        assert!(!sink.writes_to_stdout());
        assert!(DryRunSink::stdout().writes_to_stdout());
        let written = sink.out.into_inner().unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), body);
    }

    #[tokio::test]
    async fn test_unparsable_body_is_response_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/_bulk");
            then.status(200).body("<html>proxy</html>");
        });

        let transport = HttpBulkTransport::new(&settings_for(&server)).unwrap();
        let err = transport.send_bulk("{}\n{}\n".to_string()).await.unwrap_err();
        assert!(matches!(err, ImportError::ResponseError { .. }));
    }
}
