use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::common::write_file_atomic;
use crate::error::{OfferError, Result};
use crate::offer::Offer;

/// Destination for a finished batch. Failures are surfaced, never retried.
#[allow(async_fn_in_trait)]
pub trait SubmissionSink {
    async fn submit(&self, offers: &[Offer]) -> Result<()>;
}

/// Posts the batch as a JSON array to `<api_base>/offers`.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OfferError::SubmissionFailed {
                message: "failed to build HTTP client".into(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/offers", api_base.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts any JSON body to the offers endpoint.
    pub async fn post_json<T: Serialize + ?Sized>(&self, body: &T) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| OfferError::SubmissionFailed {
                message: format!("request to {} failed", self.endpoint),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OfferError::SubmissionFailed {
                message: format!("{} responded {}: {}", self.endpoint, status, body.trim()),
                source: None,
            });
        }
        info!(%status, "Batch accepted");
        Ok(())
    }
}

impl SubmissionSink for HttpSink {
    async fn submit(&self, offers: &[Offer]) -> Result<()> {
        info!(endpoint = %self.endpoint, offers = offers.len(), "Submitting batch");
        self.post_json(offers).await
    }
}

/// Writes the batch as pretty JSON to a local file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SubmissionSink for FileSink {
    async fn submit(&self, offers: &[Offer]) -> Result<()> {
        let failed = |message: String, e: Box<dyn std::error::Error + Send + Sync>| {
            OfferError::SubmissionFailed {
                message,
                source: Some(e),
            }
        };
        let json = serde_json::to_string_pretty(offers)
            .map_err(|e| failed("failed to serialize offers".into(), Box::new(e)))?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_file_atomic(&path, &json))
            .await
            .map_err(|e| failed("write task failed".into(), Box::new(e)))?
            .map_err(|e| failed(format!("failed to write {}", self.path.display()), e.into()))?;
        info!(path = %self.path.display(), offers = offers.len(), "Wrote offers");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_sink_endpoint() {
        let sink = HttpSink::new("https://api-test.nfpawn.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(sink.endpoint(), "https://api-test.nfpawn.com/offers");
    }

    #[tokio::test]
    async fn test_http_sink_transport_error() {
        let sink = HttpSink::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = sink.submit(&[]).await.unwrap_err();
        match err {
            OfferError::SubmissionFailed { source, .. } => assert!(source.is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_http_sink_server_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"[]") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        let sink = HttpSink::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let err = sink.submit(&[]).await.unwrap_err();
        match err {
            OfferError::SubmissionFailed { message, source } => {
                assert!(source.is_none());
                assert!(message.contains("500"), "{message}");
                assert!(message.ends_with(": boom"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /offers "), "{request}");
    }

    #[tokio::test]
    async fn test_file_sink_writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.json");
        FileSink::new(&path).submit(&[]).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
