use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::warn;
use url::Url;

use crate::error::{MirrorError, Result};
use crate::job::MirrorJob;

/// A successfully retrieved response body with its declared content
/// type, as reported by the origin server.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// HTTP fetch collaborator. One client per job, configured from the
/// job's headers and timeouts; failed requests are retried up to the
/// job's retry budget.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry_count: usize,
}

impl Fetcher {
    pub fn new(job: &MirrorJob) -> Result<Self> {
        let client = Client::builder()
            .user_agent(job.user_agent())
            .default_headers(job.headers().clone())
            .timeout(Duration::from_secs(job.timeout_secs()))
            .connect_timeout(Duration::from_secs(job.timeout_secs().div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            retry_count: job.retry_count(),
        })
    }

    /// Fetch `url` with up to `retry_count + 1` attempts. A transport
    /// error, a non-success status or an empty body fails the attempt
    /// and the same URL is retried immediately.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedBody> {
        let attempts = self.retry_count + 1;
        for attempt in 1..=attempts {
            match self.attempt(url).await {
                Ok(body) if !body.bytes.is_empty() => return Ok(body),
                Ok(_) => warn!("empty body from {}, attempt {}/{}", url, attempt, attempts),
                Err(err) => warn!("fetch of {} failed ({}), attempt {}/{}", url, err, attempt, attempts),
            }
        }
        Err(MirrorError::RetriesExhausted {
            url: url.to_string(),
            attempts,
        })
    }

    async fn attempt(&self, url: &Url) -> Result<FetchedBody> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedBody { bytes, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job_for(server: &MockServer, retry_count: usize) -> MirrorJob {
        let seed = Url::parse(&server.uri()).unwrap();
        MirrorJob::new("/tmp/webmirror-fetch-tests", seed).with_retry_count(retry_count)
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_bytes(b"<html></html>"),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&job_for(&server, 0)).unwrap();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();

        assert_eq!(body.bytes, b"<html></html>");
        assert_eq!(body.content_type.as_deref(), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&job_for(&server, 2)).unwrap();
        let url = Url::parse(&format!("{}/flaky", server.uri())).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();

        assert_eq!(body.bytes, b"ok");
    }

    #[tokio::test]
    async fn test_fetch_gives_up_after_retry_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&job_for(&server, 2)).unwrap();
        let url = Url::parse(&format!("{}/down", server.uri())).unwrap();
        let result = fetcher.fetch(&url).await;

        assert!(matches!(
            result,
            Err(MirrorError::RetriesExhausted { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thin"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/thin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"late"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&job_for(&server, 1)).unwrap();
        let url = Url::parse(&format!("{}/thin", server.uri())).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();

        assert_eq!(body.bytes, b"late");
    }
}
