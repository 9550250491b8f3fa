use crate::model::FetchError;
use crate::scraper::traits::FeedSource;
use crate::utils::parse_http_date;
use chrono::{DateTime, Utc};
use reqwest::header::LAST_MODIFIED;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{info, warn};

pub struct HttpFeedSource {
    client: Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn check_status(response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            warn!("Feed endpoint responded [{}]", status);
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpFeedSource {
    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, FetchError> {
        let response = Self::check_status(self.client.head(&self.url).send().await?)?;
        info!("Feed endpoint head returned success.");

        let header = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok());
        let parsed = header.and_then(parse_http_date);
        if let (Some(raw), None) = (header, parsed) {
            warn!("Unreadable Last-Modified header: {}", raw);
        }
        Ok(parsed)
    }

    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let response = Self::check_status(self.client.get(&self.url).send().await?)?;
        let body = response.bytes().await?;
        info!("Downloaded {} bytes from feed endpoint", body.len());
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> HttpFeedSource {
        HttpFeedSource::new(
            format!("{}/feed.xml", server.uri()),
            Duration::from_secs(5),
            "hubber-diff-test/0.1",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reads_last_modified_header() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/feed.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
            )
            .mount(&server)
            .await;

        let modified = source(&server).last_modified().await.unwrap();
        assert_eq!(modified.map(|dt| dt.timestamp()), Some(1_445_412_480));
    }

    #[tokio::test]
    async fn missing_last_modified_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert_eq!(source(&server).last_modified().await.unwrap(), None);
    }

    #[tokio::test]
    async fn fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<yml_catalog/>"))
            .mount(&server)
            .await;

        let body = source(&server).fetch().await.unwrap();
        assert_eq!(body, b"<yml_catalog/>");
    }

    #[tokio::test]
    async fn server_errors_are_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source(&server).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(503)), "{err:?}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn client_errors_are_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source(&server).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn rate_limiting_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = source(&server).last_modified().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(429)), "{err:?}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn timeouts_are_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        let impatient = HttpFeedSource::new(
            format!("{}/feed.xml", server.uri()),
            Duration::from_millis(100),
            "hubber-diff-test/0.1",
        )
        .unwrap();

        let err = impatient.fetch().await.unwrap_err();
        assert!(matches!(&err, FetchError::Http(e) if e.is_timeout()), "{err:?}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn refused_connections_are_retryable() {
        // Grab a free port, then close it so nothing is listening there.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let unreachable =
            HttpFeedSource::new(format!("http://{addr}/feed.xml"), Duration::from_secs(5), "hubber-diff-test/0.1")
                .unwrap();

        let err = unreachable.fetch().await.unwrap_err();
        assert!(matches!(&err, FetchError::Http(e) if e.is_connect()), "{err:?}");
        assert!(err.is_retryable());
    }
}
