//! HTTP probe backed by `reqwest`

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{LauncherError, LauncherResult};
use crate::traits::{HttpProbe, HttpReply};

#[derive(Clone)]
pub struct RealHttpProbe {
    client: reqwest::Client,
}

impl RealHttpProbe {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> LauncherResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LauncherError::http("client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for RealHttpProbe {
    async fn get(&self, url: &str) -> LauncherResult<HttpReply> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LauncherError::http(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| LauncherError::http(url, e))?;

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chart-data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .mount(&server)
            .await;

        let probe = RealHttpProbe::new(Duration::from_secs(2)).unwrap();
        let reply = probe
            .get(&format!("{}/api/chart-data", server.uri()))
            .await
            .unwrap();

        assert!(reply.is_ok());
        assert_eq!(reply.body, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_non_200_is_a_reply_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let probe = RealHttpProbe::new(Duration::from_secs(2)).unwrap();
        let reply = probe.get(&format!("{}/health", server.uri())).await.unwrap();

        assert_eq!(reply.status, 503);
        assert!(!reply.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = RealHttpProbe::new(Duration::from_secs(1)).unwrap();
        let result = probe.get(&format!("http://{addr}/health")).await;

        assert!(matches!(result, Err(LauncherError::Http { .. })));
    }
}
