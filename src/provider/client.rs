//! HTTP client with request spacing and an optional response cache

use super::cache::ResponseCache;
use super::{ProviderConfig, ProviderError};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Outcome of a single GET
enum Fetched {
    Body(String),
    NotFound,
}

/// JSON API client shared by the Ergast and OpenF1 endpoints
pub struct ApiClient {
    client: reqwest::Client,
    config: ProviderConfig,
    cache: Option<ResponseCache>,
    last_request: Mutex<Option<Instant>>,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        let cache = config.cache_dir.as_ref().map(ResponseCache::new);

        Ok(Self {
            client,
            config,
            cache,
            last_request: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Wait until the configured delay since the previous request has passed
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let delay = Duration::from_millis(self.config.delay_ms);

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < delay {
                tokio::time::sleep(delay - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Join base URL, path and query parameters
    pub(crate) fn build_url(
        base: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        let raw = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let url = if query.is_empty() {
            reqwest::Url::parse(&raw)
        } else {
            reqwest::Url::parse_with_params(&raw, query)
        }
        .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", raw, e)))?;

        Ok(url.to_string())
    }

    /// GET a URL from the network
    async fn fetch(&self, url: &str) -> Result<Fetched, ProviderError> {
        self.wait_for_rate_limit().await;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Fetched::NotFound);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Fetched::Body(response.text().await?))
    }

    fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ProviderError> {
        serde_json::from_str(body).map_err(|source| ProviderError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Decoded response for a URL, `None` on 404.
    ///
    /// Cache entries that no longer decode are ignored. Only bodies that
    /// decoded and carry results are written back.
    async fn fetch_decoded<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, ProviderError> {
        if let Some(body) = self.cache.as_ref().and_then(|c| c.get(url)) {
            match serde_json::from_str(&body) {
                Ok(value) => {
                    tracing::debug!("Cache hit: {}", url);
                    return Ok(Some(value));
                }
                Err(e) => tracing::warn!("Ignoring unreadable cache entry for {}: {}", url, e),
            }
        }

        let body = match self.fetch(url).await? {
            Fetched::Body(body) => body,
            Fetched::NotFound => return Ok(None),
        };
        let value = Self::decode(url, &body)?;

        if let Some(cache) = &self.cache {
            if has_results(&body) {
                if let Err(e) = cache.put(url, &body) {
                    tracing::warn!("Failed to cache response in {:?}: {}", cache.dir(), e);
                }
            } else {
                tracing::debug!("Not caching empty response from {}", url);
            }
        }

        Ok(Some(value))
    }

    /// GET and decode JSON; any non-success status is an error
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        base: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = Self::build_url(base, path, query)?;

        match self.fetch_decoded(&url).await? {
            Some(value) => Ok(value),
            None => Err(ProviderError::Status { url, status: 404 }),
        }
    }

    /// GET and decode JSON, treating 404 as "no results"
    pub(crate) async fn get_json_or_default<T: DeserializeOwned + Default>(
        &self,
        base: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = Self::build_url(base, path, query)?;

        match self.fetch_decoded(&url).await? {
            Some(value) => Ok(value),
            None => {
                tracing::debug!("No results at {}", url);
                Ok(T::default())
            }
        }
    }
}

/// False for bodies that say "nothing yet": an empty JSON array or an Ergast
/// envelope with no races. Those may fill in later and must not be cached.
fn has_results(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };
    if let Some(races) = value.pointer("/MRData/RaceTable/Races") {
        return races.as_array().is_some_and(|r| !r.is_empty());
    }
    value.as_array().map_or(true, |items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Probe {
        value: u32,
    }

    fn test_client(server: &MockServer, cache_dir: Option<std::path::PathBuf>) -> ApiClient {
        let config = ProviderConfig {
            ergast_base_url: server.uri(),
            openf1_base_url: server.uri(),
            delay_ms: 0,
            cache_dir,
            ..Default::default()
        };
        ApiClient::new(config).expect("failed to create client")
    }

    #[test]
    fn test_build_url_without_query() {
        let url = ApiClient::build_url("https://api.jolpi.ca/ergast/f1/", "/2024.json", &[]).unwrap();
        assert_eq!(url, "https://api.jolpi.ca/ergast/f1/2024.json");
    }

    #[test]
    fn test_build_url_with_query() {
        let url = ApiClient::build_url(
            "https://api.openf1.org/v1",
            "laps",
            &[("session_key", "9523".to_string())],
        )
        .unwrap();
        assert_eq!(url, "https://api.openf1.org/v1/laps?session_key=9523");
    }

    #[test]
    fn test_build_url_invalid_base() {
        let result = ApiClient::build_url("not a url", "x", &[]);
        assert!(matches!(result, Err(ProviderError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .and(query_param("id", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 7}"#))
            .mount(&server)
            .await;

        let client = test_client(&server, None);
        let probe: Probe = client
            .get_json(&server.uri(), "probe", &[("id", "7".to_string())])
            .await
            .expect("request failed");

        assert_eq!(probe, Probe { value: 7 });
    }

    #[tokio::test]
    async fn test_get_json_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server, None);
        let result: Result<Probe, _> = client.get_json(&server.uri(), "probe", &[]).await;

        assert!(matches!(
            result,
            Err(ProviderError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_or_default_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"detail":"No results found."}"#),
            )
            .mount(&server)
            .await;

        let client = test_client(&server, None);
        let probes: Vec<Probe> = client
            .get_json_or_default(&server.uri(), "probe", &[])
            .await
            .expect("404 should map to empty");

        assert!(probes.is_empty());
    }

    #[tokio::test]
    async fn test_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = test_client(&server, None);
        let result: Result<Probe, _> = client.get_json(&server.uri(), "probe", &[]).await;

        assert!(matches!(result, Err(ProviderError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_cached_response_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 1}"#))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, Some(dir.path().to_path_buf()));

        let first: Probe = client.get_json(&server.uri(), "probe", &[]).await.unwrap();
        let second: Probe = client.get_json(&server.uri(), "probe", &[]).await.unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_has_results() {
        assert!(has_results(r#"[{"value": 1}]"#));
        assert!(has_results(r#"{"value": 1}"#));
        assert!(!has_results("[]"));
        assert!(!has_results(r#"{"MRData":{"total":"0","RaceTable":{"Races":[]}}}"#));
        assert!(has_results(
            r#"{"MRData":{"total":"1","RaceTable":{"Races":[{"round":"1"}]}}}"#
        ));
        assert!(!has_results("<html>oops</html>"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 3}"#))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, Some(dir.path().to_path_buf()));

        let first: Result<Probe, _> = client.get_json(&server.uri(), "probe", &[]).await;
        assert!(matches!(first, Err(ProviderError::Decode { .. })));

        let second: Probe = client.get_json(&server.uri(), "probe", &[]).await.unwrap();
        assert_eq!(second, Probe { value: 3 });
    }

    #[tokio::test]
    async fn test_empty_results_are_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"value": 5}]"#))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, Some(dir.path().to_path_buf()));

        let first: Vec<Probe> = client.get_json(&server.uri(), "probe", &[]).await.unwrap();
        assert!(first.is_empty());

        let second: Vec<Probe> = client.get_json(&server.uri(), "probe", &[]).await.unwrap();
        assert_eq!(second, vec![Probe { value: 5 }]);
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_falls_back_to_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 9}"#))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = test_client(&server, Some(dir.path().to_path_buf()));
        let url = ApiClient::build_url(&server.uri(), "probe", &[]).unwrap();
        ResponseCache::new(dir.path()).put(&url, "<html>stale</html>").unwrap();

        let probe: Probe = client.get_json(&server.uri(), "probe", &[]).await.unwrap();
        assert_eq!(probe, Probe { value: 9 });

        let cached: Probe = client.get_json(&server.uri(), "probe", &[]).await.unwrap();
        assert_eq!(cached, Probe { value: 9 });
    }
}
