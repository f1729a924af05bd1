use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use url::Url;

use super::models::{Article, HeadlineQuery, HeadlinesResponse};
use super::HeadlineSource;
use crate::config::AppConfig;
use crate::{Error, Result};

const API_KEY_HEADER: &str = "X-Api-Key";
const TOP_HEADLINES_PATH: &str = "top-headlines";
const CLIENT_USER_AGENT: &str = concat!("newsdigest/", env!("CARGO_PKG_VERSION"));

/// Client for the `top-headlines` endpoint of a NewsAPI-compatible service
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    /// Create a new news client with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(config.news.request_timeout_secs)?;

        // Fail on a bad base URL here rather than on every fetch
        Url::parse(&config.news.base_url)?;

        Ok(Self {
            client,
            base_url: config.news.base_url.clone(),
            api_key: config.news.resolved_api_key(),
        })
    }

    /// Build HTTP client; a timeout of 0 means none
    fn build_client(timeout_secs: u64) -> Result<Client> {
        let mut builder = Client::builder()
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        builder.build().map_err(Error::Http)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(ref key) = self.api_key {
            match HeaderValue::from_str(key) {
                Ok(value) => {
                    headers.insert(API_KEY_HEADER, value);
                }
                Err(_) => tracing::warn!("News API key contains invalid header characters, sending request without it"),
            }
        }
        headers
    }

    /// Full request URL for a query
    pub fn endpoint(&self, query: &HeadlineQuery) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, TOP_HEADLINES_PATH))?;
        url.query_pairs_mut()
            .append_pair("country", query.country.code())
            .append_pair("category", query.category.as_str())
            .append_pair("pageSize", &query.page_size.get().to_string());
        Ok(url)
    }

    /// Fetch headlines, reporting why a fetch failed
    ///
    /// Issues exactly one request. Never returns more than the requested page size.
    pub async fn try_fetch(&self, query: &HeadlineQuery) -> Result<Vec<Article>> {
        let url = self.endpoint(query)?;

        tracing::info!("Fetching headlines for {}", query);
        tracing::debug!("GET {}", url.path());

        let response = self
            .client
            .get(url)
            .headers(self.build_headers())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // NewsAPI reports auth and quota problems with an error envelope
            let (code, message) = match serde_json::from_str::<HeadlinesResponse>(&body) {
                Ok(envelope) => (
                    envelope.code.unwrap_or_else(|| status.as_str().to_string()),
                    envelope.message.unwrap_or_else(|| format!("HTTP {}", status)),
                ),
                Err(_) => (status.as_str().to_string(), format!("HTTP {}", status)),
            };
            return Err(Error::Api { code, message });
        }

        let envelope: HeadlinesResponse = serde_json::from_str(&body)?;

        if envelope.status != "ok" {
            return Err(Error::Api {
                code: envelope.code.unwrap_or_else(|| envelope.status.clone()),
                message: envelope.message.unwrap_or_else(|| "request rejected".to_string()),
            });
        }

        let mut articles = envelope.articles;
        articles.truncate(query.page_size.get());

        tracing::debug!("Received {} articles", articles.len());

        Ok(articles)
    }
}

#[async_trait::async_trait]
impl HeadlineSource for NewsClient {
    async fn fetch_headlines(&self, query: &HeadlineQuery) -> Vec<Article> {
        match self.try_fetch(query).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!("Headline fetch for {} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::{Category, Country, PageSize};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        config.news.base_url = server.uri();
        config.news.api_key = Some("test-key".to_string());
        config
    }

    fn client_for(server: &MockServer) -> NewsClient {
        NewsClient::new(&test_config(server)).unwrap()
    }

    fn query(count: u8) -> HeadlineQuery {
        HeadlineQuery::new(Country::Us, Category::Technology, PageSize::new(count).unwrap())
    }

    fn article_json(i: usize) -> serde_json::Value {
        json!({
            "source": { "id": null, "name": format!("Source {}", i) },
            "title": format!("Headline {}", i),
            "url": format!("https://example.com/{}", i),
            "content": format!("Body of article {}", i),
            "publishedAt": "2024-03-05T14:07:00Z"
        })
    }

    #[test]
    fn test_endpoint_query_parameters() {
        let mut config = AppConfig::default();
        config.news.base_url = "https://newsapi.org/v2/".to_string();
        let client = NewsClient::new(&config).unwrap();

        let url = client.endpoint(&query(3)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/top-headlines?country=us&category=technology&pageSize=3"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = AppConfig::default();
        config.news.base_url = "not a url".to_string();
        assert!(NewsClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_sends_selection_and_key() {
        let server = MockServer::start().await;
        // An API key in the environment takes precedence over the file
        let expected_key = test_config(&server).news.resolved_api_key().unwrap();
        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "us"))
            .and(query_param("category", "technology"))
            .and(query_param("pageSize", "3"))
            .and(header("X-Api-Key", expected_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "totalResults": 3,
                "articles": [article_json(1), article_json(2), article_json(3)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server).fetch_headlines(&query(3)).await;
        let titles: Vec<_> = articles.iter().map(|a| a.title_or_placeholder()).collect();
        assert_eq!(titles, vec!["Headline 1", "Headline 2", "Headline 3"]);
    }

    #[tokio::test]
    async fn test_fetch_never_exceeds_page_size() {
        let server = MockServer::start().await;
        let many: Vec<_> = (0..12).map(article_json).collect();
        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "totalResults": 12,
                "articles": many
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        for n in PageSize::MIN..=PageSize::MAX {
            let articles = client.fetch_headlines(&query(n)).await;
            assert!(articles.len() <= n as usize);
        }
    }

    #[tokio::test]
    async fn test_api_error_reports_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "status": "error",
                "code": "rateLimited",
                "message": "You have made too many requests recently."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.try_fetch(&query(5)).await {
            Err(Error::Api { code, .. }) => assert_eq!(code, "rateLimited"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid or incorrect."
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client_for(&server).fetch_headlines(&query(5)).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_in_ok_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "code": "parametersMissing",
                "message": "Required parameters are missing."
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).fetch_headlines(&query(5)).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(client.try_fetch(&query(5)).await, Err(Error::Json(_))));
        assert!(client.fetch_headlines(&query(5)).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_degrades_to_empty() {
        let mut config = AppConfig::default();
        config.news.base_url = "http://127.0.0.1:1".to_string();
        let client = NewsClient::new(&config).unwrap();

        assert!(matches!(client.try_fetch(&query(5)).await, Err(Error::Http(_))));
        assert!(client.fetch_headlines(&query(5)).await.is_empty());
    }
}
