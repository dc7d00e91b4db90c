// src/infrastructure/market/mod.rs
// Yahoo Finance price-history repository implementation

use std::time::Duration;
use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, USER_AGENT};
use hyper::{Body, Client, Request, Uri};
use hyper_tls::HttpsConnector;
use url::{form_urlencoded, Url};

use crate::application::dto::parser::parse_chart_response;
use crate::config::ProviderConfig;
use crate::domain::errors::{AppError, AppResult, FetchError, FetchResult};
use crate::domain::model::{HistoryRange, PriceSeries, TickerSymbol};
use crate::domain::repository::PriceHistoryRepository;

// The chart endpoint rejects requests without a browser-like agent
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct YahooChartRepository {
    client: Client<HttpsConnector<HttpConnector>>,
    base_url: Url,
    range: HistoryRange,
    timeout: Option<Duration>,
}

impl YahooChartRepository {
    pub fn new(base_url: &str, range: HistoryRange, timeout: Option<Duration>) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Config(format!("Invalid provider base URL '{}': {}", base_url, e))
        })?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "Provider base URL must be an http(s) URL: {}",
                base_url
            )));
        }

        let https = HttpsConnector::new();
        let client = Client::builder().build::<_, Body>(https);

        Ok(Self {
            client,
            base_url,
            range,
            timeout,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> AppResult<Self> {
        Self::new(
            &config.base_url,
            config.history_range,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Chart endpoint for one ticker over the configured daily window.
    pub fn chart_url(&self, ticker: &TickerSymbol) -> Url {
        let mut url = self.base_url.clone();

        // Symbols such as ^GSPC must be escaped inside the path
        let symbol: String = form_urlencoded::byte_serialize(ticker.as_str().as_bytes()).collect();
        let path = format!(
            "{}/v8/finance/chart/{}",
            self.base_url.path().trim_end_matches('/'),
            symbol
        );
        url.set_path(&path);

        url.query_pairs_mut()
            .clear()
            .append_pair("range", self.range.as_str())
            .append_pair("interval", "1d")
            .append_pair("events", "div,splits")
            .append_pair("includePrePost", "false");

        url
    }

    async fn send(&self, url: &Url) -> FetchResult<(u16, Bytes)> {
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| FetchError::Transport(format!("Invalid request URI {}: {}", url, e)))?;

        let request = Request::get(uri)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "application/json")
            .body(Body::empty())
            .map_err(|e| FetchError::Transport(format!("Failed to build request: {}", e)))?;

        let response = self.client.request(request).await?;
        let status = response.status().as_u16();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        Ok((status, body))
    }
}

#[async_trait]
impl PriceHistoryRepository for YahooChartRepository {
    async fn fetch_history(&self, ticker: &TickerSymbol) -> FetchResult<PriceSeries> {
        let url = self.chart_url(ticker);
        log::debug!("Requesting {}", url);

        let (status, body) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.send(&url))
                .await
                .map_err(|_| {
                    FetchError::Transport(format!("Request timed out after {:?}", limit))
                })??,
            None => self.send(&url).await?,
        };

        log::debug!("Provider answered {} with {} bytes", status, body.len());
        parse_chart_response(status, &body)
    }
}
