use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::PriceSnapshot;

pub const DEFAULT_BASE_API: &str = "https://api.gateio.ws/api/v4";
pub const DEFAULT_CURRENCY_PAIR: &str = "wit_usdt";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("price feed unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("price feed returned status {0}")]
    Status(StatusCode),

    #[error("malformed price feed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("price feed returned no tickers")]
    Empty,

    #[error("ticker record is missing `{0}`")]
    MissingField(&'static str),
}

/// Anything that can produce one price snapshot per call.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<PriceSnapshot, FetchError>;
}

#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base_api: String,
    currency_pair: String,
}

impl PriceClient {
    pub fn new(
        base_api: impl Into<String>,
        currency_pair: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(client, base_api, currency_pair))
    }

    pub fn with_client(
        client: Client,
        base_api: impl Into<String>,
        currency_pair: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_api: base_api.into(),
            currency_pair: currency_pair.into(),
        }
    }

    /// Gate.io spot tickers for `wit_usdt` unless GATE_IO_API_URL or
    /// CURRENCY_PAIR override them.
    pub fn from_env() -> Result<Self, FetchError> {
        let base_api =
            std::env::var("GATE_IO_API_URL").unwrap_or_else(|_| DEFAULT_BASE_API.to_string());
        let currency_pair =
            std::env::var("CURRENCY_PAIR").unwrap_or_else(|_| DEFAULT_CURRENCY_PAIR.to_string());
        Self::new(base_api, currency_pair)
    }

    pub fn currency_pair(&self) -> &str {
        &self.currency_pair
    }

    fn tickers_url(&self) -> String {
        format!("{}/spot/tickers", self.base_api.trim_end_matches('/'))
    }

    pub async fn fetch_ticker(&self) -> Result<PriceSnapshot, FetchError> {
        let res = self
            .client
            .get(self.tickers_url())
            .query(&[("currency_pair", self.currency_pair.as_str())])
            .send()
            .await?;

        let status = res.status();
        debug!(pair = %self.currency_pair, status = %status, "price feed responded");
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = res.bytes().await?;
        parse_tickers(&body)
    }
}

#[async_trait]
impl PriceSource for PriceClient {
    async fn fetch(&self) -> Result<PriceSnapshot, FetchError> {
        self.fetch_ticker().await
    }
}

//
// Match Gate.io spot ticker JSON
// https://www.gate.io/docs/developers/apiv4/#retrieve-ticker-information
//
#[derive(Debug, Deserialize, Clone)]
pub struct Ticker {
    #[serde(default)]
    pub last: Option<Decimal>,

    #[serde(default)]
    pub change_percentage: Option<Decimal>,
}

/// Reads the first ticker record of a Gate.io response body.
pub fn parse_tickers(body: &[u8]) -> Result<PriceSnapshot, FetchError> {
    let tickers: Vec<Ticker> = serde_json::from_slice(body)?;
    let first = tickers.into_iter().next().ok_or(FetchError::Empty)?;

    let price = first.last.ok_or(FetchError::MissingField("last"))?;
    let change = first
        .change_percentage
        .ok_or(FetchError::MissingField("change_percentage"))?;

    Ok(PriceSnapshot::new(price, change))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn parses_first_record_from_strings() {
        let body = br#"[
            {"currency_pair":"WIT_USDT","last":"0.0123","change_percentage":"-2.1"},
            {"currency_pair":"OTHER","last":"9","change_percentage":"9"}
        ]"#;

        let snapshot = parse_tickers(body).unwrap();
        assert_eq!(snapshot.price(), dec!(0.0123));
        assert_eq!(snapshot.change_percent(), dec!(-2.1));
    }

    #[test]
    fn accepts_numeric_fields() {
        let body = br#"[{"last":2,"change_percentage":0}]"#;

        let snapshot = parse_tickers(body).unwrap();
        assert_eq!(snapshot.price(), dec!(2));
        assert!(snapshot.change_percent().is_zero());
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(parse_tickers(b"[]"), Err(FetchError::Empty)));
    }

    #[test]
    fn missing_fields_are_reported() {
        assert!(matches!(
            parse_tickers(br#"[{"change_percentage":"1"}]"#),
            Err(FetchError::MissingField("last"))
        ));
        assert!(matches!(
            parse_tickers(br#"[{"last":"1"}]"#),
            Err(FetchError::MissingField("change_percentage"))
        ));
    }

    #[test]
    fn non_list_payload_is_a_decode_error() {
        let body = br#"{"label":"INVALID_CURRENCY","message":"unknown pair"}"#;
        assert!(matches!(parse_tickers(body), Err(FetchError::Decode(_))));
    }

    /// Serves one canned HTTP response and returns the base url.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 {status_line}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}")
    }

    fn local_client(base: String) -> PriceClient {
        let client = Client::builder().no_proxy().build().unwrap();
        PriceClient::with_client(client, base, "wit_usdt")
    }

    #[tokio::test]
    async fn fetch_reads_snapshot_over_http() {
        let body = r#"[{"last":"0.0050","change_percentage":"3.5"}]"#;
        let base = serve_once("200 OK", body).await;
        let client = local_client(base);

        let snapshot = client.fetch().await.unwrap();
        assert_eq!(snapshot.status_text(), "$0.0050 (+3.5%)");
    }

    #[tokio::test]
    async fn fetch_rejects_non_success_status() {
        let base = serve_once("503 Service Unavailable", "[]").await;
        let client = local_client(base);

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status(code) if code == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn fetch_reports_unreachable_feed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = local_client(format!("http://{addr}"));
        assert!(matches!(client.fetch().await, Err(FetchError::Transport(_))));
    }
}
