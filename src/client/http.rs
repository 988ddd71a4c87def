use crate::client::Transport;
use crate::client::request::redact;
use crate::error::{TransportError, WeatherError};

use reqwest::Url;
use reqwest::blocking::{Client, ClientBuilder};

use std::fmt;
use std::time::Duration;

/// [`Transport`] over a blocking reqwest client with gzip enabled.
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<HttpTransport, WeatherError> {
        HttpTransport::with_timeout(None)
    }

    /// Without a timeout reqwest's own default applies.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<HttpTransport, WeatherError> {
        let mut builder = ClientBuilder::new().gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|err| WeatherError::config(format!("Unable to construct HTTP client: {err}")))?;

        Ok(HttpTransport { http_client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        let shown = redact(url);
        info!("Calling VisualCrossing: {shown}");
        let res = self
            .http_client
            .get(url.clone())
            .send()
            .map_err(|source| {
                let source = source.without_url();
                warn!("Encountered error calling VisualCrossing API for {shown}: {source}");
                TransportError::Request {
                    url: shown.clone(),
                    source,
                }
            })?;

        let status = res.status();
        if status.is_success() {
            res.text().map_err(|source| TransportError::Body {
                url: shown,
                source: source.without_url(),
            })
        } else {
            warn!("VisualCrossing API returned status {status} for URL {shown}");
            let message = rejection_message(res.text().map_err(reqwest::Error::without_url), &shown);
            Err(TransportError::HttpStatus {
                url: shown,
                status,
                message,
            })
        }
    }
}

/// The API explains rejected requests in a plain text body. An unreadable body
/// leaves the message empty.
fn rejection_message<E: fmt::Display>(body: Result<String, E>, shown: &str) -> String {
    match body {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!("Unable to read error body from {shown}: {err}");
            String::new()
        }
    }
}
