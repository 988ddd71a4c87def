use crate::client::Transport;
use crate::client::http::HttpTransport;
use crate::client::request::{DEFAULT_BASE_URL, RequestOptions, WeatherRequest};
use crate::config::Config;
use crate::error::WeatherError;
use crate::model::WeatherDataset;
use crate::parse::extract::KeyPolicy;
use crate::parse::parse_dataset_with;

use time::Date;

/// Client for the VisualCrossing timeline API.
///
/// Holds at most one dataset, the result of the last successful fetch. A fetch
/// that gets past the API key check clears it first, so after a failure there
/// is no stale data left behind.
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    key_policy: KeyPolicy,
    transport: Box<dyn Transport>,
    dataset: Option<WeatherDataset>,
}

impl WeatherClient {
    pub fn new<S: Into<String>>(api_key: S) -> Result<WeatherClient, WeatherError> {
        Ok(WeatherClient::with_transport(api_key, Box::new(HttpTransport::new()?)))
    }

    pub fn with_transport<S: Into<String>>(api_key: S, transport: Box<dyn Transport>) -> WeatherClient {
        WeatherClient {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            key_policy: KeyPolicy::default(),
            transport,
            dataset: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<WeatherClient, WeatherError> {
        let transport = HttpTransport::with_timeout(config.timeout())?;
        Ok(WeatherClient::with_transport(config.api_key.clone(), Box::new(transport))
            .with_base_url(config.base_url.clone())
            .with_key_policy(config.key_policy()))
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> WeatherClient {
        self.base_url = base_url.into();
        self
    }

    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> WeatherClient {
        self.key_policy = key_policy;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key<S: Into<String>>(&mut self, api_key: S) {
        self.api_key = api_key.into();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn key_policy(&self) -> KeyPolicy {
        self.key_policy
    }

    /// The dataset from the last successful fetch
    pub fn dataset(&self) -> Option<&WeatherDataset> {
        self.dataset.as_ref()
    }

    pub fn take_dataset(&mut self) -> Option<WeatherDataset> {
        self.dataset.take()
    }

    pub fn clear(&mut self) {
        self.dataset = None;
    }

    /// Perform one request and replace the current dataset with its result.
    ///
    /// Configuration problems are reported before anything else happens and
    /// leave the current dataset alone. Transport and parse failures leave the
    /// client with no dataset. Nothing is retried.
    pub fn fetch(&mut self, request: &WeatherRequest) -> Result<&WeatherDataset, WeatherError> {
        let url = request.url(&self.base_url, &self.api_key)?;

        self.dataset = None;
        let dataset = self
            .transport
            .get(&url)
            .map_err(WeatherError::from)
            .and_then(|body| parse_dataset_with(&body, self.key_policy))
            .map_err(|err| {
                warn!("Unable to fetch {} for {}: {err}", request.period, request.location);
                err
            })?;

        debug!(
            "Fetched {} day(s) for {} ({})",
            dataset.days.len(),
            dataset.resolved_address,
            request.period
        );
        Ok(self.dataset.insert(dataset))
    }

    pub fn fetch_range(
        &mut self,
        location: &str,
        from: Date,
        to: Date,
        options: &RequestOptions,
    ) -> Result<&WeatherDataset, WeatherError> {
        self.fetch(&WeatherRequest::range(location, from, to).with_options(options.clone()))
    }

    pub fn fetch_date(
        &mut self,
        location: &str,
        date: Date,
        options: &RequestOptions,
    ) -> Result<&WeatherDataset, WeatherError> {
        self.fetch(&WeatherRequest::date(location, date).with_options(options.clone()))
    }

    /// The next 15 days from midnight at the location
    pub fn fetch_forecast(
        &mut self,
        location: &str,
        options: &RequestOptions,
    ) -> Result<&WeatherDataset, WeatherError> {
        self.fetch(&WeatherRequest::forecast(location).with_options(options.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TransportError};

    use reqwest::{StatusCode, Url};
    use serde_json::json;

    /// Answers every request with the same body, or with a 404 when there is none
    struct Canned(Option<String>);

    impl Transport for Canned {
        fn get(&self, url: &Url) -> Result<String, TransportError> {
            self.0.clone().ok_or_else(|| TransportError::HttpStatus {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
                message: "Not found".to_string(),
            })
        }
    }

    fn body() -> String {
        json!({
            "queryCost": 1,
            "latitude": 40.0,
            "longitude": -75.0,
            "resolvedAddress": "X",
            "address": "X",
            "timezone": "UTC",
            "tzoffset": 0,
            "days": [{"datetime": "2021-10-19"}],
        })
        .to_string()
    }

    #[test]
    fn defaults() {
        let client = WeatherClient::with_transport("ABC", Box::new(Canned(Some(body()))));
        assert_eq!(client.api_key(), "ABC");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.key_policy(), KeyPolicy::Lenient);
        assert!(client.dataset().is_none());
    }

    #[test]
    fn success_keeps_the_dataset() {
        let mut client = WeatherClient::with_transport("ABC", Box::new(Canned(Some(body()))));
        let days = client
            .fetch_forecast("X", &RequestOptions::default())
            .unwrap()
            .days
            .len();
        assert_eq!(days, 1);
        assert!(client.dataset().is_some());
        assert!(client.take_dataset().is_some());
        assert!(client.dataset().is_none());
    }

    #[test]
    fn transport_failure_clears_the_dataset() {
        let mut client = WeatherClient::with_transport("ABC", Box::new(Canned(Some(body()))));
        client.fetch_forecast("X", &RequestOptions::default()).unwrap();

        let mut client = WeatherClient {
            transport: Box::new(Canned(None)),
            ..client
        };
        let err = client
            .fetch_forecast("X", &RequestOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(client.dataset().is_none());
    }

    #[test]
    fn empty_key_leaves_the_dataset_alone() {
        let mut client = WeatherClient::with_transport("ABC", Box::new(Canned(Some(body()))));
        client.fetch_forecast("X", &RequestOptions::default()).unwrap();

        client.set_api_key("");
        let err = client
            .fetch_forecast("X", &RequestOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(client.dataset().is_some());

        client.clear();
        assert!(client.dataset().is_none());
    }
}
