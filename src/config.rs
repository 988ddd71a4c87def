use crate::client::request::{DEFAULT_BASE_URL, RequestOptions, UnitGroup};
use crate::error::WeatherError;
use crate::parse::extract::KeyPolicy;

use serde::Deserialize;

use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Eq, PartialEq, Deserialize)]
pub struct Config {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub unit_group: Option<UnitGroup>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub strict_keys: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WeatherError> {
        let path = path.as_ref();
        let conf_str = fs::read_to_string(path).map_err(|err| {
            WeatherError::config(format!("Unable to read config file {}: {err}", path.display()))
        })?;
        Config::from_json(&conf_str)
    }

    pub fn from_json(conf_str: &str) -> Result<Self, WeatherError> {
        serde_json::from_str(conf_str)
            .map_err(|err| WeatherError::config(format!("Unable to parse config: {err}")))
    }

    /// Request parameters to use when the caller does not give any.
    pub fn default_options(&self) -> RequestOptions {
        RequestOptions {
            unit_group: self.unit_group,
            include: self.include.clone(),
            elements: self.elements.clone(),
        }
    }

    pub fn key_policy(&self) -> KeyPolicy {
        if self.strict_keys {
            KeyPolicy::Strict
        } else {
            KeyPolicy::Lenient
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn only_the_key_is_required() {
        let conf = Config::from_json(r#"{"api_key": "ABC"}"#).unwrap();
        assert_eq!(conf.api_key, "ABC");
        assert_eq!(conf.base_url, DEFAULT_BASE_URL);
        assert_eq!(conf.default_options(), RequestOptions::default());
        assert_eq!(conf.key_policy(), KeyPolicy::Lenient);
        assert_eq!(conf.timeout(), None);
    }

    #[test]
    fn full_file_is_read() {
        let conf = Config::from_json(
            r#"{
                "api_key": "ABC",
                "base_url": "http://localhost:8080/timeline/",
                "unit_group": "metric",
                "include": ["days", "hours"],
                "elements": ["tempmax"],
                "timeout_secs": 30,
                "strict_keys": true
            }"#,
        )
        .unwrap();
        assert_eq!(conf.base_url, "http://localhost:8080/timeline/");
        assert_eq!(
            conf.default_options(),
            RequestOptions::default()
                .unit_group(UnitGroup::Metric)
                .include(["days", "hours"])
                .elements(["tempmax"])
        );
        assert_eq!(conf.key_policy(), KeyPolicy::Strict);
        assert_eq!(conf.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = Config::from_json(r#"{"unit_group": "uk"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn unknown_unit_group_is_a_configuration_error() {
        let err = Config::from_json(r#"{"api_key": "ABC", "unit_group": "imperial"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = Config::from_file("/nonexistent/vc-weather.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
