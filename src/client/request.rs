use crate::error::WeatherError;

use reqwest::Url;
use serde::Deserialize;
use time::Date;
use time::macros::format_description;

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline/";

/// System of units for the returned values. The API defaults to `us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitGroup {
    Us,
    Uk,
    Metric,
    Base,
}

impl UnitGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitGroup::Us => "us",
            UnitGroup::Uk => "uk",
            UnitGroup::Metric => "metric",
            UnitGroup::Base => "base",
        }
    }
}

impl fmt::Display for UnitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitGroup {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(UnitGroup::Us),
            "uk" => Ok(UnitGroup::Uk),
            "metric" => Ok(UnitGroup::Metric),
            "base" => Ok(UnitGroup::Base),
            other => Err(WeatherError::config(format!(
                "Unknown unit group '{other}', expected one of us, uk, metric, base"
            ))),
        }
    }
}

/// Which days to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The next 15 days from midnight, local time of the location
    Forecast,
    Date(Date),
    Range { from: Date, to: Date },
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Forecast => f.write_str("15 day forecast"),
            Period::Date(date) => write!(f, "{}", format_date(*date)),
            Period::Range { from, to } => {
                write!(f, "{} to {}", format_date(*from), format_date(*to))
            }
        }
    }
}

/// Optional query parameters. Empty lists are left off the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub unit_group: Option<UnitGroup>,
    /// Sections to include, e.g. `days`, `hours`, `events`, `obs`, `fcst`
    pub include: Vec<String>,
    /// Restrict the response to these elements, e.g. `tempmax`, `tempmin`
    pub elements: Vec<String>,
}

impl RequestOptions {
    pub fn unit_group(mut self, unit_group: UnitGroup) -> Self {
        self.unit_group = Some(unit_group);
        self
    }

    pub fn include<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = sections.into_iter().map(Into::into).collect();
        self
    }

    pub fn elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements = elements.into_iter().map(Into::into).collect();
        self
    }
}

/// One timeline request: a location, a period and the optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    /// Free-text address, postal code, or `"lat,lon"`
    pub location: String,
    pub period: Period,
    pub options: RequestOptions,
}

impl WeatherRequest {
    pub fn forecast<S: Into<String>>(location: S) -> WeatherRequest {
        WeatherRequest::new(location, Period::Forecast)
    }

    pub fn date<S: Into<String>>(location: S, date: Date) -> WeatherRequest {
        WeatherRequest::new(location, Period::Date(date))
    }

    pub fn range<S: Into<String>>(location: S, from: Date, to: Date) -> WeatherRequest {
        WeatherRequest::new(location, Period::Range { from, to })
    }

    fn new<S: Into<String>>(location: S, period: Period) -> WeatherRequest {
        WeatherRequest {
            location: location.into(),
            period,
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> WeatherRequest {
        self.options = options;
        self
    }

    /// Build `{base}/{location}[/{from}[/{to}]]?key=..[&unitGroup=..][&include=..][&elements=..]`.
    ///
    /// Fails without touching the network when the key or location is empty
    /// or the base URL cannot take path segments.
    pub fn url(&self, base_url: &str, api_key: &str) -> Result<Url, WeatherError> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::config("API key is not set"));
        }
        if self.location.trim().is_empty() {
            return Err(WeatherError::config("Location is empty"));
        }

        let mut url = Url::parse(base_url)
            .map_err(|err| WeatherError::config(format!("Invalid base URL '{base_url}': {err}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| WeatherError::config(format!("Base URL '{base_url}' cannot take a path")))?;
            segments.pop_if_empty().push(&self.location);
            match self.period {
                Period::Forecast => {}
                Period::Date(date) => {
                    segments.push(&format_date(date));
                }
                Period::Range { from, to } => {
                    segments.push(&format_date(from)).push(&format_date(to));
                }
            }
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", api_key);
            if let Some(unit_group) = self.options.unit_group {
                query.append_pair("unitGroup", unit_group.as_str());
            }
            if !self.options.include.is_empty() {
                query.append_pair("include", &self.options.include.join(","));
            }
            if !self.options.elements.is_empty() {
                query.append_pair("elements", &self.options.elements.join(","));
            }
        }
        Ok(url)
    }
}

/// The URL as it may appear in logs and errors, with the API key blanked out.
pub fn redact(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "REDACTED".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    let mut shown = url.clone();
    if !pairs.is_empty() {
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    shown.to_string()
}

fn format_date(date: Date) -> String {
    // [year]-[month]-[day] cannot fail to format a valid Date
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;
    use time::macros::date;

    const BASE: &str = DEFAULT_BASE_URL;

    #[rstest]
    #[case::forecast(
        WeatherRequest::forecast("K2A1W1"),
        "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline/K2A1W1?key=ABC"
    )]
    #[case::single_date(
        WeatherRequest::date("K2A1W1", date!(2021 - 10 - 19)),
        "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline/K2A1W1/2021-10-19?key=ABC"
    )]
    #[case::range(
        WeatherRequest::range("38.96,-96.02", date!(2020 - 07 - 10), date!(2020 - 07 - 12)),
        "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline/38.96,-96.02/2020-07-10/2020-07-12?key=ABC"
    )]
    fn url_shapes(#[case] request: WeatherRequest, #[case] expected: &str) {
        assert_eq!(request.url(BASE, "ABC").unwrap().as_str(), expected);
    }

    #[test]
    fn optional_parameters_follow_the_key() {
        let request = WeatherRequest::range("38.96,-96.02", date!(2020 - 07 - 10), date!(2020 - 07 - 12))
            .with_options(
                RequestOptions::default()
                    .unit_group(UnitGroup::Us)
                    .include(["events", "hours"])
                    .elements(["tempmax", "tempmin"]),
            );
        let url = request.url(BASE, "ABC").unwrap();
        assert_eq!(
            url.query(),
            Some("key=ABC&unitGroup=us&include=events%2Chours&elements=tempmax%2Ctempmin")
        );
    }

    #[test]
    fn empty_lists_are_left_off() {
        let request = WeatherRequest::forecast("London,UK")
            .with_options(RequestOptions::default().include(Vec::<String>::new()));
        assert_eq!(request.url(BASE, "ABC").unwrap().query(), Some("key=ABC"));
    }

    #[test]
    fn free_text_location_is_escaped_into_one_segment() {
        let url = WeatherRequest::forecast("4 Bertha Circle/Billerica")
            .url(BASE, "ABC")
            .unwrap();
        assert!(
            url.path().ends_with("/timeline/4%20Bertha%20Circle%2FBillerica"),
            "{}",
            url.path()
        );
    }

    #[test]
    fn base_without_trailing_slash_works() {
        let url = WeatherRequest::forecast("Paris")
            .url("http://localhost:8080/timeline", "ABC")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/timeline/Paris?key=ABC");
    }

    #[rstest]
    #[case::empty_key("", "Paris", BASE)]
    #[case::blank_key("   ", "Paris", BASE)]
    #[case::empty_location("ABC", "", BASE)]
    #[case::bad_base("ABC", "Paris", "not a url")]
    #[case::opaque_base("ABC", "Paris", "mailto:weather@example.com")]
    fn unusable_input_is_a_configuration_error(
        #[case] key: &str,
        #[case] location: &str,
        #[case] base: &str,
    ) {
        let err = WeatherRequest::forecast(location).url(base, key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn redact_hides_the_key_only() {
        let url = WeatherRequest::forecast("Paris")
            .with_options(RequestOptions::default().unit_group(UnitGroup::Metric))
            .url(BASE, "SECRET")
            .unwrap();
        let shown = redact(&url);
        assert!(!shown.contains("SECRET"));
        assert!(shown.ends_with("/timeline/Paris?key=REDACTED&unitGroup=metric"), "{shown}");
    }

    #[rstest]
    #[case("us", UnitGroup::Us)]
    #[case("UK", UnitGroup::Uk)]
    #[case("metric", UnitGroup::Metric)]
    #[case("base", UnitGroup::Base)]
    fn unit_groups_parse(#[case] raw: &str, #[case] expected: UnitGroup) {
        assert_eq!(raw.parse::<UnitGroup>().unwrap(), expected);
        assert_eq!(expected.to_string(), raw.to_ascii_lowercase());
    }

    #[test]
    fn unknown_unit_group_is_rejected() {
        assert!("imperial".parse::<UnitGroup>().is_err());
    }

    #[test]
    fn period_display() {
        assert_eq!(Period::Forecast.to_string(), "15 day forecast");
        assert_eq!(
            Period::Range {
                from: date!(2020 - 07 - 10),
                to: date!(2020 - 07 - 12)
            }
            .to_string(),
            "2020-07-10 to 2020-07-12"
        );
    }
}
