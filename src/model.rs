use serde::Serialize;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use std::collections::HashMap;

/// The full result of one timeline fetch: one location, one or more days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDataset {
    pub query_cost: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub resolved_address: String,
    pub address: String,
    pub timezone: String,
    /// Offset from UTC in hours
    pub tz_offset: f64,
    pub days: Vec<DailyRecord>,
    pub stations: HashMap<String, Station>,
}

impl WeatherDataset {
    /// Find the record for a calendar date
    pub fn day(&self, date: Date) -> Option<&DailyRecord> {
        self.days.iter().find(|day| day.date == date)
    }

    /// Get the record at a position in the daily sequence
    pub fn day_at(&self, index: usize) -> Option<&DailyRecord> {
        self.days.get(index)
    }

    /// The dates covered by this dataset, in response order
    pub fn dates(&self) -> Vec<Date> {
        self.days.iter().map(|day| day.date).collect()
    }

    /// Every hourly record of every day, in response order. Days without an
    /// hourly sequence contribute nothing.
    pub fn hours(&self) -> impl Iterator<Item = &HourlyRecord> {
        self.days
            .iter()
            .filter_map(|day| day.hours.as_deref())
            .flatten()
    }

    /// Find one hour of one day by its local time string, e.g. `"13:00:00"`.
    pub fn hour_at(&self, date: Date, time: &str) -> Option<&HourlyRecord> {
        self.day(date)?
            .hours
            .as_ref()?
            .iter()
            .find(|hour| hour.datetime.as_deref() == Some(time))
    }

    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.get(id)
    }
}

/// Meteorological values reported both per day and per hour.
///
/// Units depend on the unit group the request asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Observation {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub dew: Option<f64>,
    pub precip: Option<f64>,
    /// Likelihood of measurable precipitation, 0-100
    pub precip_prob: Option<f64>,
    /// e.g. `rain`, `snow`, `freezingrain`, `ice`
    pub precip_type: Option<Vec<String>>,
    pub snow: Option<f64>,
    pub snow_depth: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_dir: Option<f64>,
    pub pressure: Option<f64>,
    pub visibility: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub solar_radiation: Option<f64>,
    pub solar_energy: Option<f64>,
    pub uv_index: Option<f64>,
    pub severe_risk: Option<f64>,
    pub conditions: Option<String>,
    pub icon: Option<String>,
    /// Identifiers of the stations that contributed, keys into [`WeatherDataset::stations`]
    pub stations: Option<Vec<String>>,
    /// Data source tag, e.g. `obs`, `fcst`, `comb`, `stats`
    pub source: Option<String>,
}

/// One calendar day at the requested location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: Date,
    pub datetime_epoch: Option<i64>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub feels_like_max: Option<f64>,
    pub feels_like_min: Option<f64>,
    /// Share of the day with precipitation, 0-100
    pub precip_cover: Option<f64>,
    /// Local time of day, `HH:MM:SS`
    pub sunrise: Option<String>,
    pub sunrise_epoch: Option<i64>,
    /// Local time of day, `HH:MM:SS`
    pub sunset: Option<String>,
    pub sunset_epoch: Option<i64>,
    /// 0 is a new moon, 0.5 a full moon
    pub moon_phase: Option<f64>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub weather: Observation,
    /// `None` when the response carried `"hours": null`
    pub hours: Option<Vec<HourlyRecord>>,
    /// `None` when the response carried `"events": null`
    pub events: Option<Vec<Event>>,
}

impl DailyRecord {
    pub fn sunrise_time(&self) -> Option<Result<Time, time::error::Parse>> {
        self.sunrise.as_deref().map(parse_local_time)
    }

    pub fn sunset_time(&self) -> Option<Result<Time, time::error::Parse>> {
        self.sunset.as_deref().map(parse_local_time)
    }
}

/// One hour of a [`DailyRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    /// Local time of day as sent by the API, `HH:MM:SS`
    pub datetime: Option<String>,
    pub datetime_epoch: Option<i64>,
    #[serde(flatten)]
    pub weather: Observation,
}

impl HourlyRecord {
    pub fn time(&self) -> Option<Result<Time, time::error::Parse>> {
        self.datetime.as_deref().map(parse_local_time)
    }
}

/// A historical weather incident (hail, tornado, wind damage...) attached to a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Local date and time of the incident
    pub datetime: PrimitiveDateTime,
    pub datetime_epoch: Option<i64>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance: Option<f64>,
    pub description: Option<String>,
    /// Magnitude, e.g. hail diameter
    pub size: Option<f64>,
}

/// An observation source that contributed to the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Station {
    pub id: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Distance from the requested location
    pub distance: Option<f64>,
    pub use_count: Option<i32>,
    pub quality: Option<i32>,
    /// Weight of this station in the blended values
    pub contribution: Option<f64>,
}

fn parse_local_time(value: &str) -> Result<Time, time::error::Parse> {
    Time::parse(value, format_description!("[hour]:[minute]:[second]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn hour(datetime: &str, temp: f64) -> HourlyRecord {
        HourlyRecord {
            datetime: Some(datetime.to_string()),
            datetime_epoch: None,
            weather: Observation {
                temp: Some(temp),
                ..Observation::default()
            },
        }
    }

    fn day(date: Date, hours: Option<Vec<HourlyRecord>>) -> DailyRecord {
        DailyRecord {
            date,
            datetime_epoch: None,
            temp_max: None,
            temp_min: None,
            feels_like_max: None,
            feels_like_min: None,
            precip_cover: None,
            sunrise: Some("07:12:45".to_string()),
            sunrise_epoch: None,
            sunset: Some("sundown".to_string()),
            sunset_epoch: None,
            moon_phase: None,
            description: None,
            weather: Observation::default(),
            hours,
            events: None,
        }
    }

    fn dataset() -> WeatherDataset {
        WeatherDataset {
            query_cost: 2,
            latitude: 38.96,
            longitude: -96.02,
            resolved_address: "38.96,-96.02".to_string(),
            address: "38.96,-96.02".to_string(),
            timezone: "America/Chicago".to_string(),
            tz_offset: -5.0,
            days: vec![
                day(
                    date!(2020 - 07 - 10),
                    Some(vec![hour("00:00:00", 20.0), hour("01:00:00", 19.5)]),
                ),
                day(date!(2020 - 07 - 11), None),
                day(date!(2020 - 07 - 12), Some(vec![hour("00:00:00", 18.0)])),
            ],
            stations: HashMap::from([("KTOP".to_string(), Station::default())]),
        }
    }

    #[test]
    fn day_lookup_by_date_and_index() {
        let data = dataset();
        assert_eq!(
            data.day(date!(2020 - 07 - 11)).map(|d| d.date),
            Some(date!(2020 - 07 - 11))
        );
        assert!(data.day(date!(2020 - 07 - 13)).is_none());
        assert_eq!(data.day_at(2).map(|d| d.date), Some(date!(2020 - 07 - 12)));
        assert!(data.day_at(3).is_none());
        assert_eq!(
            data.dates(),
            vec![
                date!(2020 - 07 - 10),
                date!(2020 - 07 - 11),
                date!(2020 - 07 - 12)
            ]
        );
    }

    #[test]
    fn hours_flatten_in_order_and_skip_absent_sequences() {
        let data = dataset();
        let temps: Vec<Option<f64>> = data.hours().map(|h| h.weather.temp).collect();
        assert_eq!(temps, vec![Some(20.0), Some(19.5), Some(18.0)]);
    }

    #[test]
    fn hour_lookup() {
        let data = dataset();
        let found = data.hour_at(date!(2020 - 07 - 10), "01:00:00");
        assert_eq!(found.and_then(|h| h.weather.temp), Some(19.5));
        assert!(data.hour_at(date!(2020 - 07 - 11), "01:00:00").is_none());
        assert!(data.hour_at(date!(2020 - 07 - 12), "05:00:00").is_none());
    }

    #[test]
    fn station_lookup() {
        let data = dataset();
        assert!(data.station("KTOP").is_some());
        assert!(data.station("KMHK").is_none());
    }

    #[test]
    fn local_times_parse_on_demand() {
        let record = day(date!(2020 - 07 - 10), None);
        assert_eq!(record.sunrise_time().map(|t| t.ok()), Some(Some(time!(7:12:45))));
        assert!(matches!(record.sunset_time(), Some(Err(_))));
        assert_eq!(
            hour("13:00:00", 1.0).time().map(|t| t.ok()),
            Some(Some(time!(13:00:00)))
        );
    }
}
