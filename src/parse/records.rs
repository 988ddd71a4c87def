use crate::error::MalformedResponse;
use crate::model::{DailyRecord, Event, HourlyRecord, Observation, Station};
use crate::parse::extract::Fields;

use serde_json::Value;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

/// Read one entry of the dataset's `stations` object. Every field may be null.
pub fn parse_station(fields: &Fields<'_>) -> Result<Station, MalformedResponse> {
    Ok(Station {
        id: fields.str_or_null("id")?,
        name: fields.str_or_null("name")?,
        latitude: fields.f64_or_null("latitude")?,
        longitude: fields.f64_or_null("longitude")?,
        distance: fields.f64_or_null("distance")?,
        use_count: fields.i32_or_null("useCount")?,
        quality: fields.i32_or_null("quality")?,
        contribution: fields.f64_or_null("contribution")?,
    })
}

/// Read one element of a day's `events` array. `datetime` is mandatory.
pub fn parse_event(fields: &Fields<'_>) -> Result<Event, MalformedResponse> {
    let raw = fields.required_str("datetime")?;
    let datetime = parse_local_datetime(raw).map_err(|source| MalformedResponse::BadTimestamp {
        path: fields.path().to_string(),
        key: "datetime".to_string(),
        value: raw.to_string(),
        source,
    })?;

    Ok(Event {
        datetime,
        datetime_epoch: fields.i64_or_null("datetimeEpoch")?,
        event_type: fields.str_or_null("type")?,
        latitude: fields.f64_or_null("latitude")?,
        longitude: fields.f64_or_null("longitude")?,
        distance: fields.f64_or_null("distance")?,
        description: fields.str_or_null("description")?,
        size: fields.f64_or_null("size")?,
    })
}

/// Read one element of a day's `hours` array. The local time is kept as sent.
pub fn parse_hour(fields: &Fields<'_>) -> Result<HourlyRecord, MalformedResponse> {
    Ok(HourlyRecord {
        datetime: fields.str_or_null("datetime")?,
        datetime_epoch: fields.i64_or_null("datetimeEpoch")?,
        weather: parse_observation(fields)?,
    })
}

/// Read one element of the `days` array, including its nested events and hours.
///
/// The date comes first and is mandatory. A single bad event or hour fails the
/// whole day.
pub fn parse_day(fields: &Fields<'_>) -> Result<DailyRecord, MalformedResponse> {
    let raw = fields.required_str("datetime")?;
    let date = Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|source| {
        MalformedResponse::BadTimestamp {
            path: fields.path().to_string(),
            key: "datetime".to_string(),
            value: raw.to_string(),
            source,
        }
    })?;

    let datetime_epoch = fields.i64_or_null("datetimeEpoch")?;
    let temp_max = fields.f64_or_null("tempmax")?;
    let temp_min = fields.f64_or_null("tempmin")?;
    let feels_like_max = fields.f64_or_null("feelslikemax")?;
    let feels_like_min = fields.f64_or_null("feelslikemin")?;
    let precip_cover = fields.f64_or_null("precipcover")?;
    let sunrise = fields.str_or_null("sunrise")?;
    let sunrise_epoch = fields.i64_or_null("sunriseEpoch")?;
    let sunset = fields.str_or_null("sunset")?;
    let sunset_epoch = fields.i64_or_null("sunsetEpoch")?;
    let moon_phase = fields.f64_or_null("moonphase")?;
    let description = fields.str_or_null("description")?;
    // shared scalars, then preciptype, then stations
    let weather = parse_observation(fields)?;

    let events = parse_children(fields, "events", parse_event)?;
    let hours = parse_children(fields, "hours", parse_hour)?;

    Ok(DailyRecord {
        date,
        datetime_epoch,
        temp_max,
        temp_min,
        feels_like_max,
        feels_like_min,
        precip_cover,
        sunrise,
        sunrise_epoch,
        sunset,
        sunset_epoch,
        moon_phase,
        description,
        weather,
        hours,
        events,
    })
}

/// The fields a day and an hour have in common.
fn parse_observation(fields: &Fields<'_>) -> Result<Observation, MalformedResponse> {
    let mut weather = Observation {
        temp: fields.f64_or_null("temp")?,
        feels_like: fields.f64_or_null("feelslike")?,
        humidity: fields.f64_or_null("humidity")?,
        dew: fields.f64_or_null("dew")?,
        precip: fields.f64_or_null("precip")?,
        precip_prob: fields.f64_or_null("precipprob")?,
        precip_type: None,
        snow: fields.f64_or_null("snow")?,
        snow_depth: fields.f64_or_null("snowdepth")?,
        wind_gust: fields.f64_or_null("windgust")?,
        wind_speed: fields.f64_or_null("windspeed")?,
        wind_dir: fields.f64_or_null("winddir")?,
        pressure: fields.f64_or_null("pressure")?,
        visibility: fields.f64_or_null("visibility")?,
        cloud_cover: fields.f64_or_null("cloudcover")?,
        solar_radiation: fields.f64_or_null("solarradiation")?,
        solar_energy: fields.f64_or_null("solarenergy")?,
        uv_index: fields.f64_or_null("uvindex")?,
        severe_risk: fields.f64_or_null("severerisk")?,
        conditions: fields.str_or_null("conditions")?,
        icon: fields.str_or_null("icon")?,
        stations: None,
        source: fields.str_or_null("source")?,
    };
    weather.precip_type = fields.strings_or_null("preciptype")?;
    weather.stations = fields.strings_or_null("stations")?;
    Ok(weather)
}

/// Map every element of a nested array through `parse`. A null array gives
/// `None`; an empty one gives an empty sequence.
fn parse_children<T>(
    fields: &Fields<'_>,
    key: &str,
    parse: fn(&Fields<'_>) -> Result<T, MalformedResponse>,
) -> Result<Option<Vec<T>>, MalformedResponse> {
    let Some(items) = fields.array_or_null(key)? else {
        return Ok(None);
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| child(fields, key, i, item).and_then(|child| parse(&child)))
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}

fn child<'a>(
    parent: &Fields<'_>,
    key: &str,
    index: usize,
    item: &'a Value,
) -> Result<Fields<'a>, MalformedResponse> {
    Fields::of(
        item,
        format!("{}.{}[{}]", parent.path(), key, index),
        parent.policy(),
    )
}

/// Events carry an ISO local date-time. Seconds and fractions of a second are optional.
fn parse_local_datetime(value: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    )
    .or_else(|err| {
        PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
            .map_err(|_| err)
    })
}
