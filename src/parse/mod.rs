pub mod extract;
pub mod records;

use crate::error::{MalformedResponse, TransportError, WeatherError};
use crate::model::WeatherDataset;
use crate::parse::extract::{Fields, KeyPolicy};
use crate::parse::records::{parse_day, parse_station};

use serde_json::Value;

use std::collections::HashMap;

const ROOT: &str = "response";

/// Build a dataset from a timeline response body, reading optional keys
/// leniently.
pub fn parse_dataset(body: &str) -> Result<WeatherDataset, WeatherError> {
    parse_dataset_with(body, KeyPolicy::default())
}

/// Build a dataset from a timeline response body.
///
/// An empty or non-JSON body is a transport failure. Any malformed record
/// fails the whole dataset; nothing partial is returned.
pub fn parse_dataset_with(body: &str, policy: KeyPolicy) -> Result<WeatherDataset, WeatherError> {
    if body.trim().is_empty() {
        return Err(TransportError::EmptyBody.into());
    }
    let root: Value = serde_json::from_str(body).map_err(TransportError::InvalidJson)?;
    Ok(assemble(&root, policy)?)
}

fn assemble(root: &Value, policy: KeyPolicy) -> Result<WeatherDataset, MalformedResponse> {
    let fields = Fields::of(root, ROOT.to_string(), policy)?;

    let query_cost = fields.required_i64("queryCost")?;
    let latitude = fields.required_f64("latitude")?;
    let longitude = fields.required_f64("longitude")?;
    let resolved_address = fields.required_str("resolvedAddress")?.to_string();
    let address = fields.required_str("address")?.to_string();
    let timezone = fields.required_str("timezone")?.to_string();
    let tz_offset = fields.required_f64("tzoffset")?;

    let day_values = fields.required_array("days")?;
    let mut days = Vec::with_capacity(day_values.len());
    for (i, value) in day_values.iter().enumerate() {
        let day = Fields::of(value, format!("days[{i}]"), policy)?;
        days.push(parse_day(&day)?);
    }

    let mut stations = HashMap::new();
    if let Some(entries) = fields.object_or_null("stations")? {
        for (id, value) in entries {
            let station = Fields::of(value, format!("stations.{id}"), policy)?;
            stations.insert(id.clone(), parse_station(&station)?);
        }
    }

    debug!(
        "Parsed {} day(s) and {} station(s) for {} (query cost {})",
        days.len(),
        stations.len(),
        resolved_address,
        query_cost
    );

    Ok(WeatherDataset {
        query_cost,
        latitude,
        longitude,
        resolved_address,
        address,
        timezone,
        tz_offset,
        days,
        stations,
    })
}
