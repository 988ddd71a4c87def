//! Blocking client for the VisualCrossing timeline weather API.
//!
//! [`WeatherClient`] builds the request URL, hands it to a [`Transport`] and
//! turns the JSON body into a [`WeatherDataset`]. Bodies obtained some other
//! way can be parsed directly with [`parse_dataset`].

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod timed;
pub mod weatherclient;

pub use crate::client::Transport;
pub use crate::client::http::HttpTransport;
pub use crate::client::request::{DEFAULT_BASE_URL, Period, RequestOptions, UnitGroup, WeatherRequest};
pub use crate::config::Config;
pub use crate::error::{ErrorKind, MalformedResponse, TransportError, WeatherError};
pub use crate::model::{DailyRecord, Event, HourlyRecord, Observation, Station, WeatherDataset};
pub use crate::parse::extract::KeyPolicy;
pub use crate::parse::{parse_dataset, parse_dataset_with};
pub use crate::weatherclient::WeatherClient;
