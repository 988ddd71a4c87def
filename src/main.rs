#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

use vc_weather::{
    Config, ErrorKind, KeyPolicy, RequestOptions, UnitGroup, WeatherClient, WeatherDataset,
    WeatherError, WeatherRequest, timed,
};

use clap::{Arg, ArgAction, ArgMatches, Command};
use env_logger::Env;
use time::Date;
use time::macros::format_description;

use std::env;
use std::process;

const API_KEY_VAR: &str = "VC_WEATHER_API_KEY";

fn main() {
    let env = Env::default().filter_or("VC_WEATHER_LOG", "info");
    env_logger::init_from_env(env);

    let matches = Command::new("vc-weather")
        .version("0.1")
        .author("Chris Lieb")
        .about("Fetch a VisualCrossing weather timeline for one location")
        .arg(
            Arg::new("location")
                .required(true)
                .help("Address, postal code, or \"lat,lon\""),
        )
        .arg(Arg::new("config").short('c').long("config"))
        .arg(
            Arg::new("key")
                .short('k')
                .long("key")
                .help(format!("API key; falls back to ${API_KEY_VAR}, then the config file")),
        )
        .arg(
            Arg::new("unit_group")
                .short('u')
                .long("unit-group")
                .value_parser(["us", "uk", "metric", "base"]),
        )
        .arg(Arg::new("include").long("include").value_delimiter(','))
        .arg(Arg::new("elements").long("elements").value_delimiter(','))
        .arg(
            Arg::new("date")
                .short('d')
                .long("date")
                .value_parser(parse_date)
                .conflicts_with_all(["from", "to"]),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_parser(parse_date)
                .requires("to"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_parser(parse_date)
                .requires("from"),
        )
        .arg(Arg::new("strict").long("strict").action(ArgAction::SetTrue))
        .arg(Arg::new("hours").long("hours").action(ArgAction::SetTrue))
        .arg(Arg::new("json").long("json").action(ArgAction::SetTrue))
        .get_matches();

    if let Err(err) = run(&matches) {
        error!("{err}");
        process::exit(match err.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::Transport | ErrorKind::MalformedResponse => 1,
        });
    }
}

fn run(matches: &ArgMatches) -> Result<(), WeatherError> {
    let config = matches
        .get_one::<String>("config")
        .map(Config::from_file)
        .transpose()?;

    let mut client = match &config {
        Some(config) => WeatherClient::from_config(config)?,
        None => WeatherClient::new("")?,
    };
    if let Some(api_key) = matches
        .get_one::<String>("key")
        .cloned()
        .or_else(|| env::var(API_KEY_VAR).ok())
    {
        client.set_api_key(api_key);
    }
    if matches.get_flag("strict") {
        client = client.with_key_policy(KeyPolicy::Strict);
    }

    let mut options = config
        .as_ref()
        .map(Config::default_options)
        .unwrap_or_default();
    if let Some(unit_group) = matches.get_one::<String>("unit_group") {
        options = options.unit_group(unit_group.parse::<UnitGroup>()?);
    }
    if let Some(include) = matches.get_many::<String>("include") {
        options = options.include(include.cloned());
    }
    if let Some(elements) = matches.get_many::<String>("elements") {
        options = options.elements(elements.cloned());
    }

    let request = build_request(matches, options);
    timed!("Fetching {} for {}", request.period, request.location; || {
        client.fetch(&request).map(|_| ())
    })?;

    if let Some(dataset) = client.dataset() {
        if matches.get_flag("json") {
            match serde_json::to_string_pretty(dataset) {
                Ok(json) => println!("{json}"),
                Err(err) => error!("Unable to serialize dataset: {err}"),
            }
        } else {
            print_dataset(dataset, matches.get_flag("hours"));
        }
    }

    Ok(())
}

fn build_request(matches: &ArgMatches, options: RequestOptions) -> WeatherRequest {
    let location = matches
        .get_one::<String>("location")
        .cloned()
        .unwrap_or_default();
    let date = matches.get_one::<Date>("date").copied();
    let from = matches.get_one::<Date>("from").copied();
    let to = matches.get_one::<Date>("to").copied();

    let request = match (date, from, to) {
        (Some(date), _, _) => WeatherRequest::date(location, date),
        (None, Some(from), Some(to)) => WeatherRequest::range(location, from, to),
        _ => WeatherRequest::forecast(location),
    };
    request.with_options(options)
}

fn parse_date(raw: &str) -> Result<Date, String> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|err| format!("Expected a date like 2021-10-19: {err}"))
}

fn print_dataset(dataset: &WeatherDataset, with_hours: bool) {
    println!(
        "{} ({}, {:+}) lat {} lon {}, query cost {}",
        dataset.resolved_address,
        dataset.timezone,
        dataset.tz_offset,
        dataset.latitude,
        dataset.longitude,
        dataset.query_cost
    );

    for day in &dataset.days {
        println!(
            "{}  max {:>6}  min {:>6}  {}",
            day.date,
            show(day.temp_max),
            show(day.temp_min),
            day.weather.conditions.as_deref().unwrap_or("")
        );
        if with_hours {
            for hour in day.hours.iter().flatten() {
                println!(
                    "    {}  {:>6}  {}",
                    hour.datetime.as_deref().unwrap_or("--:--:--"),
                    show(hour.weather.temp),
                    hour.weather.conditions.as_deref().unwrap_or("")
                );
            }
        }
        for event in day.events.iter().flatten() {
            println!(
                "    ! {}  {}  {}",
                event.datetime,
                event.event_type.as_deref().unwrap_or("event"),
                event.description.as_deref().unwrap_or("")
            );
        }
    }

    let mut stations: Vec<_> = dataset.stations.values().collect();
    stations.sort_by(|a, b| a.id.cmp(&b.id));
    for station in stations {
        println!(
            "station {}  {}  {} m",
            station.id.as_deref().unwrap_or("?"),
            station.name.as_deref().unwrap_or(""),
            show(station.distance)
        );
    }
}

fn show(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}
