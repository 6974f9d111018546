//! HERE Maps CLI
//!
//! Command-line front end for the geocoding, routing, matrix routing and
//! pairwise-combination helpers. Results are printed as pretty JSON.

#![allow(clippy::print_stdout)]

mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use domain::{
    BorderGranularity, CombinationOptions, Coordinate, DepartureTime, LengthUnit, RoutingMode,
    TransportMode, all_combinations,
};
use integration_here::{
    BrowseFilters, GeocodingClient, HereClient, MatrixClient, MatrixOptions, MatrixRequest,
    RouteRequest, RoutingClient, SummaryOptions,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Overrides, load_config};

/// HERE Maps CLI
#[derive(Parser)]
#[command(name = "here-cli")]
#[command(author, version, about = "Geocoding and routing with the HERE Maps APIs", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HERE API key
    #[arg(long, env = "HERE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth bearer token for matrix routing
    #[arg(long, env = "HERE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode a free-text address
    Geocode {
        /// Address to look up
        address: String,

        /// Maximum number of matches
        #[arg(short, long, default_value = "1")]
        limit: u32,

        /// Print the API items instead of flattened records
        #[arg(long)]
        raw: bool,
    },

    /// Geocode through the legacy 6.2 geocoder
    GeocodeLegacy {
        /// Address to look up
        address: String,

        /// Maximum number of matches
        #[arg(short, long, default_value = "1")]
        limit: u32,

        /// Print the legacy results instead of flattened records
        #[arg(long)]
        raw: bool,
    },

    /// Find addresses nearest to a coordinate
    ///
    /// Example: here-cli reverse 38.7743,-76.0763
    Reverse {
        /// Coordinate as `lat,lng`
        #[arg(allow_hyphen_values = true)]
        at: Coordinate,

        /// Maximum number of addresses
        #[arg(short, long, default_value = "1")]
        limit: u32,

        /// Print the API items instead of flattened records
        #[arg(long)]
        raw: bool,
    },

    /// Browse places near a coordinate
    Browse {
        /// Coordinate as `lat,lng`
        #[arg(allow_hyphen_values = true)]
        at: Coordinate,

        /// Place category ID (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Area restriction, e.g. `countryCode:USA`
        #[arg(long)]
        area: Option<String>,

        /// Place name filter
        #[arg(long)]
        name: Option<String>,

        /// Maximum number of places
        #[arg(short, long, default_value = "20")]
        limit: u32,

        /// Print the API items instead of flattened records
        #[arg(long)]
        raw: bool,
    },

    /// Route between two coordinates
    ///
    /// Example: here-cli route 38.7743,-76.0763 39.1582,-75.5244 --mode truck --border state
    Route {
        /// Origin as `lat,lng`
        #[arg(allow_hyphen_values = true)]
        origin: Coordinate,

        /// Destination as `lat,lng`
        #[arg(allow_hyphen_values = true)]
        destination: Coordinate,

        /// pedestrian, car, truck, bicycle or scooter
        #[arg(short, long, default_value = "car")]
        mode: TransportMode,

        /// `any`, RFC 3339 time, or local `YYYY-MM-DDTHH:MM:SS`
        #[arg(long, default_value = "any")]
        departure: DepartureTime,

        /// fast or short
        #[arg(long, default_value = "fast")]
        routing_mode: RoutingMode,

        /// none, country or state
        #[arg(long, default_value = "none")]
        border: BorderGranularity,

        /// mile or meter
        #[arg(long, default_value = "mile")]
        unit: LengthUnit,

        /// Print the full router response annotated with the summary
        #[arg(long)]
        full: bool,
    },

    /// Travel times and distances between many points
    ///
    /// Without --destination every origin is paired with every origin.
    Matrix {
        /// Origin as `lat,lng` (repeatable)
        #[arg(long = "origin", required = true, allow_hyphen_values = true)]
        origins: Vec<Coordinate>,

        /// Destination as `lat,lng` (repeatable)
        #[arg(long = "destination", allow_hyphen_values = true)]
        destinations: Vec<Coordinate>,

        /// Named routing profile, e.g. `carFast`
        #[arg(long)]
        profile: Option<String>,

        /// pedestrian, car, truck, bicycle or scooter
        #[arg(short, long)]
        mode: Option<TransportMode>,

        /// fast or short
        #[arg(long)]
        routing_mode: Option<RoutingMode>,

        /// Departure time
        #[arg(long)]
        departure: Option<DepartureTime>,

        /// Extra body field as `key=value`; value is parsed as JSON when possible
        #[arg(long = "option", value_parser = parse_extra_option)]
        options: Vec<(String, Value)>,
    },

    /// Pair every item with every other item
    Combinations {
        /// Items to pair
        items: Vec<String>,

        /// Second list to pair the items with
        #[arg(long = "to", num_args = 1..)]
        to: Option<Vec<String>>,

        /// Keep both directions of each pair
        #[arg(long)]
        both_directions: bool,

        /// Keep pairs of an item with itself
        #[arg(long)]
        include_same: bool,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Parse a `key=value` matrix option
fn parse_extra_option(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Cli {
        config,
        api_key,
        access_token,
        insecure,
        command,
        ..
    } = cli;
    let connect = move || -> anyhow::Result<HereClient> {
        let overrides = Overrides {
            api_key,
            access_token,
            accept_invalid_certs: insecure,
        };
        let config = load_config(config.as_deref(), overrides)?;
        Ok(HereClient::new(&config)?)
    };

    match command {
        Commands::Geocode {
            address,
            limit,
            raw,
        } => {
            let client = connect()?;
            if raw {
                print_json(&client.geocode_raw(&address, limit).await?)?;
            } else {
                print_json(&client.geocode(&address, limit).await?)?;
            }
        },

        Commands::GeocodeLegacy {
            address,
            limit,
            raw,
        } => {
            let client = connect()?;
            if raw {
                print_json(&client.geocode_legacy_raw(&address, limit).await?)?;
            } else {
                print_json(&client.geocode_legacy(&address, limit).await?)?;
            }
        },

        Commands::Reverse { at, limit, raw } => {
            let client = connect()?;
            if raw {
                print_json(&client.reverse_geocode_raw(at, limit).await?)?;
            } else {
                print_json(&client.reverse_geocode(at, limit).await?)?;
            }
        },

        Commands::Browse {
            at,
            categories,
            area,
            name,
            limit,
            raw,
        } => {
            let client = connect()?;
            let filters = BrowseFilters {
                categories,
                area,
                name,
            };
            if raw {
                print_json(&client.browse_raw(at, &filters, limit).await?)?;
            } else {
                print_json(&client.browse(at, &filters, limit).await?)?;
            }
        },

        Commands::Route {
            origin,
            destination,
            mode,
            departure,
            routing_mode,
            border,
            unit,
            full,
        } => {
            let client = connect()?;
            let request = RouteRequest::new(mode)
                .with_departure_time(departure)
                .with_routing_mode(routing_mode)
                .with_border_crossing(border);
            let options = SummaryOptions {
                summary_only: !full,
                unit,
            };
            print_json(
                &client
                    .route_info(origin, destination, &request, options)
                    .await?,
            )?;
        },

        Commands::Matrix {
            origins,
            destinations,
            profile,
            mode,
            routing_mode,
            departure,
            options,
        } => {
            let client = connect()?;
            let mut request = MatrixRequest::new(origins).with_options(MatrixOptions {
                transport_mode: mode,
                routing_mode,
                departure_time: departure,
                extra: options.into_iter().collect::<Map<String, Value>>(),
                ..Default::default()
            });
            if !destinations.is_empty() {
                request = request.with_destinations(destinations);
            }
            if let Some(profile) = profile {
                request = request.with_profile(profile);
            }

            print_json(&client.calculate_matrix(&request).await?)?;
        },

        Commands::Combinations {
            items,
            to,
            both_directions,
            include_same,
        } => {
            let options = CombinationOptions {
                unique: !both_directions,
                include_same,
            };
            print_json(&all_combinations(&items, to.as_deref(), options))?;
        },
    }

    Ok(())
}
