//! Command line and environment configuration
use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, builder::NonEmptyStringValueParser};

use crate::{
    presentation::{form::RawForm, traffic_lights::ColorStyle},
    services::road_selector::FetchMode,
};

pub const NEAREST_ROADS_URL: &str = "https://roads.googleapis.com/v1/nearestRoads";
pub const DISTANCE_MATRIX_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Finds the roads next to a coordinate and shows a traffic light for each of them
#[derive(Parser, Debug)]
#[command(name = "road_traffic_lights", version)]
pub struct Cli {
    /// Google Maps API key used for both the Roads and the Distance Matrix API
    #[arg(
        long,
        env = "GOOGLE_MAPS_API_KEY",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub api_key: String,

    #[arg(long, env = "ROADS_API_URL", default_value = NEAREST_ROADS_URL)]
    pub roads_url: String,

    #[arg(long, env = "DISTANCE_MATRIX_API_URL", default_value = DISTANCE_MATRIX_URL)]
    pub distance_matrix_url: String,

    /// Timeout of a single HTTP request
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Fetch the traffic of all roads at once instead of one after another
    #[arg(long)]
    pub concurrent: bool,

    /// Draw the traffic lights without ANSI colors
    #[arg(long)]
    pub plain: bool,

    #[arg(long, env = "LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Also export spans to this OTLP gRPC endpoint
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    #[command(flatten)]
    pub form: FormArgs,
}

/// The input form given up front. Without `--latitude` the form is asked for interactively.
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,

    #[arg(long)]
    pub traffic_box_id: Option<String>,

    /// Range of the device in kilometers
    #[arg(long, allow_hyphen_values = true)]
    pub range_km: Option<String>,

    /// Total life cycle of the device in seconds
    #[arg(long, allow_hyphen_values = true)]
    pub life_cycle_secs: Option<String>,
}

impl FormArgs {
    /// Missing fields are left empty and get rejected like an empty form field would be
    pub fn into_raw_form(self) -> Option<RawForm> {
        Some(RawForm {
            latitude: self.latitude?,
            longitude: self.longitude.unwrap_or_default(),
            traffic_box_id: self.traffic_box_id.unwrap_or_default(),
            range_km: self.range_km.unwrap_or_default(),
            life_cycle_secs: self.life_cycle_secs.unwrap_or_default(),
        })
    }
}

/// Everything the map service needs to talk to Google
#[derive(Clone)]
pub struct MapsConfig {
    pub api_key: String,
    pub roads_url: String,
    pub distance_matrix_url: String,
    pub timeout: Duration,
}

impl From<&Cli> for MapsConfig {
    fn from(cli: &Cli) -> Self {
        MapsConfig {
            api_key: cli.api_key.clone(),
            roads_url: cli.roads_url.clone(),
            distance_matrix_url: cli.distance_matrix_url.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
        }
    }
}

impl Cli {
    pub fn fetch_mode(&self) -> FetchMode {
        if self.concurrent {
            FetchMode::Concurrent
        } else {
            FetchMode::Sequential
        }
    }

    pub fn color_style(&self) -> ColorStyle {
        if self.plain {
            ColorStyle::Plain
        } else {
            ColorStyle::Ansi
        }
    }
}
