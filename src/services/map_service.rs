//! Responsible for talking to the Google Roads and Distance Matrix APIs
use std::fmt;

use itertools::Itertools;
use reqwest::{Client, Response};
use tracing::{Instrument, info, info_span, warn};

use crate::{
    config::MapsConfig,
    model::{
        google_api_model::{DistanceMatrixResponse, NearestRoadsResponse},
        road::SnappedPoint,
    },
};

/// The two lookups a query needs from a map provider.
///
/// Failures never reach the caller, an unreachable service looks the same as one without data.
pub trait MapService {
    /// Points on the roads nearest to the coordinate. Empty if none could be fetched.
    async fn nearest_roads(&self, latitude: f64, longitude: f64) -> Vec<SnappedPoint>;

    /// Seconds a trip from the coordinate to itself takes in current traffic
    async fn traffic_duration(&self, latitude: f64, longitude: f64) -> Option<i64>;
}

pub struct GoogleMapService {
    client: Client,
    config: MapsConfig,
}

impl GoogleMapService {
    pub fn new(config: MapsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(GoogleMapService { client, config })
    }

    #[tracing::instrument(err, skip(self))]
    async fn fetch_nearest_roads(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<SnappedPoint>, MapsApiError> {
        let body = self
            .get(
                Endpoint::NearestRoads,
                &self.config.roads_url,
                &[("points", format!("{latitude},{longitude}"))],
            )
            .await?;

        let points = parse_nearest_roads(&body)?;

        info!("got {} snapped points", points.len());

        Ok(points)
    }

    #[tracing::instrument(ret, err, skip(self))]
    async fn fetch_traffic_duration(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<i64>, MapsApiError> {
        let coordinate = format!("{latitude},{longitude}");

        let body = self
            .get(
                Endpoint::DistanceMatrix,
                &self.config.distance_matrix_url,
                &[
                    ("origins", coordinate.clone()),
                    ("destinations", coordinate),
                    ("departure_time", "now".to_string()),
                    ("traffic_model", "best_guess".to_string()),
                ],
            )
            .await?;

        parse_traffic_duration(&body)
    }

    /// GETs the url with the API key appended and returns the body of a successful response
    async fn get(
        &self,
        endpoint: Endpoint,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<String, MapsApiError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .instrument(info_span!("Sending request", %endpoint))
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| MapsApiError::http(endpoint, e))?;

        response
            .text()
            .instrument(info_span!("Reading body of response"))
            .await
            .map_err(|e| MapsApiError::http(endpoint, e))
    }
}

impl MapService for GoogleMapService {
    async fn nearest_roads(&self, latitude: f64, longitude: f64) -> Vec<SnappedPoint> {
        // already logged by the instrumentation
        self.fetch_nearest_roads(latitude, longitude)
            .await
            .unwrap_or_default()
    }

    async fn traffic_duration(&self, latitude: f64, longitude: f64) -> Option<i64> {
        self.fetch_traffic_duration(latitude, longitude)
            .await
            .ok()
            .flatten()
    }
}

fn parse_nearest_roads(body: &str) -> Result<Vec<SnappedPoint>, MapsApiError> {
    let response: NearestRoadsResponse =
        serde_json::from_str(body).map_err(|source| MapsApiError::ParsingError {
            endpoint: Endpoint::NearestRoads,
            source,
            body: body.to_string(),
        })?;

    let Some(snapped_points) = response.snapped_points else {
        warn!("No snapped points found");
        return Ok(vec![]);
    };

    Ok(snapped_points
        .into_iter()
        .map(SnappedPoint::from)
        .collect_vec())
}

/// `Ok(None)` is a valid answer without traffic data for the location
fn parse_traffic_duration(body: &str) -> Result<Option<i64>, MapsApiError> {
    let response: DistanceMatrixResponse =
        serde_json::from_str(body).map_err(|source| MapsApiError::ParsingError {
            endpoint: Endpoint::DistanceMatrix,
            source,
            body: body.to_string(),
        })?;

    let Some(element) = response.first_element() else {
        warn!(
            status = ?response.status,
            error_message = ?response.error_message,
            "No traffic data available for the specified location"
        );
        return Ok(None);
    };

    if element.duration_in_traffic.is_none() {
        info!(status = ?element.status, "Element without duration in traffic");
    }

    Ok(element.duration_in_traffic.as_ref().map(|d| d.value))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    NearestRoads,
    DistanceMatrix,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::NearestRoads => write!(f, "Roads API"),
            Endpoint::DistanceMatrix => write!(f, "Distance Matrix API"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MapsApiError {
    #[error("error fetching data from the {endpoint}: {source}")]
    HttpRequestError {
        endpoint: Endpoint,
        source: reqwest::Error,
    },

    #[error("error parsing the {endpoint} response: {source}\n{body}")]
    ParsingError {
        endpoint: Endpoint,
        source: serde_json::Error,
        body: String,
    },
}

impl MapsApiError {
    /// The request url carries the API key so it's stripped before the error gets logged
    fn http(endpoint: Endpoint, source: reqwest::Error) -> Self {
        MapsApiError::HttpRequestError {
            endpoint,
            source: source.without_url(),
        }
    }
}
