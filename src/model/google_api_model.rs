use serde::{Deserialize, Serialize};

use super::road::SnappedPoint;

/// Body of a Roads API `nearestRoads` response.
///
/// `snapped_points` is left out entirely when no road is close enough to the query.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestRoadsResponse {
    pub snapped_points: Option<Vec<GoogleSnappedPoint>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSnappedPoint {
    pub location: LatLng,
    /// Index of the queried point this was snapped from
    pub original_index: Option<u32>,
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GoogleSnappedPoint> for SnappedPoint {
    fn from(value: GoogleSnappedPoint) -> Self {
        SnappedPoint {
            latitude: value.location.latitude,
            longitude: value.location.longitude,
        }
    }
}

/// Body of a Distance Matrix response.
///
/// A denied or invalid request still comes back as 200 with a non `OK` status,
/// an explanation in `error_message` and no rows.
#[derive(Debug, Deserialize, Serialize)]
pub struct DistanceMatrixResponse {
    pub status: Option<String>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MatrixElement {
    pub status: Option<String>,
    pub duration: Option<TextValue>,
    /// Only present when a departure time was requested and traffic data exists
    pub duration_in_traffic: Option<TextValue>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TextValue {
    /// Seconds for durations
    pub value: i64,
    pub text: Option<String>,
}

impl DistanceMatrixResponse {
    /// The first element of the first row, if the matrix has one
    pub fn first_element(&self) -> Option<&MatrixElement> {
        self.rows.first()?.elements.first()
    }
}
