//! Picks the road with the most traffic out of the roads snapped for a query
use futures::future::join_all;
use tracing::info;

use crate::{model::road::SnappedPoint, services::map_service::MapService};

/// Value reported when none of the roads had a traffic reading
pub const NO_READING: i64 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// One request after another in the order the roads were returned
    #[default]
    Sequential,
    /// All requests of a query in flight at once
    Concurrent,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HighTrafficRoad {
    /// Index into the list the selection was made from
    pub position: usize,
    pub point: SnappedPoint,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoadSelection {
    pub best: Option<HighTrafficRoad>,
    /// Traffic duration of `best` in seconds, [`NO_READING`] without a best road
    pub best_value: i64,
}

impl RoadSelection {
    pub const NONE: RoadSelection = RoadSelection {
        best: None,
        best_value: NO_READING,
    };
}

/// Fetches the traffic duration of every point and returns the one with the longest.
///
/// Points without a reading are skipped. On a tie the earlier point wins.
#[tracing::instrument(ret, skip(service, points), fields(roads = points.len()))]
pub async fn select<S: MapService>(
    service: &S,
    points: &[SnappedPoint],
    mode: FetchMode,
) -> RoadSelection {
    let readings = match mode {
        FetchMode::Sequential => {
            let mut readings = Vec::with_capacity(points.len());
            for point in points {
                readings.push(
                    service
                        .traffic_duration(point.latitude, point.longitude)
                        .await,
                );
            }
            readings
        }
        // join_all keeps the input order so the tie break stays the same
        FetchMode::Concurrent => {
            join_all(
                points
                    .iter()
                    .map(|point| service.traffic_duration(point.latitude, point.longitude)),
            )
            .await
        }
    };

    pick_highest(points, &readings)
}

fn pick_highest(points: &[SnappedPoint], readings: &[Option<i64>]) -> RoadSelection {
    let mut selection = RoadSelection::NONE;

    for (position, (point, reading)) in points.iter().zip(readings).enumerate() {
        let Some(reading) = *reading else {
            info!(position, "no traffic reading");
            continue;
        };

        if reading > selection.best_value {
            selection = RoadSelection {
                best: Some(HighTrafficRoad {
                    position,
                    point: *point,
                }),
                best_value: reading,
            };
        }
    }

    selection
}
