//! Handles submitted forms: query the roads, report on them and show their traffic lights
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{info, warn};

use crate::{
    model::road::{RoadLabel, SnappedPoint, label_roads},
    presentation::{
        form::{InputError, RawForm, Submission, read_form},
        traffic_lights::{ColorStyle, render_panel},
    },
    services::{
        map_service::MapService,
        road_selector::{FetchMode, HighTrafficRoad, select},
    },
};

pub const APP_TITLE: &str = "Traffic Congestion Analysis";

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The form didn't validate, nothing was fetched
    InvalidInput(InputError),
    /// None of the roads had a traffic reading
    Undetermined { roads: usize },
    HighTraffic {
        label: RoadLabel,
        road: HighTrafficRoad,
        best_value: i64,
        indicators: usize,
    },
}

pub struct TrafficApp<S> {
    service: S,
    fetch_mode: FetchMode,
    color_style: ColorStyle,
}

impl<S: MapService> TrafficApp<S> {
    pub fn new(service: S, fetch_mode: FetchMode, color_style: ColorStyle) -> Self {
        TrafficApp {
            service,
            fetch_mode,
            color_style,
        }
    }

    /// Validates the form and runs one query for it, writing the report to `out`
    #[tracing::instrument(skip(self, out))]
    pub async fn submit<W: Write>(
        &self,
        raw: RawForm,
        out: &mut W,
    ) -> std::io::Result<SubmissionOutcome> {
        let submission = match Submission::try_from(raw) {
            Ok(submission) => submission,
            Err(e) => {
                info!(field = e.field(), "{e}");
                writeln!(out, "Invalid input: {e}")?;
                return Ok(SubmissionOutcome::InvalidInput(e));
            }
        };

        info!(
            latitude = submission.latitude,
            longitude = submission.longitude,
            traffic_box_id = %submission.traffic_box_id,
            range_km = submission.range_km,
            life_cycle_secs = submission.life_cycle_secs,
            "Submitted"
        );

        writeln!(
            out,
            "Location: {:?}, {:?}",
            submission.latitude, submission.longitude
        )?;
        writeln!(out, "Traffic Box ID: {}", submission.traffic_box_id)?;
        writeln!(out, "Range of Device: {:?} km", submission.range_km)?;
        writeln!(out, "Total Life Cycle: {} seconds", submission.life_cycle_secs)?;

        let points = self
            .service
            .nearest_roads(submission.latitude, submission.longitude)
            .await;

        self.process_traffic_data(points, out).await
    }

    async fn process_traffic_data<W: Write>(
        &self,
        mut points: Vec<SnappedPoint>,
        out: &mut W,
    ) -> std::io::Result<SubmissionOutcome> {
        let found = points.len();

        writeln!(out, "Number of roads at the specified location: {found}")?;

        if found > RoadLabel::MAX_ROADS {
            warn!(
                "Got {found} roads, only the first {} can be labeled",
                RoadLabel::MAX_ROADS
            );
            writeln!(
                out,
                "Only the first {} roads are labeled and checked for traffic",
                RoadLabel::MAX_ROADS
            )?;
            points.truncate(RoadLabel::MAX_ROADS);
        }

        let labels = label_roads(&points);

        for (label, point) in labels.iter().zip(&points) {
            writeln!(out, "Road {label}: {point}")?;
        }

        let selection = select(&self.service, &points, self.fetch_mode).await;

        let Some(road) = selection.best else {
            writeln!(out, "Unable to determine the road with higher traffic")?;
            return Ok(SubmissionOutcome::Undetermined {
                roads: points.len(),
            });
        };

        let label = labels[road.position];

        writeln!(
            out,
            "The road with higher traffic is Road {label} with coordinates: {}",
            road.point
        )?;
        writeln!(out, "Highest traffic intensity: {}", selection.best_value)?;

        writeln!(out)?;
        write!(out, "{}", render_panel(&labels, self.color_style))?;

        Ok(SubmissionOutcome::HighTraffic {
            label,
            road,
            best_value: selection.best_value,
            indicators: labels.len(),
        })
    }

    /// Keeps asking for forms until the input ends or a blank latitude is given
    pub async fn run_interactive<R, P, W>(
        &self,
        input: &mut R,
        prompt_out: &mut P,
        out: &mut W,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        P: AsyncWrite + Unpin,
        W: Write,
    {
        writeln!(out, "{APP_TITLE}")?;
        writeln!(out, "Leave the latitude blank to quit.")?;
        out.flush()?;

        while let Some(raw) = read_form(input, prompt_out).await? {
            self.submit(raw, out).await?;
            writeln!(out)?;
            out.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::road_selector::tests::FakeMapService;

    fn zagreb_form() -> RawForm {
        RawForm {
            latitude: "45.8150".to_string(),
            longitude: "16".to_string(),
            traffic_box_id: "TB-1".to_string(),
            range_km: "2".to_string(),
            life_cycle_secs: "600".to_string(),
        }
    }

    fn app(service: FakeMapService) -> TrafficApp<FakeMapService> {
        TrafficApp::new(service, FetchMode::Sequential, ColorStyle::Plain)
    }

    #[tokio::test]
    async fn test_submit_reports_second_road() -> Result<(), anyhow::Error> {
        let app = app(FakeMapService::with_readings(&[Some(120), Some(340), Some(340)]));
        let mut out = Vec::new();

        let outcome = app.submit(zagreb_form(), &mut out).await?;

        let SubmissionOutcome::HighTraffic {
            label,
            road,
            best_value,
            indicators,
        } = outcome
        else {
            panic!("expected a high traffic road");
        };
        assert_eq!(label.letter(), 'B');
        assert_eq!(label.light_color().name(), "red");
        assert_eq!(road.position, 1);
        assert_eq!(best_value, 340);
        assert_eq!(indicators, 3);

        let roads = &app.service.roads;
        let report = String::from_utf8(out)?;
        let expected_head = format!(
            "\
Location: 45.815, 16.0
Traffic Box ID: TB-1
Range of Device: 2.0 km
Total Life Cycle: 600 seconds
Number of roads at the specified location: 3
Road A: {}
Road B: {}
Road C: {}
The road with higher traffic is Road B with coordinates: {}
Highest traffic intensity: 340

Traffic Light Simulation
",
            roads[0], roads[1], roads[2], roads[1]
        );
        assert!(report.starts_with(&expected_head), "{report}");
        assert!(report.contains("Road A   Road B   Road C\n"));

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_without_readings() -> Result<(), anyhow::Error> {
        let app = app(FakeMapService::with_readings(&[None, None]));
        let mut out = Vec::new();

        let outcome = app.submit(zagreb_form(), &mut out).await?;

        assert!(matches!(outcome, SubmissionOutcome::Undetermined { roads: 2 }));
        let report = String::from_utf8(out)?;
        assert!(report.ends_with("Unable to determine the road with higher traffic\n"));
        assert!(!report.contains("Traffic Light Simulation"));

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_without_roads() -> Result<(), anyhow::Error> {
        let app = app(FakeMapService::default());
        let mut out = Vec::new();

        let outcome = app.submit(zagreb_form(), &mut out).await?;

        assert!(matches!(outcome, SubmissionOutcome::Undetermined { roads: 0 }));
        assert!(app.service.traffic_calls.borrow().is_empty());
        assert!(
            String::from_utf8(out)?
                .contains("Number of roads at the specified location: 0\n")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_requests() -> Result<(), anyhow::Error> {
        let app = app(FakeMapService::with_readings(&[Some(1)]));
        let mut out = Vec::new();
        let mut form = zagreb_form();
        form.life_cycle_secs = "ten minutes".to_string();

        let outcome = app.submit(form, &mut out).await?;

        assert!(matches!(outcome, SubmissionOutcome::InvalidInput(_)));
        assert_eq!(*app.service.road_calls.borrow(), 0);
        assert!(String::from_utf8(out)?.starts_with("Invalid input: "));

        Ok(())
    }

    #[tokio::test]
    async fn test_more_roads_than_letters() -> Result<(), anyhow::Error> {
        let mut readings = vec![Some(1); 30];
        readings[28] = Some(1000);
        readings[3] = Some(50);
        let app = app(FakeMapService::with_readings(&readings));
        let mut out = Vec::new();

        let outcome = app.submit(zagreb_form(), &mut out).await?;

        // the 29th road is dropped before the selection
        let SubmissionOutcome::HighTraffic {
            label,
            best_value,
            indicators,
            ..
        } = outcome
        else {
            panic!("expected a high traffic road");
        };
        assert_eq!(label.letter(), 'D');
        assert_eq!(best_value, 50);
        assert_eq!(indicators, RoadLabel::MAX_ROADS);
        assert_eq!(app.service.traffic_calls.borrow().len(), RoadLabel::MAX_ROADS);

        let report = String::from_utf8(out)?;
        assert!(report.contains("Number of roads at the specified location: 30\n"));
        assert!(report.contains("Only the first 26 roads are labeled and checked for traffic\n"));
        assert!(report.contains("Road Z: "));
        assert!(!report.contains(&app.service.roads[26].to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_interactive_session() -> Result<(), anyhow::Error> {
        let app = app(FakeMapService::with_readings(&[Some(7), None]));
        let mut input: &[u8] = b"45.8\n15.9\nbox\n1\n60\nabc\n15.9\nbox\n1\n60\n\n";
        let mut prompts = Vec::new();
        let mut out = Vec::new();

        app.run_interactive(&mut input, &mut prompts, &mut out)
            .await?;

        let report = String::from_utf8(out)?;
        assert!(report.starts_with(APP_TITLE));
        assert_eq!(report.matches("Highest traffic intensity: 7").count(), 1);
        assert_eq!(report.matches("Invalid input: ").count(), 1);
        assert_eq!(*app.service.road_calls.borrow(), 1);

        Ok(())
    }
}
