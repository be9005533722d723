//! The input form and its validation
use std::num::{ParseFloatError, ParseIntError};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const LATITUDE: &str = "Latitude:";
pub const LONGITUDE: &str = "Longitude:";
pub const TRAFFIC_BOX_ID: &str = "Traffic Box ID:";
pub const RANGE_KM: &str = "Range of Device (in km):";
pub const LIFE_CYCLE_SECS: &str = "Total Life Cycle (in seconds):";

/// Form fields as typed in
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawForm {
    pub latitude: String,
    pub longitude: String,
    pub traffic_box_id: String,
    pub range_km: String,
    pub life_cycle_secs: String,
}

/// A validated form.
///
/// Only the coordinate is used for the query, the rest is recorded alongside it.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub latitude: f64,
    pub longitude: f64,
    pub traffic_box_id: String,
    pub range_km: f64,
    pub life_cycle_secs: i64,
}

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("{field} could not convert {value:?} to a number: {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        source: ParseFloatError,
    },

    #[error("{field} could not convert {value:?} to a whole number: {source}")]
    InvalidInteger {
        field: &'static str,
        value: String,
        source: ParseIntError,
    },
}

impl InputError {
    pub fn field(&self) -> &'static str {
        match self {
            InputError::InvalidNumber { field, .. } | InputError::InvalidInteger { field, .. } => {
                *field
            }
        }
    }
}

impl TryFrom<RawForm> for Submission {
    type Error = InputError;

    fn try_from(value: RawForm) -> Result<Self, Self::Error> {
        Ok(Submission {
            latitude: parse_float(LATITUDE, &value.latitude)?,
            longitude: parse_float(LONGITUDE, &value.longitude)?,
            range_km: parse_float(RANGE_KM, &value.range_km)?,
            life_cycle_secs: value.life_cycle_secs.trim().parse().map_err(|source| {
                InputError::InvalidInteger {
                    field: LIFE_CYCLE_SECS,
                    value: value.life_cycle_secs.clone(),
                    source,
                }
            })?,
            traffic_box_id: value.traffic_box_id,
        })
    }
}

fn parse_float(field: &'static str, value: &str) -> Result<f64, InputError> {
    value
        .trim()
        .parse()
        .map_err(|source| InputError::InvalidNumber {
            field,
            value: value.to_string(),
            source,
        })
}

/// Prompts for every field of the form.
///
/// Returns `None` when the input ends or the latitude is left blank.
pub async fn read_form<R, W>(input: &mut R, output: &mut W) -> std::io::Result<Option<RawForm>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(latitude) = prompt(LATITUDE, input, output).await? else {
        return Ok(None);
    };
    if latitude.trim().is_empty() {
        return Ok(None);
    }

    let Some(longitude) = prompt(LONGITUDE, input, output).await? else {
        return Ok(None);
    };
    let Some(traffic_box_id) = prompt(TRAFFIC_BOX_ID, input, output).await? else {
        return Ok(None);
    };
    let Some(range_km) = prompt(RANGE_KM, input, output).await? else {
        return Ok(None);
    };
    let Some(life_cycle_secs) = prompt(LIFE_CYCLE_SECS, input, output).await? else {
        return Ok(None);
    };

    Ok(Some(RawForm {
        latitude,
        longitude,
        traffic_box_id,
        range_km,
        life_cycle_secs,
    }))
}

async fn prompt<R, W>(label: &str, input: &mut R, output: &mut W) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(format!("{label} ").as_bytes()).await?;
    output.flush().await?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
