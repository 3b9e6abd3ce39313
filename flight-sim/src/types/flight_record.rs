use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::{DATE_TIME_FORMAT, DATE_TIME_INPUT_FORMAT};

use super::{coordinate::Coordinate, route_error::RouteError};

/// A flight exactly as it is persisted in the key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlightDocument {
    pub name: String,
    pub registration: String,
    pub start: String,
    pub tr: Vec<Coordinate>,
    pub speed: String,
}

impl FlightDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A decoded flight: departure parsed, speed as a whole number of km/h and
/// at least two waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub name: String,
    pub registration: String,
    pub start: NaiveDateTime,
    pub trajectory: Vec<Coordinate>,
    pub speed: u32,
}

impl TryFrom<FlightDocument> for FlightRecord {
    type Error = RouteError;

    fn try_from(document: FlightDocument) -> Result<Self, Self::Error> {
        let start = parse_timestamp(&document.start)?;
        let speed = parse_speed(&document.speed)?;
        if document.tr.len() < 2 {
            return Err(RouteError::InvalidTrajectory(document.tr.len()));
        }

        Ok(FlightRecord {
            name: document.name,
            registration: document.registration,
            start,
            trajectory: document.tr,
            speed,
        })
    }
}

/// Parses a `Y-m-j H:i` timestamp such as `2016-01-07 9:00`.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, RouteError> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_INPUT_FORMAT)
        .map_err(|_| RouteError::InvalidTimestamp(text.to_string()))
}

/// Renders a timestamp as `Y-m-j H:i`, e.g. `2016-01-7 16:00`.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DATE_TIME_FORMAT).to_string()
}

/// Reads the stored speed string as whole km/h. A fractional value is
/// truncated; zero, negative and non-numeric values are rejected.
pub fn parse_speed(text: &str) -> Result<u32, RouteError> {
    let invalid = || RouteError::InvalidSpeed(text.to_string());
    let trimmed = text.trim();

    let speed = match trimmed.parse::<u32>() {
        Ok(speed) => speed,
        Err(_) => {
            let value = trimmed.parse::<f64>().map_err(|_| invalid())?;
            if !value.is_finite() || value < 1.0 || value > f64::from(u32::MAX) {
                return Err(invalid());
            }
            value.trunc() as u32
        }
    };

    if speed == 0 {
        return Err(invalid());
    }
    Ok(speed)
}
