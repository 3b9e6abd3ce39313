use chrono::{Duration, NaiveDateTime};

use super::{
    coordinate::{distance_between, Coordinate},
    flight_record::{format_timestamp, FlightRecord},
    route_error::RouteError,
};

/// Distance in km covered by the whole trajectory, departure to destination.
pub fn total_distance(record: &FlightRecord) -> Result<f64, RouteError> {
    let trajectory = checked_trajectory(record)?;
    Ok(sum_of_legs(trajectory, trajectory.len() - 1))
}

/// Distance in km of leg `leg`, between waypoints `leg - 1` and `leg`.
pub fn partial_distance(record: &FlightRecord, leg: usize) -> Result<f64, RouteError> {
    let trajectory = checked_trajectory(record)?;
    let last = trajectory.len() - 1;
    if leg < 1 || leg > last {
        return Err(RouteError::OutOfRange {
            leg,
            min: 1,
            max: last,
        });
    }
    Ok(distance_between(&trajectory[leg - 1], &trajectory[leg]))
}

/// Estimated arrival at the destination.
pub fn total_arrival_time(record: &FlightRecord) -> Result<NaiveDateTime, RouteError> {
    let distance = total_distance(record)?;
    arrival_after(record, distance)
}

/// Estimated arrival at waypoint `leg`, after flying the first `leg` legs.
/// Leg 0 is the departure itself.
pub fn partial_arrival_time(record: &FlightRecord, leg: usize) -> Result<NaiveDateTime, RouteError> {
    let trajectory = checked_trajectory(record)?;
    let last = trajectory.len() - 1;
    if leg > last {
        return Err(RouteError::OutOfRange {
            leg,
            min: 0,
            max: last,
        });
    }
    arrival_after(record, sum_of_legs(trajectory, leg))
}

fn checked_trajectory(record: &FlightRecord) -> Result<&[Coordinate], RouteError> {
    if record.trajectory.len() < 2 {
        return Err(RouteError::InvalidTrajectory(record.trajectory.len()));
    }
    Ok(&record.trajectory)
}

fn sum_of_legs(trajectory: &[Coordinate], legs: usize) -> f64 {
    trajectory
        .windows(2)
        .take(legs)
        .map(|leg| distance_between(&leg[0], &leg[1]))
        .sum()
}

/// Flight time is rounded to whole hours before it is added to the departure.
fn arrival_after(record: &FlightRecord, distance: f64) -> Result<NaiveDateTime, RouteError> {
    if record.speed == 0 {
        return Err(RouteError::InvalidSpeed(record.speed.to_string()));
    }
    let hours = (distance / f64::from(record.speed)).round() as i64;
    Duration::try_hours(hours)
        .and_then(|flight_time| record.start.checked_add_signed(flight_time))
        .ok_or_else(|| RouteError::InvalidTimestamp(format_timestamp(&record.start)))
}
