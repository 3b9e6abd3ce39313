use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::{
    flight_record::{FlightDocument, FlightRecord},
    route,
    route_error::RouteError,
};

/// The flights in the air at one instant, plus the flights that could not be
/// evaluated. Flights in transit keep the document they were stored as.
#[derive(Debug)]
pub struct AirspaceSnapshot {
    pub at: NaiveDateTime,
    pub in_transit: BTreeMap<String, FlightDocument>,
    pub rejected: Vec<(String, RouteError)>,
}

impl AirspaceSnapshot {
    pub fn new(at: NaiveDateTime) -> Self {
        AirspaceSnapshot {
            at,
            in_transit: BTreeMap::new(),
            rejected: Vec::new(),
        }
    }

    /// Records a flight skipped by the query.
    pub fn reject(&mut self, number: &str, error: RouteError) {
        self.rejected.push((number.to_string(), error));
    }

    pub fn flight_numbers(&self) -> Vec<&str> {
        self.in_transit.keys().map(String::as_str).collect()
    }
}

/// Whether the flight has departed and not yet arrived at `at`. Both ends are
/// exclusive.
pub fn is_in_transit(record: &FlightRecord, at: NaiveDateTime) -> Result<bool, RouteError> {
    let arrival = route::total_arrival_time(record)?;
    Ok(record.start < at && at < arrival)
}

/// Filters stored documents down to the ones in the air at `at`. A document
/// that cannot be decoded, or whose arrival cannot be computed, lands in the
/// rejection list.
pub fn flights_in_transit(
    documents: impl IntoIterator<Item = (String, FlightDocument)>,
    at: NaiveDateTime,
) -> AirspaceSnapshot {
    let mut snapshot = AirspaceSnapshot::new(at);

    for (number, document) in documents {
        let in_transit = FlightRecord::try_from(document.clone())
            .and_then(|record| is_in_transit(&record, at));
        match in_transit {
            Ok(true) => {
                snapshot.in_transit.insert(number, document);
            }
            Ok(false) => {}
            Err(error) => snapshot.reject(&number, error),
        }
    }

    snapshot
}
