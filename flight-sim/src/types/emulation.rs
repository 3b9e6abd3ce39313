use chrono::{Local, NaiveDateTime};

use super::{
    airspace::{self, AirspaceSnapshot},
    flight_record::{format_timestamp, FlightDocument, FlightRecord},
    route,
    route_error::RouteError,
    store::FlightStore,
    validation,
};

/// Air traffic emulation over the flights kept in a [`FlightStore`].
///
/// The store is injected by the caller; the emulation holds no other state.
pub struct TrafficEmulation<S: FlightStore> {
    store: S,
}

impl<S: FlightStore> TrafficEmulation<S> {
    pub fn new(store: S) -> Self {
        TrafficEmulation { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates `raw` and stores it under `number`, replacing any previous
    /// flight with that number. Nothing is written when validation fails.
    pub fn add_flight(&mut self, number: &str, raw: &str) -> Result<FlightRecord, RouteError> {
        let (document, record) = validation::validate(raw)?;
        self.add_document(number, &document)?;
        Ok(record)
    }

    pub fn add_document(&mut self, number: &str, document: &FlightDocument) -> Result<(), RouteError> {
        let json = document
            .to_json()
            .map_err(|e| RouteError::Validation(e.to_string()))?;
        self.store.put(number, &json)?;
        Ok(())
    }

    /// Imports every flight of a `{"routes": {...}}` document. All flights are
    /// validated before the first one is written.
    pub fn import_routes(&mut self, raw: &str) -> Result<Vec<String>, RouteError> {
        let documents = validation::parse_routes(raw)?;

        let mut imported = Vec::with_capacity(documents.len());
        for (number, document) in documents {
            self.add_document(&number, &document)?;
            imported.push(number);
        }
        Ok(imported)
    }

    /// Fetches and decodes one flight.
    pub fn record(&mut self, number: &str) -> Result<FlightRecord, RouteError> {
        let document = self
            .store
            .get(number)?
            .ok_or_else(|| RouteError::NotFound(number.to_string()))?;
        decode(&document)
    }

    pub fn total_distance(&mut self, number: &str) -> Result<f64, RouteError> {
        route::total_distance(&self.record(number)?)
    }

    pub fn partial_distance(&mut self, number: &str, leg: usize) -> Result<f64, RouteError> {
        route::partial_distance(&self.record(number)?, leg)
    }

    pub fn total_arrival_time(&mut self, number: &str) -> Result<String, RouteError> {
        let arrival = route::total_arrival_time(&self.record(number)?)?;
        Ok(format_timestamp(&arrival))
    }

    pub fn partial_arrival_time(&mut self, number: &str, leg: usize) -> Result<String, RouteError> {
        let arrival = route::partial_arrival_time(&self.record(number)?, leg)?;
        Ok(format_timestamp(&arrival))
    }

    /// Flights in the air at `at`, or at the current local time when `None`.
    ///
    /// Only a store failure aborts the query. Flights whose documents cannot
    /// be decoded are listed in [`AirspaceSnapshot::rejected`], ordered by
    /// flight number.
    pub fn flights_in_transit(
        &mut self,
        at: Option<NaiveDateTime>,
    ) -> Result<AirspaceSnapshot, RouteError> {
        let at = at.unwrap_or_else(|| Local::now().naive_local());

        let mut documents = Vec::new();
        let mut unreadable = Vec::new();
        for (number, json) in self.store.get_all()? {
            match read_document(&json) {
                Ok(document) => documents.push((number, document)),
                Err(error) => unreadable.push((number, error)),
            }
        }

        let mut snapshot = airspace::flights_in_transit(documents, at);
        for (number, error) in unreadable {
            snapshot.reject(&number, error);
        }
        snapshot.rejected.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(snapshot)
    }
}

fn read_document(json: &str) -> Result<FlightDocument, RouteError> {
    FlightDocument::from_json(json).map_err(|e| RouteError::MalformedRecord(e.to_string()))
}

fn decode(json: &str) -> Result<FlightRecord, RouteError> {
    FlightRecord::try_from(read_document(json)?)
}
