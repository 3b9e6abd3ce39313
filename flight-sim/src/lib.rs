pub mod cli;
pub mod commands;
pub mod config;
pub mod shell;
pub mod test_data;
pub mod types;

pub use types::{
    airspace::AirspaceSnapshot,
    client::RedisStore,
    coordinate::{distance_between, Coordinate},
    emulation::TrafficEmulation,
    flight_record::{FlightDocument, FlightRecord},
    route_error::RouteError,
    store::{FlightStore, MemoryStore, StoreError},
};
