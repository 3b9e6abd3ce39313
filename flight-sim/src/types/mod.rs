pub mod coordinate;

pub mod route_error;

pub mod flight_record;

pub mod route;

pub mod airspace;

pub mod validation;

pub mod store;

pub mod client;

pub mod emulation;
