use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use rand::Rng;

use crate::types::{
    coordinate::Coordinate,
    emulation::TrafficEmulation,
    flight_record::{format_timestamp, FlightDocument},
    route_error::RouteError,
    store::FlightStore,
};

const SAMPLE_ROUTES: [(&str, &str, &str, &str, [[f64; 2]; 3], &str); 2] = [
    (
        "FFFFFF",
        "Boeing 737-46Q(SF)",
        "RA-89051",
        "2016-01-07 9:00",
        [[33.55, 33.0], [37.0, 24.0], [43.0, 45.0]],
        "375",
    ),
    (
        "IV4673",
        "Boeing 737-8LJ",
        "EI-FCH",
        "2016-01-07 15:00",
        [[60.0, 53.0], [67.0, 28.0], [75.0, 53.0]],
        "382",
    ),
];

// (IATA, latitude, longitude)
const AIRPORTS: [(&str, f64, f64); 16] = [
    ("AEP", -34.553, -58.413),
    ("EZE", -34.822, -58.535),
    ("COR", -31.321, -64.213),
    ("MDZ", -32.883, -68.845),
    ("BRC", -41.151, -71.158),
    ("USH", -54.843, -68.295),
    ("SLA", -24.854, -65.486),
    ("NQN", -38.949, -68.156),
    ("SVO", 55.973, 37.415),
    ("LED", 59.800, 30.262),
    ("KZN", 55.606, 49.279),
    ("IST", 41.262, 28.742),
    ("LHR", 51.470, -0.454),
    ("MAD", 40.472, -3.561),
    ("JFK", 40.641, -73.778),
    ("GRU", -23.435, -46.473),
];

const AIRCRAFT: [&str; 4] = ["Airbus A320", "Boeing 737-800", "Embraer E190", "Airbus A330-200"];

/// The two sample routes with their historic departures.
pub fn sample_routes() -> Vec<(String, FlightDocument)> {
    SAMPLE_ROUTES
        .iter()
        .map(|(number, name, registration, start, trajectory, speed)| {
            let document = FlightDocument {
                name: name.to_string(),
                registration: registration.to_string(),
                start: start.to_string(),
                tr: trajectory.iter().map(|&point| Coordinate::from(point)).collect(),
                speed: speed.to_string(),
            };
            (number.to_string(), document)
        })
        .collect()
}

/// Builds `count` random flights between known airports, departing within
/// six hours either side of `now`, with an intermediate waypoint. Flight
/// numbers never repeat and never clash with the sample routes.
pub fn random_routes(rng: &mut impl Rng, now: NaiveDateTime, count: usize) -> Vec<(String, FlightDocument)> {
    let mut routes = Vec::with_capacity(count);
    let mut taken: HashSet<String> = SAMPLE_ROUTES.iter().map(|route| route.0.to_string()).collect();

    while routes.len() < count {
        let (origin, origin_lat, origin_long) = AIRPORTS[rng.gen_range(0..AIRPORTS.len())];
        let (destination, dest_lat, dest_long) = AIRPORTS[rng.gen_range(0..AIRPORTS.len())];
        if origin == destination {
            continue;
        }

        let waypoint = Coordinate::new(
            (origin_lat + dest_lat) / 2.0 + rng.gen_range(-2.0..=2.0),
            (origin_long + dest_long) / 2.0 + rng.gen_range(-2.0..=2.0),
        );
        let departure = now + Duration::minutes(rng.gen_range(-360..=360));
        let number = loop {
            let candidate = format!("{}{:04}", &origin[..2], rng.gen_range(1000..=9999));
            if taken.insert(candidate.clone()) {
                break candidate;
            }
        };

        let document = FlightDocument {
            name: AIRCRAFT[rng.gen_range(0..AIRCRAFT.len())].to_string(),
            registration: format!("LV-{}", rng.gen_range(100..999)),
            start: format_timestamp(&departure),
            tr: vec![
                Coordinate::new(origin_lat, origin_long),
                waypoint,
                Coordinate::new(dest_lat, dest_long),
            ],
            speed: rng.gen_range(400..=900).to_string(),
        };
        routes.push((number, document));
    }

    routes
}

/// Stores the sample routes plus `random` generated flights. Returns the
/// stored flight numbers.
pub fn seed<S: FlightStore>(
    emulation: &mut TrafficEmulation<S>,
    now: NaiveDateTime,
    random: usize,
) -> Result<Vec<String>, RouteError> {
    let mut rng = rand::thread_rng();
    let mut routes = sample_routes();
    routes.extend(random_routes(&mut rng, now, random));

    let mut stored = Vec::with_capacity(routes.len());
    for (number, document) in routes {
        emulation.add_document(&number, &document)?;
        stored.push(number);
    }
    Ok(stored)
}
