use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use crate::{
    config::IN_AIR_ARG_SEPARATOR,
    test_data,
    types::{
        airspace::AirspaceSnapshot, emulation::TrafficEmulation, flight_record::parse_timestamp,
        route_error::RouteError, store::FlightStore,
    },
};

const RANDOM_TEST_FLIGHTS: usize = 10;

pub const HELP: &str = "\
Available commands:
  distance, d <flight>
    Total distance in km of the route.
  part-distance, s <flight> <leg>
    Distance in km of leg n, between waypoints n-1 and n.
  time-arrival, t <flight>
    Estimated time of arrival at the destination.
  part-time-arrival, p <flight> <leg>
    Estimated time of arrival at waypoint n.
  in-air, i [YYYY-MM-DD HH:MM]
    Flights already departed that have not reached their destination.
    Defaults to the current time.
  add, a <flight> <file>
    Validates the JSON flight in <file> and stores it.
  load, l <file>
    Imports every flight of a {\"routes\": {...}} JSON file.
  test-data
    Stores two sample routes and a few random flights departing around now.
  help, h
    Shows this help.
  quit, q, exit
    Ends the session.";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for the list of commands")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid leg '{0}', expected a non-negative integer")]
    InvalidLeg(String),
    #[error("invalid flight and leg '{0}', expected FLIGHT:LEG")]
    InvalidFlightLeg(String),
    #[error("{number}: {source}")]
    Flight {
        number: String,
        #[source]
        source: RouteError,
    },
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot render reply: {0}")]
    Render(#[from] serde_json::Error),
}

/// A request to the emulation, typed in the interactive session or built from
/// command-line options. Flight numbers are upper-cased.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Distance(String),
    PartDistance(String, usize),
    TimeArrival(String),
    PartTimeArrival(String, usize),
    InAir(Option<NaiveDateTime>),
    Add { number: String, path: PathBuf },
    Load(PathBuf),
    TestData,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parses one line of the interactive session. A blank line is `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let name = match words.next() {
            Some(name) => name,
            None => return Ok(None),
        };
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("distance" | "d", [flight]) => ShellCommand::Distance(flight_number(flight)),
            ("distance" | "d", _) => return Err(CommandError::Usage("distance <flight>")),

            ("part-distance" | "s", [flight, leg]) => {
                ShellCommand::PartDistance(flight_number(flight), parse_leg(leg)?)
            }
            ("part-distance" | "s", _) => {
                return Err(CommandError::Usage("part-distance <flight> <leg>"))
            }

            ("time-arrival" | "t", [flight]) => ShellCommand::TimeArrival(flight_number(flight)),
            ("time-arrival" | "t", _) => return Err(CommandError::Usage("time-arrival <flight>")),

            ("part-time-arrival" | "p", [flight, leg]) => {
                ShellCommand::PartTimeArrival(flight_number(flight), parse_leg(leg)?)
            }
            ("part-time-arrival" | "p", _) => {
                return Err(CommandError::Usage("part-time-arrival <flight> <leg>"))
            }

            ("in-air" | "i", []) => ShellCommand::InAir(None),
            ("in-air" | "i", [date_time]) => ShellCommand::InAir(Some(parse_in_air_arg(date_time)?)),
            ("in-air" | "i", [date, time]) => {
                ShellCommand::InAir(Some(parse_timestamp(&format!("{} {}", date, time))?))
            }
            ("in-air" | "i", _) => return Err(CommandError::Usage("in-air [YYYY-MM-DD HH:MM]")),

            ("add" | "a", [flight, path]) => ShellCommand::Add {
                number: flight_number(flight),
                path: PathBuf::from(path),
            },
            ("add" | "a", _) => return Err(CommandError::Usage("add <flight> <file>")),

            ("load" | "l", [path]) => ShellCommand::Load(PathBuf::from(path)),
            ("load" | "l", _) => return Err(CommandError::Usage("load <file>")),

            ("test-data", []) => ShellCommand::TestData,
            ("help" | "h", _) => ShellCommand::Help,
            ("quit" | "q" | "exit", _) => ShellCommand::Quit,

            (other, _) => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }

    /// Short form used in log lines.
    pub fn describe(&self) -> String {
        match self {
            ShellCommand::Distance(number) => format!("distance {}", number),
            ShellCommand::PartDistance(number, leg) => format!("part-distance {} {}", number, leg),
            ShellCommand::TimeArrival(number) => format!("time-arrival {}", number),
            ShellCommand::PartTimeArrival(number, leg) => {
                format!("part-time-arrival {} {}", number, leg)
            }
            ShellCommand::InAir(Some(at)) => format!("in-air {}", at.format("%Y-%m-%d %H:%M")),
            ShellCommand::InAir(None) => "in-air now".to_string(),
            ShellCommand::Add { number, path } => format!("add {} {}", number, path.display()),
            ShellCommand::Load(path) => format!("load {}", path.display()),
            ShellCommand::TestData => "test-data".to_string(),
            ShellCommand::Help => "help".to_string(),
            ShellCommand::Quit => "quit".to_string(),
        }
    }

    pub fn execute<S: FlightStore>(
        &self,
        emulation: &mut TrafficEmulation<S>,
    ) -> Result<Reply, CommandError> {
        let reply = match self {
            ShellCommand::Distance(number) => {
                Reply::Distance(for_flight(number, emulation.total_distance(number))?)
            }
            ShellCommand::PartDistance(number, leg) => {
                Reply::Distance(for_flight(number, emulation.partial_distance(number, *leg))?)
            }
            ShellCommand::TimeArrival(number) => {
                Reply::Time(for_flight(number, emulation.total_arrival_time(number))?)
            }
            ShellCommand::PartTimeArrival(number, leg) => {
                Reply::Time(for_flight(number, emulation.partial_arrival_time(number, *leg))?)
            }
            ShellCommand::InAir(at) => Reply::InAir(emulation.flights_in_transit(*at)?),
            ShellCommand::Add { number, path } => {
                let raw = read_file(path)?;
                for_flight(number, emulation.add_flight(number, &raw))?;
                Reply::Added(number.clone())
            }
            ShellCommand::Load(path) => {
                let raw = read_file(path)?;
                Reply::Stored(emulation.import_routes(&raw)?)
            }
            ShellCommand::TestData => {
                let now = Local::now().naive_local();
                Reply::Stored(test_data::seed(emulation, now, RANDOM_TEST_FLIGHTS)?)
            }
            ShellCommand::Help => Reply::Help,
            ShellCommand::Quit => Reply::Quit,
        };
        Ok(reply)
    }
}

/// Outcome of a successful command.
#[derive(Debug)]
pub enum Reply {
    Distance(f64),
    Time(String),
    InAir(AirspaceSnapshot),
    Added(String),
    Stored(Vec<String>),
    Help,
    Quit,
}

impl Reply {
    /// Text shown to the user. Interactive distances carry a `km` suffix.
    pub fn render(&self, interactive: bool) -> Result<String, CommandError> {
        let text = match self {
            Reply::Distance(km) => {
                let km = (km * 100.0).round() / 100.0;
                if interactive {
                    format!("{}km", km)
                } else {
                    km.to_string()
                }
            }
            Reply::Time(time) => time.clone(),
            Reply::InAir(snapshot) => serde_json::to_string_pretty(&snapshot.in_transit)?,
            Reply::Added(number) => format!("flight {} stored", number),
            Reply::Stored(numbers) => format!(
                "{} flight(s) stored: {}",
                numbers.len(),
                numbers.join(", ")
            ),
            Reply::Help => HELP.to_string(),
            Reply::Quit => "End interactive session...".to_string(),
        };
        Ok(text)
    }

    /// Flights a transit query had to skip, one line each.
    pub fn warnings(&self) -> Vec<String> {
        match self {
            Reply::InAir(snapshot) => snapshot
                .rejected
                .iter()
                .map(|(number, error)| format!("skipped flight {}: {}", number, error))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Reads the `-i` option value, `YYYY-MM-DD/HH:MM`. A space also works as
/// separator.
pub fn parse_in_air_arg(value: &str) -> Result<NaiveDateTime, CommandError> {
    let text = value.replacen(IN_AIR_ARG_SEPARATOR, " ", 1);
    Ok(parse_timestamp(&text)?)
}

/// Reads `FLIGHT:LEG`, as given to `-p` and `-s`.
pub fn parse_flight_leg(value: &str) -> Result<(String, usize), CommandError> {
    let (flight, leg) = value
        .split_once(':')
        .ok_or_else(|| CommandError::InvalidFlightLeg(value.to_string()))?;
    if flight.trim().is_empty() {
        return Err(CommandError::InvalidFlightLeg(value.to_string()));
    }
    Ok((flight_number(flight), parse_leg(leg)?))
}

pub fn flight_number(text: &str) -> String {
    text.trim().to_uppercase()
}

fn parse_leg(text: &str) -> Result<usize, CommandError> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| CommandError::InvalidLeg(text.to_string()))
}

fn for_flight<T>(number: &str, result: Result<T, RouteError>) -> Result<T, CommandError> {
    result.map_err(|source| CommandError::Flight {
        number: number.to_string(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String, CommandError> {
    fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::store::MemoryStore;

    const FFFFFF: &str = r#"{"name":"Boeing 737-46Q(SF)","registration":"RA-89051","start":"2016-01-07 9:00","tr":[[33.55,33],[37,24],[43,45]],"speed":"375"}"#;

    fn emulation() -> TrafficEmulation<MemoryStore> {
        let mut emulation = TrafficEmulation::new(MemoryStore::new());
        emulation.add_flight("FFFFFF", FFFFFF).unwrap();
        emulation
    }

    fn run(line: &str, emulation: &mut TrafficEmulation<MemoryStore>) -> Result<Reply, CommandError> {
        ShellCommand::parse(line)?
            .expect("blank line")
            .execute(emulation)
    }

    #[test]
    fn parses_long_and_short_names() {
        assert_eq!(
            ShellCommand::parse("distance fffff1").unwrap(),
            Some(ShellCommand::Distance("FFFFF1".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("  s iv4673 2 ").unwrap(),
            Some(ShellCommand::PartDistance("IV4673".to_string(), 2))
        );
        assert_eq!(
            ShellCommand::parse("p FFFFFF 0").unwrap(),
            Some(ShellCommand::PartTimeArrival("FFFFFF".to_string(), 0))
        );
        assert_eq!(ShellCommand::parse("q").unwrap(), Some(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("exit").unwrap(), Some(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn parses_in_air_instants() {
        let expected = parse_timestamp("2016-01-07 11:00").unwrap();

        assert_eq!(
            ShellCommand::parse("i 2016-01-07 11:00").unwrap(),
            Some(ShellCommand::InAir(Some(expected)))
        );
        assert_eq!(
            ShellCommand::parse("in-air 2016-01-07/11:00").unwrap(),
            Some(ShellCommand::InAir(Some(expected)))
        );
        assert_eq!(ShellCommand::parse("i").unwrap(), Some(ShellCommand::InAir(None)));
        assert!(matches!(
            ShellCommand::parse("i yesterday noon"),
            Err(CommandError::Route(RouteError::InvalidTimestamp(_)))
        ));
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(matches!(ShellCommand::parse("d"), Err(CommandError::Usage(_))));
        assert!(matches!(ShellCommand::parse("s FFFFFF"), Err(CommandError::Usage(_))));
        assert!(matches!(
            ShellCommand::parse("p FFFFFF -1"),
            Err(CommandError::InvalidLeg(leg)) if leg == "-1"
        ));
        assert!(matches!(
            ShellCommand::parse("fly FFFFFF"),
            Err(CommandError::Unknown(name)) if name == "fly"
        ));
    }

    #[test]
    fn flight_and_leg_option() {
        assert_eq!(parse_flight_leg("iv4673:1").unwrap(), ("IV4673".to_string(), 1));
        assert!(matches!(
            parse_flight_leg("IV4673"),
            Err(CommandError::InvalidFlightLeg(_))
        ));
        assert!(matches!(parse_flight_leg(":1"), Err(CommandError::InvalidFlightLeg(_))));
        assert!(matches!(parse_flight_leg("IV4673:x"), Err(CommandError::InvalidLeg(_))));
    }

    #[test]
    fn in_air_option() {
        assert_eq!(
            parse_in_air_arg("2016-01-07/11:00").unwrap(),
            parse_timestamp("2016-01-07 11:00").unwrap()
        );
        assert!(parse_in_air_arg("2016-01-07").is_err());
    }

    #[test]
    fn route_queries_render_like_the_session() {
        let mut emulation = emulation();

        let distance = run("d ffffff", &mut emulation).unwrap();
        assert_eq!(distance.render(true).unwrap(), "2805.7km");
        assert_eq!(distance.render(false).unwrap(), "2805.7");

        let leg = run("s FFFFFF 2", &mut emulation).unwrap();
        assert_eq!(leg.render(false).unwrap(), "1903.39");

        let arrival = run("t FFFFFF", &mut emulation).unwrap();
        assert_eq!(arrival.render(true).unwrap(), "2016-01-7 16:00");
    }

    #[test]
    fn route_errors_name_the_flight() {
        let mut emulation = emulation();

        let error = run("t XX1", &mut emulation).unwrap_err();

        assert_eq!(error.to_string(), "XX1: flight XX1 not found");
        assert!(matches!(
            run("s FFFFFF 3", &mut emulation),
            Err(CommandError::Flight {
                source: RouteError::OutOfRange { .. },
                ..
            })
        ));
    }

    #[test]
    fn in_air_renders_stored_documents() {
        let mut emulation = emulation();

        let reply = run("i 2016-01-07 11:00", &mut emulation).unwrap();
        let json: serde_json::Value = serde_json::from_str(&reply.render(true).unwrap()).unwrap();

        assert_eq!(json["FFFFFF"]["registration"], "RA-89051");
        assert_eq!(json["FFFFFF"]["speed"], "375");
        assert!(reply.warnings().is_empty());
    }

    #[test]
    fn in_air_echoes_speed_and_start_as_stored() {
        let mut emulation = TrafficEmulation::new(MemoryStore::new());
        emulation
            .add_flight("FFFFFF", &FFFFFF.replace("\"375\"", "\"375.9\""))
            .unwrap();

        let reply = run("i 2016-01-07 11:00", &mut emulation).unwrap();
        let json: serde_json::Value = serde_json::from_str(&reply.render(false).unwrap()).unwrap();

        assert_eq!(json["FFFFFF"]["speed"], "375.9");
        assert_eq!(json["FFFFFF"]["start"], "2016-01-07 9:00");
    }

    #[test]
    fn missing_file_is_reported() {
        let mut emulation = emulation();

        assert!(matches!(
            run("add FV777 /nonexistent/flight.json", &mut emulation),
            Err(CommandError::Io { .. })
        ));
    }

    #[test]
    fn add_and_load_from_files() {
        let dir = std::env::temp_dir().join(format!("routes_commands_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let flight = dir.join("flight.json");
        let routes = dir.join("routes.json");
        fs::write(&flight, FFFFFF).unwrap();
        fs::write(&routes, format!(r#"{{"routes": {{"AB0001": {}}}}}"#, FFFFFF)).unwrap();
        let mut emulation = TrafficEmulation::new(MemoryStore::new());

        let added = run(&format!("a fv777 {}", flight.display()), &mut emulation).unwrap();
        let loaded = run(&format!("load {}", routes.display()), &mut emulation).unwrap();

        assert_eq!(added.render(true).unwrap(), "flight FV777 stored");
        assert_eq!(loaded.render(true).unwrap(), "1 flight(s) stored: AB0001");
        assert_eq!(emulation.store().len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
