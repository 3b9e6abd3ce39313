use std::path::PathBuf;

use clap::Parser;

use crate::commands::{flight_number, parse_flight_leg, parse_in_air_arg, CommandError, ShellCommand};

/// Route information for the flights kept in a Redis `routes` hash.
///
/// Without query options an interactive session is started.
#[derive(Parser, Debug, Default)]
#[command(name = "routes-info", version)]
pub struct Args {
    /// Key-value server to connect to (default 127.0.0.1:6379)
    #[arg(short, long, value_name = "HOST:PORT")]
    pub connection: Option<String>,

    /// Import the flights of a {"routes": {...}} file before any query
    #[arg(short, long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Total distance in km of the route
    #[arg(short, long, value_name = "FLIGHT")]
    pub distance: Option<String>,

    /// Distance in km of one leg of the route
    #[arg(short = 's', long, value_name = "FLIGHT:LEG")]
    pub part_distance: Option<String>,

    /// Estimated time of arrival at the destination
    #[arg(short, long, value_name = "FLIGHT")]
    pub time_arrival: Option<String>,

    /// Estimated time of arrival at a waypoint
    #[arg(short, long, value_name = "FLIGHT:LEG")]
    pub part_time_arrival: Option<String>,

    /// Flights in the air at the given instant, or now
    #[arg(short, long, value_name = "YYYY-MM-DD/HH:MM", num_args = 0..=1)]
    pub in_air: Option<Option<String>>,

    /// Directory of the session log
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    pub fn has_queries(&self) -> bool {
        self.distance.is_some()
            || self.part_distance.is_some()
            || self.time_arrival.is_some()
            || self.part_time_arrival.is_some()
            || self.in_air.is_some()
    }

    /// The one-shot queries, always in the order distance, part-distance,
    /// time-arrival, part-time-arrival, in-air.
    pub fn queries(&self) -> Result<Vec<ShellCommand>, CommandError> {
        let mut queries = Vec::new();

        if let Some(flight) = &self.distance {
            queries.push(ShellCommand::Distance(flight_number(flight)));
        }
        if let Some(value) = &self.part_distance {
            let (flight, leg) = parse_flight_leg(value)?;
            queries.push(ShellCommand::PartDistance(flight, leg));
        }
        if let Some(flight) = &self.time_arrival {
            queries.push(ShellCommand::TimeArrival(flight_number(flight)));
        }
        if let Some(value) = &self.part_time_arrival {
            let (flight, leg) = parse_flight_leg(value)?;
            queries.push(ShellCommand::PartTimeArrival(flight, leg));
        }
        match &self.in_air {
            Some(Some(value)) => queries.push(ShellCommand::InAir(Some(parse_in_air_arg(value)?))),
            Some(None) => queries.push(ShellCommand::InAir(None)),
            None => {}
        }

        Ok(queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::flight_record::parse_timestamp;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("routes-info").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn no_options_means_interactive() {
        let args = parse(&[]);

        assert!(!args.has_queries());
        assert!(args.queries().unwrap().is_empty());
    }

    #[test]
    fn short_and_long_options() {
        let args = parse(&["-c", "10.0.0.5:6380", "--distance", "fffff", "-p", "iv4673:1", "-j", "routes.json"]);

        assert_eq!(args.connection.as_deref(), Some("10.0.0.5:6380"));
        assert_eq!(args.json, Some(PathBuf::from("routes.json")));
        assert_eq!(
            args.queries().unwrap(),
            vec![
                ShellCommand::Distance("FFFFF".to_string()),
                ShellCommand::PartTimeArrival("IV4673".to_string(), 1),
            ]
        );
    }

    #[test]
    fn in_air_value_is_optional() {
        let now = parse(&["-i"]);
        let at = parse(&["--in-air", "2016-01-07/11:00"]);

        assert_eq!(now.queries().unwrap(), vec![ShellCommand::InAir(None)]);
        assert_eq!(
            at.queries().unwrap(),
            vec![ShellCommand::InAir(Some(parse_timestamp("2016-01-07 11:00").unwrap()))]
        );
    }

    #[test]
    fn queries_follow_a_fixed_order() {
        let args = parse(&["-i", "2016-01-07/11:00", "-t", "A1", "-s", "A1:2", "-d", "A1"]);

        let names: Vec<String> = args.queries().unwrap().iter().map(|q| q.describe()).collect();

        assert_eq!(
            names,
            vec![
                "distance A1",
                "part-distance A1 2",
                "time-arrival A1",
                "in-air 2016-01-07 11:00"
            ]
        );
    }

    #[test]
    fn malformed_leg_option_is_reported() {
        let args = parse(&["-s", "A1"]);

        assert!(matches!(args.queries(), Err(CommandError::InvalidFlightLeg(_))));
    }
}
