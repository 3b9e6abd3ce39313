use serde_json::{Map, Value};

use super::{
    flight_record::{FlightDocument, FlightRecord},
    route_error::RouteError,
};

const STRING_FIELDS: [&str; 4] = ["name", "registration", "start", "speed"];
const TRAJECTORY_FIELD: &str = "tr";
const ROUTES_FIELD: &str = "routes";

/// Validates a raw JSON flight submitted by a caller.
///
/// Returns the document to persist together with its decoded record. Any
/// problem, from malformed JSON to an unparsable departure, is reported as a
/// single `RouteError::Validation` message.
pub fn validate(raw: &str) -> Result<(FlightDocument, FlightRecord), RouteError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| RouteError::Validation(format!("not valid JSON: {}", e)))?;
    validate_value(value)
}

/// Same as [`validate`] for an already parsed JSON value.
pub fn validate_value(value: Value) -> Result<(FlightDocument, FlightRecord), RouteError> {
    let object = match &value {
        Value::Object(object) => object,
        other => {
            return Err(invalid(format!(
                "expected an object, found {}",
                type_name(other)
            )))
        }
    };
    check_schema(object)?;

    let document: FlightDocument =
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
    if let Some(position) = document.tr.iter().position(|point| !point.is_valid()) {
        return Err(invalid(format!(
            "waypoint {} is outside latitude [-90, 90] or longitude [-180, 180]",
            position
        )));
    }

    let record = FlightRecord::try_from(document.clone()).map_err(|e| match e {
        RouteError::Validation(message) => invalid(message),
        other => invalid(other.to_string()),
    })?;
    Ok((document, record))
}

/// Splits a bulk import `{"routes": {number: flight, ...}}` into its entries,
/// each validated. The first invalid flight fails the whole import.
pub fn parse_routes(raw: &str) -> Result<Vec<(String, FlightDocument)>, RouteError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| RouteError::Validation(format!("not valid JSON: {}", e)))?;

    let routes = match value {
        Value::Object(mut object) => object.remove(ROUTES_FIELD),
        _ => None,
    };
    let routes = match routes {
        Some(Value::Object(routes)) => routes,
        Some(other) => {
            return Err(invalid(format!(
                "'{}' must be an object, found {}",
                ROUTES_FIELD,
                type_name(&other)
            )))
        }
        None => return Err(invalid(format!("missing '{}' object", ROUTES_FIELD))),
    };

    let mut documents = Vec::with_capacity(routes.len());
    for (number, flight) in routes {
        let (document, _) = validate_value(flight).map_err(|e| match e {
            RouteError::Validation(message) => invalid(format!("flight {}: {}", number, message)),
            other => other,
        })?;
        documents.push((number, document));
    }
    Ok(documents)
}

fn check_schema(object: &Map<String, Value>) -> Result<(), RouteError> {
    if let Some(unknown) = object
        .keys()
        .find(|key| key.as_str() != TRAJECTORY_FIELD && !STRING_FIELDS.contains(&key.as_str()))
    {
        return Err(invalid(format!("unknown field '{}'", unknown)));
    }

    for field in STRING_FIELDS {
        match object.get(field) {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(invalid(format!(
                    "'{}' must be a string, found {}",
                    field,
                    type_name(other)
                )))
            }
            None => return Err(invalid(format!("missing field '{}'", field))),
        }
    }

    let points = match object.get(TRAJECTORY_FIELD) {
        Some(Value::Array(points)) => points,
        Some(other) => {
            return Err(invalid(format!(
                "'{}' must be an array, found {}",
                TRAJECTORY_FIELD,
                type_name(other)
            )))
        }
        None => return Err(invalid(format!("missing field '{}'", TRAJECTORY_FIELD))),
    };
    for (position, point) in points.iter().enumerate() {
        if !is_coordinate(point) {
            return Err(invalid(format!(
                "waypoint {} must be a [lat, long] pair of numbers",
                position
            )));
        }
    }

    Ok(())
}

fn is_coordinate(point: &Value) -> bool {
    match point {
        Value::Array(pair) => pair.len() == 2 && pair.iter().all(Value::is_number),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn invalid(message: String) -> RouteError {
    RouteError::Validation(message)
}
