//! Request payload validation for the scoring endpoint.
//!
//! A payload is accepted only if every flight passes every check; one bad
//! record rejects the batch.

use crate::error::ValidationError;
use crate::types::flight::FlightRecord;
use serde_json::{Map, Value};

/// Airlines accepted for scoring
pub const ALLOWED_AIRLINES: [&str; 2] = ["Aerolineas Argentinas", "Grupo LATAM"];

/// Flight types accepted for scoring
pub const ALLOWED_FLIGHT_TYPES: [&str; 2] = ["I", "N"];

/// Parse and validate a `{"flights": [...]}` payload into flight records,
/// preserving input order.
pub fn parse_flights(payload: &Value) -> Result<Vec<FlightRecord>, ValidationError> {
    let body = payload.as_object().ok_or(ValidationError::NotAnObject)?;
    let flights = body
        .get("flights")
        .ok_or(ValidationError::MissingFlights)?
        .as_array()
        .ok_or(ValidationError::FlightsNotArray)?;

    flights
        .iter()
        .enumerate()
        .map(|(index, flight)| {
            let record = flight
                .as_object()
                .ok_or(ValidationError::FlightNotObject { index })?;
            parse_flight(index, record)
        })
        .collect()
}

fn parse_flight(index: usize, record: &Map<String, Value>) -> Result<FlightRecord, ValidationError> {
    let invalid = |field: &'static str, reason: String| ValidationError::InvalidField {
        index,
        field,
        reason,
    };

    let opera = match record.get("OPERA") {
        Some(Value::String(name)) if ALLOWED_AIRLINES.contains(&name.as_str()) => name.clone(),
        Some(other) => return Err(invalid("OPERA", format!("unsupported airline {}", other))),
        None => return Err(invalid("OPERA", "missing".to_string())),
    };

    let tipo_vuelo = match record.get("TIPOVUELO") {
        Some(Value::String(kind)) if ALLOWED_FLIGHT_TYPES.contains(&kind.as_str()) => kind.clone(),
        Some(other) => return Err(invalid("TIPOVUELO", format!("unsupported flight type {}", other))),
        None => return Err(invalid("TIPOVUELO", "missing".to_string())),
    };

    // Only JSON integers are months; 3.0 and "3" are rejected.
    let mes = match record.get("MES") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(month @ 1..=12) => month as u32,
            Some(month) => return Err(invalid("MES", format!("{} is outside 1..=12", month))),
            None => return Err(invalid("MES", format!("{} is not an integer", n))),
        },
        Some(other) => return Err(invalid("MES", format!("{} is not an integer", other))),
        None => return Err(invalid("MES", "missing".to_string())),
    };

    Ok(FlightRecord {
        opera,
        tipo_vuelo,
        mes,
    })
}
