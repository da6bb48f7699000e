//! Flight record data structures

use serde::{Deserialize, Serialize};

/// The categorical attributes of a flight used for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Operating airline name
    #[serde(rename = "OPERA")]
    pub opera: String,

    /// Flight type: "I" (international) or "N" (national)
    #[serde(rename = "TIPOVUELO")]
    pub tipo_vuelo: String,

    /// Month of the scheduled operation (1-12)
    #[serde(rename = "MES")]
    pub mes: u32,
}

impl FlightRecord {
    /// Create a flight record from its three categorical attributes
    pub fn new(opera: impl Into<String>, tipo_vuelo: impl Into<String>, mes: u32) -> Self {
        Self {
            opera: opera.into(),
            tipo_vuelo: tipo_vuelo.into(),
            mes,
        }
    }
}

/// A historical flight row with the timestamps needed to derive a label.
///
/// Column names match the historical dataset; any other columns in the
/// source file are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Scheduled date-time, `%Y-%m-%d %H:%M:%S`
    #[serde(rename = "Fecha-I")]
    pub fecha_i: String,

    /// Actual date-time, `%Y-%m-%d %H:%M:%S`
    #[serde(rename = "Fecha-O")]
    pub fecha_o: String,

    #[serde(rename = "OPERA")]
    pub opera: String,

    #[serde(rename = "TIPOVUELO")]
    pub tipo_vuelo: String,

    #[serde(rename = "MES")]
    pub mes: u32,
}

impl TrainingRecord {
    /// Project out the categorical part used by the encoder
    pub fn flight(&self) -> FlightRecord {
        FlightRecord {
            opera: self.opera.clone(),
            tipo_vuelo: self.tipo_vuelo.clone(),
            mes: self.mes,
        }
    }
}
