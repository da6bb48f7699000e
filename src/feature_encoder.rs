//! Feature encoding for delay model training and inference.
//!
//! Flights are encoded onto a fixed, ordered list of ten one-hot slots.
//! The list is the model's input contract: training and serving must
//! produce the same columns in the same order whatever categories a batch
//! happens to contain.

use crate::error::LabelError;
use crate::labeler::DelayLabeler;
use crate::types::flight::{FlightRecord, TrainingRecord};
use ndarray::{Array1, Array2, ArrayView1};

/// Number of features produced per flight.
pub const FEATURE_COUNT: usize = 10;

/// Feature column names in model input order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "OPERA_Latin American Wings",
    "MES_7",
    "MES_10",
    "OPERA_Grupo LATAM",
    "MES_12",
    "TIPOVUELO_I",
    "MES_4",
    "MES_11",
    "OPERA_Sky Airline",
    "OPERA_Copa Air",
];

/// One indicator column: "1 if the field equals this value, else 0".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSlot {
    Airline(&'static str),
    FlightType(&'static str),
    Month(u32),
}

/// Slots in the same order as [`FEATURE_COLUMNS`].
pub const FEATURE_SLOTS: [FeatureSlot; FEATURE_COUNT] = [
    FeatureSlot::Airline("Latin American Wings"),
    FeatureSlot::Month(7),
    FeatureSlot::Month(10),
    FeatureSlot::Airline("Grupo LATAM"),
    FeatureSlot::Month(12),
    FeatureSlot::FlightType("I"),
    FeatureSlot::Month(4),
    FeatureSlot::Month(11),
    FeatureSlot::Airline("Sky Airline"),
    FeatureSlot::Airline("Copa Air"),
];

impl FeatureSlot {
    /// Indicator value of this slot for a flight.
    pub fn indicator(&self, flight: &FlightRecord) -> f64 {
        let hit = match self {
            FeatureSlot::Airline(name) => flight.opera == *name,
            FeatureSlot::FlightType(kind) => flight.tipo_vuelo == *kind,
            FeatureSlot::Month(month) => flight.mes == *month,
        };
        if hit {
            1.0
        } else {
            0.0
        }
    }
}

/// Feature encoder that turns flights into model input rows.
///
/// Categories outside the slot list produce zeros and never an error, so
/// two flights of unlisted airlines with the same month and type encode
/// identically.
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    labeler: DelayLabeler,
}

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self {
            labeler: DelayLabeler::new(),
        }
    }

    /// Encode a single flight into a fixed-width feature row.
    pub fn encode_one(&self, flight: &FlightRecord) -> [f64; FEATURE_COUNT] {
        let mut row = [0.0; FEATURE_COUNT];
        for (value, slot) in row.iter_mut().zip(FEATURE_SLOTS.iter()) {
            *value = slot.indicator(flight);
        }
        row
    }

    /// Encode a batch of flights into an `(n, 10)` matrix, one row per flight
    /// in input order.
    pub fn encode(&self, flights: &[FlightRecord]) -> Array2<f64> {
        let mut features = Array2::zeros((flights.len(), FEATURE_COUNT));
        for (mut row, flight) in features.rows_mut().into_iter().zip(flights) {
            row.assign(&ArrayView1::from(&self.encode_one(flight)[..]));
        }
        features
    }

    /// Encode historical records and derive their delay labels.
    ///
    /// Fails on the first record with a malformed timestamp.
    pub fn encode_labeled(
        &self,
        records: &[TrainingRecord],
    ) -> Result<(Array2<f64>, Array1<u8>), LabelError> {
        let labels = records
            .iter()
            .map(|r| self.labeler.label(&r.fecha_i, &r.fecha_o))
            .collect::<Result<Vec<u8>, _>>()?;

        let flights: Vec<FlightRecord> = records.iter().map(TrainingRecord::flight).collect();

        Ok((self.encode(&flights), Array1::from(labels)))
    }
}
