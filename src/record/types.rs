//! Canonical record types
//!
//! The typed shape every vehicle is stored in, plus the per-record error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a raw record was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' should be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("field '{field}' is out of range: {message}")]
    OutOfRange { field: String, message: String },

    #[error("field '{field}' is not a valid date: '{value}'")]
    MalformedDate { field: String, value: String },
}

impl ValidationError {
    /// Create a missing field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the source field that failed
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::MalformedDate { field, .. } => field,
        }
    }
}

/// One validated vehicle, keyed by its source identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Stable natural key, never empty
    pub identifier: String,
    /// Typed vehicle attributes
    pub attributes: VehicleAttributes,
}

impl CanonicalRecord {
    /// Serialize to the JSON document persisted by the store
    pub fn to_document(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Structured vehicle attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleAttributes {
    pub name: String,
    pub brand: String,
    pub model: String,
    /// Vehicle identification number
    pub vin: String,
    pub first_registered: NaiveDate,
    pub number_plate: Option<String>,
    pub version: Option<String>,
    pub vehicle_family: Option<String>,
    pub finish_quality: Option<String>,
    pub pricing: Pricing,
    pub availability: Availability,
    pub specs: TechnicalSpecs,
    pub location: Location,
    pub classification: Classification,
}

/// Prices as advertised, in the feed's currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub price_inc_tax: Option<f64>,
    pub price_exc_tax: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub status: Option<String>,
    pub online_purchase_compliant: Option<bool>,
    pub vcd_available: Option<bool>,
    pub entered_stock_on: Option<NaiveDate>,
}

/// Technical specification. Dimensions in mm, weight in kg, CO2 in g/km.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalSpecs {
    pub category: Option<String>,
    pub color: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub weight: Option<u32>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub doors: Option<u32>,
    pub seats: Option<u32>,
    pub mileage: Option<u32>,
    pub co2_emissions: Option<u32>,
    pub power_tax: Option<u32>,
    pub power_hp: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub warranty: Option<String>,
    pub rrg_type: Option<String>,
    pub internal_type: Option<String>,
    /// Source field `type`
    pub kind: Option<String>,
}
