//! Raw record normalization
//!
//! Maps the feed's camelCase fields onto [`CanonicalRecord`]. Every field is
//! checked for type and range; nothing is coerced.

use super::types::{
    Availability, CanonicalRecord, Classification, Location, Pricing, TechnicalSpecs,
    ValidationError, VehicleAttributes,
};
use crate::types::{OptionStringExt, RawRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Outcome of normalizing one raw record
pub type Normalized = std::result::Result<CanonicalRecord, ValidationError>;

/// Validate and normalize one raw record
pub fn normalize(raw: &RawRecord) -> Normalized {
    let fields = Fields(raw);

    let identifier = fields.identifier("id")?;

    let attributes = VehicleAttributes {
        name: fields.required_str("name")?,
        brand: fields.required_str("brand")?,
        model: fields.required_str("model")?,
        vin: fields.required_str("vehicleIdentificationNumber")?,
        first_registered: fields.required_date("dateVehicleFirstRegistered")?,
        number_plate: fields.optional_str("numberPlate")?,
        version: fields.optional_str("version")?,
        vehicle_family: fields.optional_str("vehicleFamily")?,
        finish_quality: fields.optional_str("finishQuality")?,
        pricing: Pricing {
            price_inc_tax: fields.optional_price("vehiclePriceIncTax")?,
            price_exc_tax: fields.optional_price("vehiclePriceExcTax")?,
        },
        availability: Availability {
            status: fields.optional_str("availabilityStatus")?,
            online_purchase_compliant: fields.optional_bool("onlinePurchaseCompliant")?,
            vcd_available: fields.optional_bool("vcdAvailable")?,
            entered_stock_on: fields.optional_date("dateOfEntryIntoStock")?,
        },
        specs: TechnicalSpecs {
            category: fields.optional_str("categoryName")?,
            color: fields.optional_str("colorName")?,
            fuel_type: fields.optional_str("fuelType")?,
            transmission: fields.optional_str("vehicleTransmission")?,
            weight: fields.optional_count("weight")?,
            height: fields.optional_count("height")?,
            width: fields.optional_count("width")?,
            doors: fields.optional_count("numberOfDoors")?,
            seats: fields.optional_count("vehicleSeatingCapacity")?,
            mileage: fields.optional_count("mileageFromOdometer")?,
            co2_emissions: fields.optional_count("emissionsCO2")?,
            power_tax: fields.optional_count("vehicleEnginePowerTax")?,
            power_hp: fields.optional_count("vehicleEnginePowerHp")?,
        },
        location: Location {
            name: fields.optional_str("locationName")?,
            code: fields.optional_str("location")?,
        },
        classification: Classification {
            warranty: fields.optional_str("warrantyName")?,
            rrg_type: fields.optional_str("rrgType")?,
            internal_type: fields.optional_str("internalType")?,
            kind: fields.optional_str("type")?,
        },
    };

    Ok(CanonicalRecord {
        identifier,
        attributes,
    })
}

/// Typed accessors over a raw record. `null` counts as absent.
struct Fields<'a>(&'a RawRecord);

impl Fields<'_> {
    fn present(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    fn identifier(&self, field: &str) -> Result<String, ValidationError> {
        match self.present(field) {
            None => Err(ValidationError::missing(field)),
            Some(Value::Number(n)) => {
                if let Some(id) = n.as_u64() {
                    Ok(id.to_string())
                } else if let Some(id) = n.as_i64() {
                    Ok(id.to_string())
                } else {
                    Err(wrong_type(field, "an integer or string", &Value::Number(n.clone())))
                }
            }
            Some(Value::String(s)) => s
                .clone()
                .none_if_blank()
                .ok_or_else(|| ValidationError::missing(field)),
            Some(other) => Err(wrong_type(field, "an integer or string", other)),
        }
    }

    fn optional_str(&self, field: &str) -> Result<Option<String>, ValidationError> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(s.clone().none_if_blank()),
            Some(other) => Err(wrong_type(field, "a string", other)),
        }
    }

    fn required_str(&self, field: &str) -> Result<String, ValidationError> {
        self.optional_str(field)?
            .ok_or_else(|| ValidationError::missing(field))
    }

    fn optional_bool(&self, field: &str) -> Result<Option<bool>, ValidationError> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_type(field, "a boolean", other)),
        }
    }

    /// Non-negative integer. Integral floats such as `5.0` are accepted.
    fn optional_count(&self, field: &str) -> Result<Option<u32>, ValidationError> {
        let Some(value) = self.present(field) else {
            return Ok(None);
        };
        let Value::Number(n) = value else {
            return Err(wrong_type(field, "an integer", value));
        };

        if let Some(u) = n.as_u64() {
            return u32::try_from(u)
                .map(Some)
                .map_err(|_| ValidationError::out_of_range(field, format!("{u} is too large")));
        }
        if n.as_i64().is_some() {
            return Err(ValidationError::out_of_range(
                field,
                format!("{n} must not be negative"),
            ));
        }
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) => {
                Ok(Some(f as u32))
            }
            Some(f) if f < 0.0 => Err(ValidationError::out_of_range(
                field,
                format!("{f} must not be negative"),
            )),
            _ => Err(wrong_type(field, "an integer", value)),
        }
    }

    fn optional_price(&self, field: &str) -> Result<Option<f64>, ValidationError> {
        let Some(value) = self.present(field) else {
            return Ok(None);
        };
        let price = value
            .as_f64()
            .ok_or_else(|| wrong_type(field, "a number", value))?;

        if !price.is_finite() {
            return Err(ValidationError::out_of_range(field, "must be finite"));
        }
        if price < 0.0 {
            return Err(ValidationError::out_of_range(
                field,
                format!("{price} must not be negative"),
            ));
        }
        Ok(Some(price))
    }

    fn optional_date(&self, field: &str) -> Result<Option<NaiveDate>, ValidationError> {
        let Some(text) = self.optional_str(field)? else {
            return Ok(None);
        };
        parse_date(&text)
            .map(Some)
            .ok_or(ValidationError::MalformedDate {
                field: field.to_string(),
                value: text,
            })
    }

    fn required_date(&self, field: &str) -> Result<NaiveDate, ValidationError> {
        self.optional_date(field)?
            .ok_or_else(|| ValidationError::missing(field))
    }
}

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS` timestamp or a
/// plain `YYYY-MM-DD` date
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn wrong_type(field: &str, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::WrongType {
        field: field.to_string(),
        expected,
        found: describe(found).to_string(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
