//! Tests for the record model

use super::*;
use crate::types::RawRecord;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn full_vehicle() -> Value {
    json!({
        "id": 1042,
        "name": "Renault Clio V",
        "brand": "Renault",
        "model": "Clio",
        "categoryName": "Citadine",
        "colorName": "Blanc Glacier",
        "weight": 1180,
        "height": 1440,
        "width": 1798,
        "numberOfDoors": 5,
        "vehicleIdentificationNumber": "VF1RJA00067123456",
        "dateVehicleFirstRegistered": "2022-04-12T00:00:00+02:00",
        "fuelType": "Essence",
        "mileageFromOdometer": 18250,
        "vehicleSeatingCapacity": 5,
        "vehicleTransmission": "Manuelle",
        "emissionsCO2": 118,
        "numberPlate": "GA-123-BC",
        "vehiclePriceIncTax": 15990.0,
        "vehiclePriceExcTax": 13325.0,
        "vehicleFamily": "CLIO",
        "finishQuality": "Intens",
        "version": "TCe 90",
        "vehicleEnginePowerTax": 5,
        "vehicleEnginePowerHp": 90,
        "warrantyName": "Garantie 12 mois",
        "rrgType": "VO",
        "locationName": "Renault Paris Grenelle",
        "dateOfEntryIntoStock": "2024-01-08",
        "internalType": "VO",
        "type": "used",
        "onlinePurchaseCompliant": true,
        "availabilityStatus": "available",
        "vcdAvailable": false,
        "location": "PAR-15"
    })
}

fn minimal_vehicle() -> Value {
    json!({
        "id": "A-7",
        "name": "Dacia Sandero",
        "brand": "Dacia",
        "model": "Sandero",
        "vehicleIdentificationNumber": "UU1B5220X67000001",
        "dateVehicleFirstRegistered": "2021-09-30"
    })
}

fn with(mut base: Value, field: &str, value: Value) -> RawRecord {
    base[field] = value;
    raw(base)
}

fn without(base: Value, field: &str) -> RawRecord {
    let mut map = raw(base);
    map.remove(field);
    map
}

// ============================================================================
// Happy path
// ============================================================================

#[test]
fn test_normalize_full_record() {
    let record = normalize(&raw(full_vehicle())).unwrap();

    assert_eq!(record.identifier, "1042");
    let attrs = &record.attributes;
    assert_eq!(attrs.brand, "Renault");
    assert_eq!(attrs.vin, "VF1RJA00067123456");
    assert_eq!(
        attrs.first_registered,
        NaiveDate::from_ymd_opt(2022, 4, 12).unwrap()
    );
    assert_eq!(attrs.pricing.price_inc_tax, Some(15990.0));
    assert_eq!(attrs.specs.mileage, Some(18250));
    assert_eq!(attrs.specs.doors, Some(5));
    assert_eq!(attrs.availability.online_purchase_compliant, Some(true));
    assert_eq!(
        attrs.availability.entered_stock_on,
        NaiveDate::from_ymd_opt(2024, 1, 8)
    );
    assert_eq!(attrs.location.code.as_deref(), Some("PAR-15"));
    assert_eq!(attrs.classification.kind.as_deref(), Some("used"));
}

#[test]
fn test_normalize_minimal_record_leaves_optionals_unset() {
    let record = normalize(&raw(minimal_vehicle())).unwrap();

    assert_eq!(record.identifier, "A-7");
    assert_eq!(record.attributes.pricing, Pricing::default());
    assert_eq!(record.attributes.specs, TechnicalSpecs::default());
    assert_eq!(record.attributes.availability, Availability::default());
    assert_eq!(record.attributes.location, Location::default());
    assert!(record.attributes.number_plate.is_none());
}

#[test]
fn test_null_optionals_are_unset_not_zero() {
    let mut value = minimal_vehicle();
    value["mileageFromOdometer"] = Value::Null;
    value["vehiclePriceIncTax"] = Value::Null;
    value["vcdAvailable"] = Value::Null;

    let record = normalize(&raw(value)).unwrap();
    assert_eq!(record.attributes.specs.mileage, None);
    assert_eq!(record.attributes.pricing.price_inc_tax, None);
    assert_eq!(record.attributes.availability.vcd_available, None);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let mut value = full_vehicle();
    value["images"] = json!([{"url": "https://cdn.example.com/1.jpg"}]);
    value["diacOffers"] = json!({"monthly": 199});
    value["brandNewField"] = json!("whatever");

    let with_extras = normalize(&raw(value)).unwrap();
    let plain = normalize(&raw(full_vehicle())).unwrap();
    assert_eq!(with_extras, plain);
}

#[test]
fn test_normalize_is_deterministic() {
    let a = normalize(&raw(full_vehicle())).unwrap();
    let b = normalize(&raw(full_vehicle())).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_document().unwrap(), b.to_document().unwrap());
}

#[test]
fn test_strings_are_trimmed_and_blank_is_unset() {
    let mut value = minimal_vehicle();
    value["brand"] = json!("  Dacia ");
    value["colorName"] = json!("   ");

    let record = normalize(&raw(value)).unwrap();
    assert_eq!(record.attributes.brand, "Dacia");
    assert_eq!(record.attributes.specs.color, None);
}

#[test]
fn test_integral_float_counts_are_accepted() {
    let record = normalize(&with(minimal_vehicle(), "weight", json!(1200.0))).unwrap();
    assert_eq!(record.attributes.specs.weight, Some(1200));
}

// ============================================================================
// Rejections
// ============================================================================

#[test_case("id" ; "identifier")]
#[test_case("name" ; "name")]
#[test_case("brand" ; "brand")]
#[test_case("model" ; "model")]
#[test_case("vehicleIdentificationNumber" ; "vin")]
#[test_case("dateVehicleFirstRegistered" ; "first registration")]
fn test_missing_required_field(field: &str) {
    let err = normalize(&without(minimal_vehicle(), field)).unwrap_err();
    assert_eq!(err, ValidationError::missing(field));
}

#[test_case(json!("") ; "empty string")]
#[test_case(json!("   ") ; "blank string")]
#[test_case(Value::Null ; "null")]
fn test_blank_identifier_is_missing(id: Value) {
    let err = normalize(&with(minimal_vehicle(), "id", id)).unwrap_err();
    assert_eq!(err, ValidationError::missing("id"));
}

#[test_case("id", json!(1.5), "an integer or string" ; "fractional id")]
#[test_case("id", json!(true), "an integer or string" ; "boolean id")]
#[test_case("brand", json!(7), "a string" ; "numeric brand")]
#[test_case("weight", json!("1200"), "an integer" ; "stringly weight")]
#[test_case("weight", json!(1200.5), "an integer" ; "fractional weight")]
#[test_case("vehiclePriceIncTax", json!("15990"), "a number" ; "stringly price")]
#[test_case("vcdAvailable", json!("yes"), "a boolean" ; "stringly flag")]
fn test_wrong_type(field: &str, value: Value, expected: &str) {
    let err = normalize(&with(minimal_vehicle(), field, value)).unwrap_err();
    match err {
        ValidationError::WrongType {
            field: f,
            expected: e,
            ..
        } => {
            assert_eq!(f, field);
            assert_eq!(e, expected);
        }
        other => panic!("expected WrongType, got {other:?}"),
    }
}

#[test_case("vehiclePriceIncTax", json!(-1.0) ; "negative price")]
#[test_case("vehiclePriceExcTax", json!(-250) ; "negative integer price")]
#[test_case("mileageFromOdometer", json!(-10) ; "negative mileage")]
#[test_case("numberOfDoors", json!(5_000_000_000_u64) ; "doors overflow")]
fn test_out_of_range(field: &str, value: Value) {
    let err = normalize(&with(minimal_vehicle(), field, value)).unwrap_err();
    assert!(
        matches!(err, ValidationError::OutOfRange { .. }),
        "unexpected {err:?}"
    );
    assert_eq!(err.field(), field);
}

#[test_case("dateVehicleFirstRegistered", "12/04/2022" ; "french format")]
#[test_case("dateVehicleFirstRegistered", "2022-13-01" ; "month 13")]
#[test_case("dateOfEntryIntoStock", "yesterday" ; "prose")]
fn test_malformed_date(field: &str, value: &str) {
    let err = normalize(&with(minimal_vehicle(), field, json!(value))).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MalformedDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ValidationError::missing("brand").to_string(),
        "missing required field 'brand'"
    );
    let err = normalize(&with(minimal_vehicle(), "weight", json!("heavy"))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "field 'weight' should be an integer, got a string"
    );
}

// ============================================================================
// Dates
// ============================================================================

#[test_case("2023-06-01" ; "plain date")]
#[test_case("2023-06-01T00:00:00+00:00" ; "rfc3339 utc")]
#[test_case("2023-06-01T09:30:00+02:00" ; "rfc3339 offset")]
#[test_case("2023-06-01T09:30:00" ; "naive timestamp")]
fn test_date_formats(value: &str) {
    assert_eq!(
        super::normalize::parse_date(value),
        NaiveDate::from_ymd_opt(2023, 6, 1)
    );
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn test_snapshot_from_aggregations() {
    let aggregations = json!({
        "term": {
            "fuelType": [{"key": "Diesel", "count": 12}, {"key": "Essence", "count": 30}],
            "colorName": [{"key": "Rouge", "count": 4, "value": "#FF0000"}],
            "year": [{"key": 2021, "count": 9}]
        },
        "stat": {
            "price": {"min": 8990, "max": 45990.5},
            "mileage": {"min": 0, "max": 150000}
        }
    });

    let date = NaiveDate::from_ymd_opt(2024, 2, 1);
    let snapshot = InventorySnapshot::from_aggregations(&aggregations, Some(42), date).unwrap();

    assert_eq!(snapshot.total_items, Some(42));
    assert_eq!(snapshot.captured_at, date);
    assert_eq!(snapshot.term["fuelType"].len(), 2);
    assert_eq!(snapshot.term["colorName"][0].value.as_deref(), Some("#FF0000"));
    assert_eq!(snapshot.term["year"][0].key, json!(2021));
    assert_eq!(
        snapshot.stat["price"],
        StatRange {
            min: 8990.0,
            max: 45990.5
        }
    );
}

#[test]
fn test_snapshot_rejects_malformed_aggregations() {
    let aggregations = json!({"term": {"fuelType": "not a list"}});
    assert!(InventorySnapshot::from_aggregations(&aggregations, None, None).is_err());
}
