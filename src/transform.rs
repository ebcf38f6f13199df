//! Normalizer and batch validator.
//!
//! Pure transformations, no I/O. Categorical fields are trimmed,
//! lowercased, mapped through a synonym table, and title-cased; timestamps
//! are coerced with unparseable values becoming null (the only tolerated
//! soft failure). Validation is batch-level and all-or-nothing.

use chrono::{NaiveDate, NaiveDateTime};
use snafu::prelude::*;

use crate::error::{InvalidEnumsSnafu, ValidationError};
use crate::model::{CourierName, RawRider, Rider, VehicleType};

/// Title-case a string: first letter of each word upper, rest lower.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Normalize a vehicle type value into canonical form.
///
/// Idempotent: normalizing an already-canonical value is a no-op.
pub fn normalize_vehicle(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let canonical = match lowered.as_str() {
        "motorbike" => "motorcycle",
        "bike" => "bicycle",
        "trike" => "tricycle",
        other => other,
    };
    title_case(canonical)
}

/// Normalize a gender value into canonical form. Idempotent.
pub fn normalize_gender(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let canonical = match lowered.as_str() {
        "m" => "male",
        "f" => "female",
        other => other,
    };
    title_case(canonical)
}

/// Parse a timestamp leniently; `None` on anything unparseable.
///
/// Date-only values become midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    const FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for format in FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(timestamp);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn normalize_rider(raw: RawRider) -> Rider {
    Rider {
        // Courier casing is intentionally left alone.
        courier_name: raw.courier_name,
        vehicle_type: normalize_vehicle(&raw.vehicle_type),
        first_name: raw.first_name,
        last_name: raw.last_name,
        gender: raw.gender.map(|g| normalize_gender(&g)),
        age: raw.age.and_then(|a| u32::try_from(a).ok()),
        created_at: raw.created_at.as_deref().and_then(parse_timestamp),
        updated_at: raw.updated_at.as_deref().and_then(parse_timestamp),
    }
}

/// Normalize a raw dataset into canonical rider records.
pub fn normalize(raw: Vec<RawRider>) -> Vec<Rider> {
    raw.into_iter().map(normalize_rider).collect()
}

/// Validate every row's courier and vehicle against the closed enumerations.
///
/// All-or-nothing: any violation rejects the whole batch, with each distinct
/// offending value listed exactly once in first-seen order. Callers may skip
/// this for trusted input.
pub fn validate(riders: &[Rider]) -> Result<(), ValidationError> {
    let mut couriers: Vec<String> = Vec::new();
    let mut vehicles: Vec<String> = Vec::new();

    for rider in riders {
        if !CourierName::is_valid(&rider.courier_name) && !couriers.contains(&rider.courier_name) {
            couriers.push(rider.courier_name.clone());
        }
        if !VehicleType::is_valid(&rider.vehicle_type) && !vehicles.contains(&rider.vehicle_type) {
            vehicles.push(rider.vehicle_type.clone());
        }
    }

    ensure!(
        couriers.is_empty() && vehicles.is_empty(),
        InvalidEnumsSnafu { couriers, vehicles }
    );
    Ok(())
}
