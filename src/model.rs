//! Record types and closed enumerations.
//!
//! The courier and vehicle enumerations are the single source of truth for
//! valid values; the validator and the node schemas both depend on them.
//! Adding a courier or vehicle type means extending the enum here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, UnknownCourierSnafu};

/// The closed set of courier identities.
///
/// String values are the canonical upper-case codes; courier casing is
/// never normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourierName {
    Jnt,
    Lbcd,
    Fedez,
}

impl CourierName {
    pub const ALL: [CourierName; 3] = [CourierName::Jnt, CourierName::Lbcd, CourierName::Fedez];

    /// The canonical string value for this courier.
    pub fn as_str(&self) -> &'static str {
        match self {
            CourierName::Jnt => "JNT",
            CourierName::Lbcd => "LBCD",
            CourierName::Fedez => "FEDEZ",
        }
    }

    /// Membership test against the closed enumeration.
    pub fn is_valid(value: &str) -> bool {
        Self::ALL.iter().any(|courier| courier.as_str() == value)
    }
}

impl fmt::Display for CourierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourierName {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "JNT" => Ok(CourierName::Jnt),
            "LBCD" => Ok(CourierName::Lbcd),
            "FEDEZ" => Ok(CourierName::Fedez),
            _ => UnknownCourierSnafu { value }.fail(),
        }
    }
}

/// The closed set of vehicle types, in canonical title-case form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Motorcycle,
    Bicycle,
    Tricycle,
    Car,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        VehicleType::Motorcycle,
        VehicleType::Bicycle,
        VehicleType::Tricycle,
        VehicleType::Car,
    ];

    /// The canonical string value for this vehicle type.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Motorcycle => "Motorcycle",
            VehicleType::Bicycle => "Bicycle",
            VehicleType::Tricycle => "Tricycle",
            VehicleType::Car => "Car",
        }
    }

    /// Membership test against the closed enumeration.
    pub fn is_valid(value: &str) -> bool {
        Self::ALL.iter().any(|vehicle| vehicle.as_str() == value)
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rider row as extracted from the source join, before normalization.
///
/// Timestamps are kept as raw text so malformed values survive extraction
/// and can be soft-failed to null by the normalizer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawRider {
    #[sqlx(rename = "courierName")]
    pub courier_name: String,
    #[sqlx(rename = "vehicleType")]
    pub vehicle_type: String,
    #[sqlx(rename = "firstName")]
    pub first_name: String,
    #[sqlx(rename = "lastName")]
    pub last_name: String,
    pub gender: Option<String>,
    pub age: Option<i64>,
    #[sqlx(rename = "createdAt")]
    pub created_at: Option<String>,
    #[sqlx(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// A normalized rider record.
///
/// Courier and vehicle stay as strings so the validator can report values
/// outside the enumerations instead of failing row-by-row during decode.
/// The camelCase renames make the staged CSV header match the interchange
/// contract exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
    pub courier_name: String,
    pub vehicle_type: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_membership() {
        assert!(CourierName::is_valid("JNT"));
        assert!(CourierName::is_valid("LBCD"));
        assert!(CourierName::is_valid("FEDEZ"));
        assert!(!CourierName::is_valid("jnt"));
        assert!(!CourierName::is_valid("DHL"));
    }

    #[test]
    fn test_vehicle_membership() {
        assert!(VehicleType::is_valid("Motorcycle"));
        assert!(VehicleType::is_valid("Car"));
        assert!(!VehicleType::is_valid("motorcycle"));
        assert!(!VehicleType::is_valid("Skateboard"));
    }

    #[test]
    fn test_courier_from_str() {
        assert_eq!("jnt".parse::<CourierName>().unwrap(), CourierName::Jnt);
        assert_eq!(" FEDEZ ".parse::<CourierName>().unwrap(), CourierName::Fedez);
        assert!("dhl".parse::<CourierName>().is_err());
    }
}
