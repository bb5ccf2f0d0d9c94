// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parking lot as returned by `GET /parking-lots/`.
///
/// Records are owned by the backend; the front end never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: i64,
    #[serde(default)]
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Day name -> 24 hourly utilization values (0-100)
    #[serde(default)]
    pub popular_times: Option<BTreeMap<String, Vec<u32>>>,
    #[serde(default)]
    pub avg_utilization: Option<f64>,
    #[serde(default)]
    pub underutilized_hours: Option<u32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub business_status: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_available_for_rent: Option<bool>,
    #[serde(default)]
    pub contact_notes: Option<String>,
    #[serde(default)]
    pub estimated_capacity: Option<u32>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ParkingLot {
    /// Only an explicit `true` counts; an unknown flag is not available.
    pub fn is_available(&self) -> bool {
        self.is_available_for_rent == Some(true)
    }

    pub fn coordinate(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Parking lot with its parcel ownership data, from `GET /parking-lots/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingLotDetail {
    #[serde(flatten)]
    pub lot: ParkingLot,
    #[serde(default)]
    pub parcel: Option<Parcel>,
}

impl std::ops::Deref for ParkingLotDetail {
    type Target = ParkingLot;

    fn deref(&self) -> &ParkingLot {
        &self.lot
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: i64,
    pub apn: String,
    pub address: String,
    pub county: String,
    pub state: String,
    pub owner_name: String,
    pub owner_type: String,
    #[serde(default)]
    pub owner_mailing_address: Option<String>,
    #[serde(default)]
    pub is_likely_commercial: bool,
    #[serde(default)]
    pub zoning: Option<String>,
    #[serde(default)]
    pub land_use: Option<String>,
    #[serde(default)]
    pub lot_size_sqft: Option<f64>,
    #[serde(default)]
    pub assessed_value: Option<i64>,
    #[serde(default)]
    pub year_built: Option<i32>,
    /// 1-100
    #[serde(default)]
    pub rentability_score: Option<u8>,
    #[serde(default)]
    pub rentability_notes: Option<Vec<String>>,
}

/// Crowdfunding project attached to a parking lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub required_fund: Option<f64>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub project_description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub investment_goal: Option<f64>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /projects/request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub parking_lot_id: i64,
}

/// Backend timestamps arrive either as RFC 3339 or as naive ISO-8601 (UTC implied).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp '{}'", raw))
                }),
                None => Ok(None),
            }
        }
    }
}
