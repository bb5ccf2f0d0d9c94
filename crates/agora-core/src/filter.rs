// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use crate::model::ParkingLot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotFilter {
    #[default]
    All,
    Available,
    Underutilized,
}

impl LotFilter {
    pub const ALL: [LotFilter; 3] = [LotFilter::All, LotFilter::Available, LotFilter::Underutilized];

    pub fn as_str(&self) -> &'static str {
        match self {
            LotFilter::All => "all",
            LotFilter::Available => "available",
            LotFilter::Underutilized => "underutilized",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LotFilter::All => "All",
            LotFilter::Available => "Available for rent",
            LotFilter::Underutilized => "Underutilized",
        }
    }

    pub fn matches(&self, lot: &ParkingLot, thresholds: &UnderutilizedThresholds) -> bool {
        match self {
            LotFilter::All => true,
            LotFilter::Available => lot.is_available(),
            LotFilter::Underutilized => thresholds.is_underutilized(lot),
        }
    }
}

impl fmt::Display for LotFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected all, available or underutilized)")]
pub struct UnknownFilter(pub String);

impl FromStr for LotFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(LotFilter::All),
            "available" => Ok(LotFilter::Available),
            "underutilized" => Ok(LotFilter::Underutilized),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

/// Cut-offs for the "underutilized" filter.
///
/// A lot qualifies when its average utilization is strictly below
/// `max_avg_utilization` OR it reports more than `min_underutilized_hours`
/// quiet hours per week. Missing data never qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderutilizedThresholds {
    pub max_avg_utilization: f64,
    pub min_underutilized_hours: u32,
}

impl Default for UnderutilizedThresholds {
    fn default() -> Self {
        Self {
            max_avg_utilization: 40.0,
            min_underutilized_hours: 0,
        }
    }
}

impl UnderutilizedThresholds {
    pub fn is_underutilized(&self, lot: &ParkingLot) -> bool {
        let low_average = lot
            .avg_utilization
            .is_some_and(|util| util < self.max_avg_utilization);
        let quiet_hours = lot
            .underutilized_hours
            .is_some_and(|hours| hours > self.min_underutilized_hours);
        low_average || quiet_hours
    }
}

/// Lots that pass `filter`, in source order.
pub fn visible<'a>(
    filter: LotFilter,
    lots: &'a [ParkingLot],
    thresholds: &UnderutilizedThresholds,
) -> Vec<&'a ParkingLot> {
    lots.iter()
        .filter(|lot| filter.matches(lot, thresholds))
        .collect()
}

pub fn underutilized_count(lots: &[ParkingLot], thresholds: &UnderutilizedThresholds) -> usize {
    lots.iter().filter(|lot| thresholds.is_underutilized(lot)).count()
}


#[cfg(test)]
mod tests {
    use super::fixtures::lot;
    use super::*;

    fn ids(lots: &[&ParkingLot]) -> Vec<i64> {
        lots.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_all_keeps_everything_in_order() {
        let lots = vec![
            lot(3, None, None, None),
            lot(1, Some(true), Some(90.0), None),
            lot(2, Some(false), Some(10.0), Some(5)),
        ];
        let t = UnderutilizedThresholds::default();
        assert_eq!(ids(&visible(LotFilter::All, &lots, &t)), vec![3, 1, 2]);
    }

    #[test]
    fn test_available_requires_explicit_true() {
        let lots = vec![
            lot(1, Some(true), None, None),
            lot(2, Some(false), None, None),
            lot(3, None, None, None),
        ];
        let t = UnderutilizedThresholds::default();
        assert_eq!(ids(&visible(LotFilter::Available, &lots, &t)), vec![1]);
    }

    #[test]
    fn test_underutilized_either_clause() {
        let lots = vec![
            lot(1, Some(true), Some(80.0), None),
            lot(2, Some(false), Some(10.0), None),
            lot(3, None, Some(95.0), Some(3)),
            lot(4, None, Some(40.0), Some(0)),
            lot(5, None, None, None),
        ];
        let t = UnderutilizedThresholds::default();
        assert_eq!(ids(&visible(LotFilter::Underutilized, &lots, &t)), vec![2, 3]);
        assert_eq!(underutilized_count(&lots, &t), 2);
    }

    #[test]
    fn test_custom_thresholds() {
        let lots = vec![lot(1, None, Some(45.0), Some(2))];
        let strict = UnderutilizedThresholds {
            max_avg_utilization: 30.0,
            min_underutilized_hours: 10,
        };
        assert!(visible(LotFilter::Underutilized, &lots, &strict).is_empty());
    }

    #[test]
    fn test_visible_is_subset_for_every_filter() {
        let lots = vec![
            lot(1, Some(true), Some(80.0), None),
            lot(2, Some(false), Some(10.0), None),
            lot(3, None, None, Some(7)),
        ];
        let t = UnderutilizedThresholds::default();
        for filter in LotFilter::ALL {
            for v in visible(filter, &lots, &t) {
                assert!(lots.iter().any(|l| l.id == v.id), "{} leaked lot {}", filter, v.id);
            }
        }
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("available".parse::<LotFilter>().unwrap(), LotFilter::Available);
        assert_eq!("Underutilized".parse::<LotFilter>().unwrap(), LotFilter::Underutilized);
        assert_eq!("".parse::<LotFilter>().unwrap(), LotFilter::All);
        assert!("funded".parse::<LotFilter>().is_err());
        assert_eq!(LotFilter::Underutilized.to_string(), "underutilized");
    }
}
