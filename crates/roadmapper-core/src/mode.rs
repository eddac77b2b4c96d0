//! Timeline granularity.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::RoadmapError;

/// Width of one timeline bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineMode {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl TimelineMode {
    /// Calendar months covered by one bucket, `None` for weekly buckets.
    pub const fn months_per_bucket(self) -> Option<u32> {
        match self {
            TimelineMode::Weekly => None,
            TimelineMode::Monthly => Some(1),
            TimelineMode::Quarterly => Some(3),
            TimelineMode::HalfYearly => Some(6),
            TimelineMode::Yearly => Some(12),
        }
    }

    /// Start date of bucket `index` for a timeline starting at `start`.
    ///
    /// Month-based modes offset from `start` rather than chaining one step at
    /// a time, so a 31st does not drift to the 28th after February.
    pub fn bucket_start(self, start: NaiveDate, index: u32) -> NaiveDate {
        match self.months_per_bucket() {
            None => start
                .checked_add_days(Days::new(u64::from(index) * 7))
                .unwrap_or(NaiveDate::MAX),
            Some(step) => step
                .checked_mul(index)
                .and_then(|months| start.checked_add_months(Months::new(months)))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Display label for the bucket starting at `date`.
    pub fn label(self, date: NaiveDate, index: u32, generic: bool) -> String {
        let n = index + 1;
        match (self, generic) {
            (TimelineMode::Weekly, true) => format!("Week {n}"),
            (TimelineMode::Monthly, true) => format!("Month {n}"),
            (TimelineMode::Quarterly, true) => format!("Q{n}"),
            (TimelineMode::HalfYearly, true) => format!("H{n}"),
            (TimelineMode::Yearly, true) => format!("Year {n}"),
            (TimelineMode::Weekly, false) => date.format("%d %b").to_string(),
            (TimelineMode::Monthly, false) => date.format("%b %Y").to_string(),
            (TimelineMode::Quarterly, false) => {
                format!("Q{} {}", (date.month0() / 3) + 1, date.year())
            }
            (TimelineMode::HalfYearly, false) => {
                format!("H{} {}", (date.month0() / 6) + 1, date.year())
            }
            (TimelineMode::Yearly, false) => date.year().to_string(),
        }
    }
}

impl fmt::Display for TimelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimelineMode::Weekly => "WEEKLY",
            TimelineMode::Monthly => "MONTHLY",
            TimelineMode::Quarterly => "QUARTERLY",
            TimelineMode::HalfYearly => "HALF_YEARLY",
            TimelineMode::Yearly => "YEARLY",
        };
        f.write_str(name)
    }
}

impl FromStr for TimelineMode {
    type Err = RoadmapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lookup = value.trim().to_ascii_uppercase().replace('-', "_");
        match lookup.as_str() {
            "WEEKLY" => Ok(TimelineMode::Weekly),
            "MONTHLY" => Ok(TimelineMode::Monthly),
            "QUARTERLY" => Ok(TimelineMode::Quarterly),
            "HALF_YEARLY" | "HALF_YEAR" => Ok(TimelineMode::HalfYearly),
            "YEARLY" | "ANNUAL" => Ok(TimelineMode::Yearly),
            _ => Err(RoadmapError::UnsupportedTimelineMode(value.to_string())),
        }
    }
}
