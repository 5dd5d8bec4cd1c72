use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::forecast::ForecastPoint;

pub const DEFAULT_DAYS: usize = 7;
pub const DEFAULT_HOURS_PER_DAY: usize = 24;

/// Forecast hours sharing one calendar date.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    #[serde(rename = "dayKey", serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub hours: Vec<ForecastPoint>,
}

impl DayBucket {
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
}

/// Buckets `points` by date, ascending by date whatever the input order.
/// Keeps the first `max_days` dates and, within each, the first
/// `hours_per_day` points in their original order.
pub fn group_by_day(
    points: &[ForecastPoint],
    max_days: usize,
    hours_per_day: usize,
) -> Vec<DayBucket> {
    let mut by_day: BTreeMap<NaiveDate, Vec<ForecastPoint>> = BTreeMap::new();
    for p in points {
        by_day.entry(p.date()).or_default().push(p.clone());
    }

    by_day
        .into_iter()
        .take(max_days)
        .map(|(date, mut hours)| {
            hours.truncate(hours_per_day);
            DayBucket { date, hours }
        })
        .collect()
}
