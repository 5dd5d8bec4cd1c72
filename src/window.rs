use chrono::{NaiveDateTime, Timelike};
use tracing::warn;

use crate::forecast::ForecastPoint;

/// How a bounded run of hours is picked out of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// The first `n` points.
    Prefix(usize),
    /// Up to `n` points starting at the current hour.
    FromNow(usize),
}

impl Window {
    pub fn select<'a>(&self, points: &'a [ForecastPoint], now: NaiveDateTime) -> &'a [ForecastPoint] {
        match *self {
            Window::Prefix(n) => prefix(points, n),
            Window::FromNow(n) => from_now(points, n, now),
        }
    }
}

pub fn prefix(points: &[ForecastPoint], n: usize) -> &[ForecastPoint] {
    &points[..n.min(points.len())]
}

/// Zeroes the minute, second and sub-second components.
pub fn truncate_to_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.date()
        .and_hms_opt(time.hour(), 0, 0)
        .unwrap_or(time)
}

/// Returns up to `n` points starting with the first one at or after the
/// current hour. `points` must be sorted ascending by time.
///
/// When every point lies before the current hour the window starts at index 0,
/// so stale data still shows the earliest hours available.
pub fn from_now(points: &[ForecastPoint], n: usize, now: NaiveDateTime) -> &[ForecastPoint] {
    let hour = truncate_to_hour(now);
    let start = match points.iter().position(|p| p.time >= hour) {
        Some(idx) => idx,
        None => {
            if !points.is_empty() {
                warn!(now = %hour, "No forecast hour at or after now, starting from the earliest");
            }
            0
        }
    };
    let end = start.saturating_add(n).min(points.len());
    &points[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::parse_time;
    use crate::forecast::tests::point;

    fn hours(day: &str, count: u32) -> Vec<ForecastPoint> {
        (0..count)
            .map(|h| point(&format!("{day}T{h:02}:00"), h as f64))
            .collect()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_prefix() {
        let points = hours("2026-01-13", 10);
        assert_eq!(prefix(&points, 4), &points[..4]);
        assert_eq!(prefix(&points, 0).len(), 0);
        assert_eq!(prefix(&points, 25), &points[..]);
        assert!(prefix(&[], 24).is_empty());
    }

    #[test]
    fn test_truncate_to_hour() {
        let t = at("2026-01-13T14:37:59");
        assert_eq!(truncate_to_hour(t), parse_time("2026-01-13T14:00").unwrap());
        let t = at("2026-01-13T14:37:59") + chrono::Duration::nanoseconds(123);
        assert_eq!(truncate_to_hour(t), parse_time("2026-01-13T14:00").unwrap());
    }

    #[test]
    fn test_from_now_starts_at_current_hour() {
        let points = hours("2026-01-13", 24);
        let window = from_now(&points, 5, at("2026-01-13T14:37:12"));
        assert_eq!(window.len(), 5);
        assert_eq!(window[0].hour_label(), "14:00");
        assert_eq!(window[4].hour_label(), "18:00");
    }

    #[test]
    fn test_from_now_exact_hour_included() {
        let points = hours("2026-01-13", 24);
        let window = from_now(&points, 2, at("2026-01-13T09:00:00"));
        assert_eq!(window[0].hour_label(), "09:00");
    }

    #[test]
    fn test_from_now_truncated_at_end() {
        let points = hours("2026-01-13", 24);
        let window = from_now(&points, 24, at("2026-01-13T20:10:00"));
        assert_eq!(window.len(), 4);
        assert_eq!(window[3].hour_label(), "23:00");
    }

    #[test]
    fn test_from_now_before_all_points() {
        let points = hours("2026-01-13", 24);
        let window = from_now(&points, 3, at("2026-01-12T22:00:00"));
        assert_eq!(window, &points[..3]);
    }

    #[test]
    fn test_from_now_falls_back_to_start() {
        let points = hours("2026-01-12", 10);
        let window = from_now(&points, 4, at("2026-01-13T14:05:00"));
        assert_eq!(window, &points[..4]);
    }

    #[test]
    fn test_from_now_empty() {
        assert!(from_now(&[], 24, at("2026-01-13T14:05:00")).is_empty());
        assert!(from_now(&hours("2026-01-13", 3), 0, at("2026-01-13T01:00:00")).is_empty());
    }

    #[test]
    fn test_select() {
        let points = hours("2026-01-13", 24);
        let now = at("2026-01-13T06:30:00");
        assert_eq!(Window::Prefix(3).select(&points, now), &points[..3]);
        assert_eq!(Window::FromNow(3).select(&points, now), &points[6..9]);
    }
}
