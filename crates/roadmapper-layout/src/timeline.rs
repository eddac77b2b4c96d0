//! Timeline partitioning and date to x mapping.

use chrono::{Datelike, Days, NaiveDate};
use roadmapper_core::{RoadmapError, TimelineMode};

/// One timeline cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    pub index: u32,
    pub label: String,
    /// First day of the bucket
    pub start: NaiveDate,
    /// First day after the bucket
    pub end: NaiveDate,
    pub x: f32,
    pub right: f32,
}

impl Bucket {
    pub fn width(&self) -> f32 {
        self.right - self.x
    }

    fn days(&self) -> f32 {
        (self.end - self.start).num_days().max(1) as f32
    }

    fn px_per_day(&self) -> f32 {
        self.width() / self.days()
    }
}

/// Equal-width buckets spanning `[left, right]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub mode: TimelineMode,
    pub buckets: Vec<Bucket>,
}

/// Split `[left, left + width]` into `items` equal cells, one per `mode` step.
pub fn partition(
    mode: TimelineMode,
    start: NaiveDate,
    items: u32,
    generic: bool,
    left: f32,
    width: f32,
) -> Result<Partition, RoadmapError> {
    if items == 0 {
        return Err(RoadmapError::InvalidItemCount);
    }
    let cell = width / items as f32;
    let buckets = (0..items)
        .map(|index| {
            let bucket_start = mode.bucket_start(start, index);
            let x = left + cell * index as f32;
            let right = if index + 1 == items {
                left + width
            } else {
                left + cell * (index + 1) as f32
            };
            Bucket {
                index,
                label: mode.label(bucket_start, index, generic),
                start: bucket_start,
                end: mode.bucket_start(start, index + 1),
                x,
                right,
            }
        })
        .collect();
    Ok(Partition { mode, buckets })
}

impl Partition {
    pub fn left(&self) -> f32 {
        self.buckets.first().map_or(0.0, |b| b.x)
    }

    pub fn right(&self) -> f32 {
        self.buckets.last().map_or(0.0, |b| b.right)
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.buckets.first().map(|b| b.start)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.buckets.last().map(|b| b.end)
    }

    /// Horizontal position of the start of `date`.
    ///
    /// Dates outside the partition are extrapolated with the nearest edge
    /// bucket's pixels-per-day rate, so they may land off the timeline.
    pub fn x_for_date(&self, date: NaiveDate) -> f32 {
        let (Some(first), Some(last)) = (self.buckets.first(), self.buckets.last()) else {
            return 0.0;
        };
        if date < first.start {
            let days = (first.start - date).num_days() as f32;
            return first.x - days * first.px_per_day();
        }
        if date >= last.end {
            let days = (date - last.end).num_days() as f32;
            return last.right + days * last.px_per_day();
        }
        self.buckets
            .iter()
            .find(|b| date >= b.start && date < b.end)
            .map_or(last.right, |b| {
                let days = (date - b.start).num_days() as f32;
                b.x + days * b.px_per_day()
            })
    }

    /// Span of an inclusive date range; the right edge is the start of the
    /// day after `end`.
    pub fn span(&self, start: NaiveDate, end: NaiveDate) -> (f32, f32) {
        let after = end.checked_add_days(Days::new(1)).unwrap_or(end);
        (self.x_for_date(start), self.x_for_date(after))
    }
}

/// Suggested bucket count for a date range.
///
/// Counts whole calendar months from `start` to `end` inclusive, then scales
/// to the mode: quarters round up, weeks are capped at 26, everything else is
/// clamped to 3..=18.
pub fn default_item_count(start: NaiveDate, end: NaiveDate, mode: TimelineMode) -> u32 {
    let span = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1;
    let months = span.max(1) as u32;
    match mode {
        TimelineMode::Quarterly => months.div_ceil(3),
        TimelineMode::Weekly => ((months as f32 * 30.0 / 7.0).round() as u32).clamp(1, 26),
        _ => months.clamp(3, 18),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn zero_items_is_an_error() {
        assert!(partition(TimelineMode::Monthly, date(2025, 1, 1), 0, false, 0.0, 100.0).is_err());
    }

    #[test]
    fn buckets_are_contiguous_and_fill_the_width() {
        let p = partition(TimelineMode::Weekly, date(2025, 1, 6), 7, false, 13.0, 500.0).unwrap();
        assert_eq!(p.buckets.len(), 7);
        for pair in p.buckets.windows(2) {
            assert_eq!(pair[0].right, pair[1].x);
            assert_eq!(pair[0].end, pair[1].start);
        }
        let total: f32 = p.buckets.iter().map(Bucket::width).sum();
        assert!((total - 500.0).abs() < 1e-3);
        assert_eq!(p.right(), 513.0);
    }

    #[test]
    fn interpolates_inside_a_bucket() {
        let p = partition(TimelineMode::Monthly, date(2025, 4, 1), 1, false, 0.0, 300.0).unwrap();
        // April has 30 days: 10 px per day
        assert_eq!(p.x_for_date(date(2025, 4, 16)), 150.0);
    }

    #[test]
    fn extrapolates_before_and_after() {
        let p = partition(TimelineMode::Monthly, date(2025, 4, 1), 1, false, 100.0, 300.0).unwrap();
        assert_eq!(p.x_for_date(date(2025, 3, 30)), 80.0);
        assert_eq!(p.x_for_date(date(2025, 5, 3)), 420.0);
    }

    #[test]
    fn default_counts() {
        let s = date(2025, 1, 15);
        assert_eq!(default_item_count(s, date(2025, 1, 20), TimelineMode::Monthly), 3);
        assert_eq!(default_item_count(s, date(2025, 7, 1), TimelineMode::Monthly), 7);
        assert_eq!(default_item_count(s, date(2027, 12, 1), TimelineMode::Monthly), 18);
        assert_eq!(default_item_count(s, date(2025, 7, 1), TimelineMode::Quarterly), 3);
        assert_eq!(default_item_count(s, date(2025, 2, 1), TimelineMode::Weekly), 9);
        assert_eq!(default_item_count(s, date(2026, 6, 1), TimelineMode::Weekly), 26);
        // End before start still yields one month
        assert_eq!(default_item_count(s, date(2024, 1, 1), TimelineMode::Quarterly), 1);
    }
}
