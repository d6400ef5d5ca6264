//! Date-range alignment of time series.
//!
//! Two series can only be compared over the dates both of them cover. The
//! overlap window starts at the later of the two first dates and ends at the
//! earlier of the two last dates, so neither series is ever extrapolated.
//!
//! Subsetting matches window boundaries exactly against the series' own dates.
//! There is no nearest-date snapping or interpolation: series sampled on
//! different cadences must be resampled before they are aligned here.

use chrono::NaiveDateTime;

use crate::logging::{self, Component};
use crate::model::{DateWindow, NwisError, TimeSeries};

/// Window covered by both `a` and `b`.
///
/// Both series must be sorted ascending. Returns `EmptySeries` if either has
/// no dates and `NoOverlap` if one ends before the other begins.
pub fn overlap_window(a: &TimeSeries, b: &TimeSeries) -> Result<DateWindow, NwisError> {
    let (a_first, a_last) = bounds(a)?;
    let (b_first, b_last) = bounds(b)?;

    let start = a_first.max(b_first);
    let end = a_last.min(b_last);

    if start > end {
        return Err(NwisError::NoOverlap {
            first_end: end,
            second_start: start,
        });
    }
    Ok(DateWindow { start, end })
}

/// Window covered by every series in `series`.
///
/// Needs at least one series; a single series yields its own full range.
pub fn overlap_window_all(series: &[&TimeSeries]) -> Result<DateWindow, NwisError> {
    let (first, rest) = series.split_first().ok_or(NwisError::EmptySeries)?;
    let (start, end) = bounds(first)?;

    rest.iter().try_fold(DateWindow { start, end }, |window, next| {
        let (next_first, next_last) = bounds(next)?;
        let start = window.start.max(next_first);
        let end = window.end.min(next_last);
        if start > end {
            return Err(NwisError::NoOverlap {
                first_end: end,
                second_start: start,
            });
        }
        Ok(DateWindow { start, end })
    })
}

/// Restricts `series` to the inclusive range `[window.start, window.end]`.
///
/// Window ends outside the series' range are clamped to its first and last
/// dates. Boundaries inside the range must be entries of `series.dates`,
/// otherwise `DateNotInSeries` is returned.
pub fn subset(series: &TimeSeries, window: &DateWindow) -> Result<TimeSeries, NwisError> {
    if series.dates.len() != series.values.len() {
        return Err(NwisError::LengthMismatch {
            dates: series.dates.len(),
            values: series.values.len(),
        });
    }
    let (first, last) = bounds(series)?;

    let start = if window.start < first || window.start > last {
        first
    } else {
        window.start
    };
    let end = if window.end > last || window.end < first {
        last
    } else {
        window.end
    };

    // Repeated timestamps (an IV fall-back hour) stay whole at either edge.
    let start_idx = first_position_of(series, start)?;
    let end_idx = last_position_of(series, end)?;

    if start_idx > end_idx {
        logging::debug(
            Component::Alignment,
            None,
            &format!("window {} to {} selects no entries", start, end),
        );
        return Ok(TimeSeries::default());
    }

    Ok(TimeSeries {
        dates: series.dates[start_idx..=end_idx].to_vec(),
        values: series.values[start_idx..=end_idx].to_vec(),
    })
}

/// Subsets both series to their common window.
pub fn align_pair(a: &TimeSeries, b: &TimeSeries) -> Result<(TimeSeries, TimeSeries), NwisError> {
    let window = overlap_window(a, b)?;
    logging::debug(
        Component::Alignment,
        None,
        &format!("aligning on {} to {}", window.start, window.end),
    );
    Ok((subset(a, &window)?, subset(b, &window)?))
}

fn bounds(series: &TimeSeries) -> Result<(NaiveDateTime, NaiveDateTime), NwisError> {
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(NwisError::EmptySeries),
    }
}

fn first_position_of(series: &TimeSeries, date: NaiveDateTime) -> Result<usize, NwisError> {
    series
        .dates
        .iter()
        .position(|d| *d == date)
        .ok_or(NwisError::DateNotInSeries(date))
}

fn last_position_of(series: &TimeSeries, date: NaiveDateTime) -> Result<usize, NwisError> {
    series
        .dates
        .iter()
        .rposition(|d| *d == date)
        .ok_or(NwisError::DateNotInSeries(date))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Day `n` of January 2014 at midnight.
    fn day(n: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 1, n).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn series_of_days(days: &[u32]) -> TimeSeries {
        TimeSeries {
            dates: days.iter().map(|d| day(*d)).collect(),
            values: days.iter().map(|d| Some(*d as f64 * 10.0)).collect(),
        }
    }

    fn days_of(series: &TimeSeries) -> Vec<NaiveDateTime> {
        series.dates.clone()
    }

    // --- overlap_window -----------------------------------------------------

    #[test]
    fn test_overlap_of_shifted_series() {
        let a = series_of_days(&[1, 2, 3, 4]);
        let b = series_of_days(&[2, 3, 4, 5]);
        let window = overlap_window(&a, &b).unwrap();
        assert_eq!(window, DateWindow { start: day(2), end: day(4) });
    }

    #[test]
    fn test_overlap_is_commutative() {
        let a = series_of_days(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        let b = series_of_days(&[3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
        assert_eq!(overlap_window(&a, &b).unwrap(), overlap_window(&b, &a).unwrap());
        assert_eq!(
            overlap_window(&a, &b).unwrap(),
            DateWindow { start: day(3), end: day(11) }
        );
    }

    #[test]
    fn test_overlap_of_contained_series() {
        let outer = series_of_days(&[1, 2, 3, 4, 5, 6]);
        let inner = series_of_days(&[3, 4]);
        assert_eq!(
            overlap_window(&outer, &inner).unwrap(),
            DateWindow { start: day(3), end: day(4) }
        );
    }

    #[test]
    fn test_overlap_of_disjoint_series_is_error() {
        let a = series_of_days(&[1, 2, 3]);
        let b = series_of_days(&[10, 11]);
        let err = overlap_window(&a, &b).unwrap_err();
        assert_eq!(
            err,
            NwisError::NoOverlap { first_end: day(3), second_start: day(10) }
        );
    }

    #[test]
    fn test_overlap_with_empty_series_is_error() {
        let a = series_of_days(&[1, 2]);
        let empty = TimeSeries::default();
        assert_eq!(overlap_window(&a, &empty).unwrap_err(), NwisError::EmptySeries);
        assert_eq!(overlap_window(&empty, &a).unwrap_err(), NwisError::EmptySeries);
    }

    #[test]
    fn test_overlap_window_all_three_series() {
        let a = series_of_days(&[1, 2, 3, 4, 5]);
        let b = series_of_days(&[2, 3, 4, 5, 6]);
        let c = series_of_days(&[3, 4, 5, 6, 7]);
        assert_eq!(
            overlap_window_all(&[&a, &b, &c]).unwrap(),
            DateWindow { start: day(3), end: day(5) }
        );
        assert_eq!(overlap_window_all(&[]).unwrap_err(), NwisError::EmptySeries);
    }

    // --- subset -------------------------------------------------------------

    #[test]
    fn test_subset_within_range() {
        let series = series_of_days(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        let window = DateWindow { start: day(4), end: day(10) };
        let result = subset(&series, &window).unwrap();
        assert_eq!(days_of(&result), (4..=10).map(day).collect::<Vec<_>>());
        assert_eq!(result.values.first(), Some(&Some(40.0)));
        assert_eq!(result.values.last(), Some(&Some(100.0)));
    }

    #[test]
    fn test_subset_window_outside_range_is_clamped() {
        let series = series_of_days(&[1, 2, 3, 4, 5]);
        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2013, 12, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            end: day(20),
        };
        assert_eq!(subset(&series, &window).unwrap(), series);
    }

    #[test]
    fn test_subset_both_series_to_shared_window() {
        let a = series_of_days(&[1, 2, 3, 4]);
        let b = series_of_days(&[2, 3, 4, 5]);
        let window = overlap_window(&a, &b).unwrap();
        let expected = vec![day(2), day(3), day(4)];
        assert_eq!(days_of(&subset(&a, &window).unwrap()), expected);
        assert_eq!(days_of(&subset(&b, &window).unwrap()), expected);
    }

    #[test]
    fn test_subset_is_idempotent() {
        let series = series_of_days(&[1, 2, 3, 4, 5, 6]);
        let window = DateWindow { start: day(2), end: day(5) };
        let once = subset(&series, &window).unwrap();
        let twice = subset(&once, &window).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_subset_length_mismatch_is_error() {
        let mut series = series_of_days(&[1, 2, 3]);
        series.values.pop();
        let window = DateWindow { start: day(1), end: day(3) };
        assert_eq!(
            subset(&series, &window).unwrap_err(),
            NwisError::LengthMismatch { dates: 3, values: 2 }
        );
    }

    #[test]
    fn test_subset_empty_series_is_error() {
        let window = DateWindow { start: day(1), end: day(3) };
        assert_eq!(subset(&TimeSeries::default(), &window).unwrap_err(), NwisError::EmptySeries);
    }

    #[test]
    fn test_subset_boundary_must_be_present() {
        // Every other day; day 4 is inside the range but not an entry.
        let series = series_of_days(&[1, 3, 5, 7]);
        let window = DateWindow { start: day(4), end: day(7) };
        assert_eq!(
            subset(&series, &window).unwrap_err(),
            NwisError::DateNotInSeries(day(4))
        );
    }

    #[test]
    fn test_subset_keeps_missing_values() {
        let series = TimeSeries {
            dates: vec![day(1), day(2), day(3)],
            values: vec![Some(1.0), None, Some(3.0)],
        };
        let window = DateWindow { start: day(2), end: day(3) };
        assert_eq!(subset(&series, &window).unwrap().values, vec![None, Some(3.0)]);
    }

    #[test]
    fn test_subset_keeps_repeated_end_timestamps() {
        let series = series_of_days(&[1, 2, 3, 3]);
        let window = DateWindow { start: day(1), end: day(3) };
        let result = subset(&series, &window).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result, series);
    }

    #[test]
    fn test_subset_keeps_repeated_start_timestamps() {
        let series = series_of_days(&[1, 2, 2, 3, 4]);
        let window = DateWindow { start: day(2), end: day(3) };
        assert_eq!(days_of(&subset(&series, &window).unwrap()), vec![day(2), day(2), day(3)]);
    }

    #[test]
    fn test_align_pair() {
        let a = series_of_days(&[1, 2, 3, 4]);
        let b = series_of_days(&[3, 4, 5]);
        let (a_aligned, b_aligned) = align_pair(&a, &b).unwrap();
        assert_eq!(a_aligned.dates, b_aligned.dates);
        assert_eq!(a_aligned.len(), 2);
    }
}
