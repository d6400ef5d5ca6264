/// Integration tests for reading downloaded RDB files and aligning their
/// series by date range.

use chrono::{NaiveDate, NaiveDateTime};
use nwis_ingest::analysis::alignment::{align_pair, overlap_window, subset};
use nwis_ingest::ingest::rdb;
use nwis_ingest::model::{DataKind, NwisError, PARAM_DISCHARGE};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Daily discharge rows for `days` of January 2014, value = 100 × day.
fn daily_file(site: &str, days: std::ops::RangeInclusive<u32>) -> String {
    let mut text = format!(
        "# retrieved: 2014-03-11 08:40:40 EDT\n\
         #    USGS {site} TEST RIVER NEAR SOMEWHERE, KY\n\
         #    06   00060     00003     Discharge, cubic feet per second (Mean)\n\
         agency_cd\tsite_no\tdatetime\t06_00060_00003\t06_00060_00003_cd\n\
         5s\t15s\t20d\t14n\t10s\n"
    );
    for day in days {
        text.push_str(&format!("USGS\t{site}\t2014-01-{:02}\t{}\tA\n", day, day * 100));
    }
    text
}

fn day(n: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2014, 1, n).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_downloaded_daily_files_align_on_shared_days() {
    let upstream = rdb::parse_rdb(&daily_file("03284000", 1..=20)).unwrap();
    let downstream = rdb::parse_rdb(&daily_file("03290500", 5..=31)).unwrap();
    assert_eq!(upstream.timestep, Some(DataKind::Daily));

    let a = upstream.series(PARAM_DISCHARGE).unwrap();
    let b = downstream.series(PARAM_DISCHARGE).unwrap();

    let window = overlap_window(&a, &b).unwrap();
    assert_eq!(window.start, day(5));
    assert_eq!(window.end, day(20));

    let (a_aligned, b_aligned) = align_pair(&a, &b).unwrap();
    assert_eq!(a_aligned.len(), 16);
    assert_eq!(a_aligned.dates, b_aligned.dates);
    assert_eq!(a_aligned.values[0], Some(500.0));
    assert_eq!(b_aligned.values[15], Some(2000.0));
}

#[test]
fn test_subset_to_own_window_is_stable() {
    let file = rdb::parse_rdb(&daily_file("03284000", 1..=10)).unwrap();
    let other = rdb::parse_rdb(&daily_file("03290500", 4..=15)).unwrap();
    let series = file.series(PARAM_DISCHARGE).unwrap();
    let window = overlap_window(&series, &other.series(PARAM_DISCHARGE).unwrap()).unwrap();

    let once = subset(&series, &window).unwrap();
    assert!(!once.is_empty());
    assert_eq!(subset(&once, &window).unwrap(), once);
}

#[test]
fn test_disjoint_downloads_report_no_overlap() {
    let early = rdb::parse_rdb(&daily_file("03284000", 1..=5)).unwrap();
    let late = rdb::parse_rdb(&daily_file("03290500", 10..=15)).unwrap();

    let err = align_pair(
        &early.series(PARAM_DISCHARGE).unwrap(),
        &late.series(PARAM_DISCHARGE).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, NwisError::NoOverlap { .. }));
}
