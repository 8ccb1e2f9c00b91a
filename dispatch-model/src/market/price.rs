use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One hour of locational-based marginal price (LBMP) data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Dense 0-based hour counter over the dataset
    pub hour: usize,
    /// Price in $/MWh at the market node for this hour
    pub lbmp: f64,
    /// Wall-clock timestamp of the hour, as published by the market
    pub time_stamp: NaiveDateTime,
}

impl PricePoint {
    pub fn new(hour: usize, lbmp: f64, time_stamp: NaiveDateTime) -> Self {
        PricePoint {
            hour,
            lbmp,
            time_stamp,
        }
    }
}

/// An ordered, gap-free sequence of hourly prices for a single market node
///
/// The hour counter starts at 0 and increases by exactly one per point.
/// Construction does not enforce this; callers that depend on it should
/// check `is_contiguous()` before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a price series from pre-built points
    pub fn new(points: Vec<PricePoint>) -> Self {
        PriceSeries { points }
    }

    /// Creates a series with a constant price for `len` hours
    ///
    /// Timestamps start at midnight on 2017-01-01 and advance hourly.
    /// Mainly useful for tests and feasibility checks.
    pub fn fixed(lbmp: f64, len: usize) -> Self {
        let base = chrono::NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let points = (0..len)
            .map(|hour| PricePoint::new(hour, lbmp, base + chrono::Duration::hours(hour as i64)))
            .collect();
        PriceSeries { points }
    }

    /// Creates a series from a slice of hourly prices, hour 0 first
    ///
    /// Timestamps are generated the same way as in `fixed`.
    pub fn from_prices(prices: &[f64]) -> Self {
        let base = chrono::NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(hour, &lbmp)| {
                PricePoint::new(hour, lbmp, base + chrono::Duration::hours(hour as i64))
            })
            .collect();
        PriceSeries { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First hour index in the series, if any
    pub fn first_hour(&self) -> Option<usize> {
        self.points.first().map(|p| p.hour)
    }

    /// Last hour index in the series, if any
    pub fn last_hour(&self) -> Option<usize> {
        self.points.last().map(|p| p.hour)
    }

    /// Looks up the point for a given hour index
    ///
    /// Points must be ordered by hour; ingestion guarantees this.
    pub fn get(&self, hour: usize) -> Option<&PricePoint> {
        let index = self
            .points
            .binary_search_by_key(&hour, |point| point.hour)
            .ok()?;
        Some(&self.points[index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Returns the points for `[first_hour, last_hour]` inclusive
    ///
    /// Returns `None` when either bound hour is missing from the series.
    /// Hours outside the bounds may be missing; the slice itself can still
    /// contain a gap, so callers that need contiguity must check the slice.
    /// Points must be ordered by hour.
    pub fn window(&self, first_hour: usize, last_hour: usize) -> Option<&[PricePoint]> {
        if first_hour > last_hour {
            return None;
        }
        let start = self
            .points
            .binary_search_by_key(&first_hour, |point| point.hour)
            .ok()?;
        let end = self
            .points
            .binary_search_by_key(&last_hour, |point| point.hour)
            .ok()?;
        Some(&self.points[start..=end])
    }

    /// Validates that hour indices increase by exactly one per point
    ///
    /// An empty series is not contiguous; the optimizer needs at least one
    /// hour to work with.
    pub fn is_contiguous(&self) -> bool {
        if self.points.is_empty() {
            return false;
        }
        self.points
            .windows(2)
            .all(|pair| pair[1].hour == pair[0].hour + 1)
    }

    /// Returns the hour index at the first gap, if the series has one
    pub fn first_gap(&self) -> Option<usize> {
        self.points
            .windows(2)
            .find(|pair| pair[1].hour != pair[0].hour + 1)
            .map(|pair| pair[0].hour + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_with_hours(hours: &[usize]) -> PriceSeries {
        let base = chrono::NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        PriceSeries::new(
            hours
                .iter()
                .map(|&h| PricePoint::new(h, 25.0, base + chrono::Duration::hours(h as i64)))
                .collect(),
        )
    }

    #[test]
    fn test_fixed_series() {
        let series = PriceSeries::fixed(50.0, 48);
        assert_eq!(series.len(), 48);
        assert!(series.is_contiguous());
        assert_eq!(series.first_hour(), Some(0));
        assert_eq!(series.last_hour(), Some(47));
        for point in series.iter() {
            assert_eq!(point.lbmp, 50.0);
        }
        // Timestamps advance hourly
        let delta = series.points()[1].time_stamp - series.points()[0].time_stamp;
        assert_eq!(delta, chrono::Duration::hours(1));
    }

    #[test]
    fn test_empty_series_is_not_contiguous() {
        let series = PriceSeries::new(vec![]);
        assert!(series.is_empty());
        assert!(!series.is_contiguous());
        assert_eq!(series.first_gap(), None);
    }

    #[test]
    fn test_gap_detection() {
        let series = series_with_hours(&[0, 1, 2, 4, 5]);
        assert!(!series.is_contiguous());
        assert_eq!(series.first_gap(), Some(3));
    }

    #[test]
    fn test_get_by_hour() {
        let series = PriceSeries::fixed(30.0, 24);
        assert_eq!(series.get(0).unwrap().hour, 0);
        assert_eq!(series.get(23).unwrap().hour, 23);
        assert!(series.get(24).is_none());
    }

    #[test]
    fn test_window_inclusive_bounds() {
        let series = PriceSeries::fixed(30.0, 24);
        let window = series.window(5, 10).unwrap();
        assert_eq!(window.len(), 6);
        assert_eq!(window.first().unwrap().hour, 5);
        assert_eq!(window.last().unwrap().hour, 10);

        // Single-hour window
        let window = series.window(7, 7).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].hour, 7);
    }

    #[test]
    fn test_window_out_of_range() {
        let series = PriceSeries::fixed(30.0, 24);
        assert!(series.window(10, 24).is_none());
        assert!(series.window(10, 5).is_none());
    }

    #[test]
    fn test_get_and_window_past_a_gap() {
        // Hours after a gap still resolve by hour value, not position
        let series = series_with_hours(&[0, 1, 5, 6, 7]);
        assert_eq!(series.get(6).unwrap().hour, 6);
        assert!(series.get(3).is_none());

        let window = series.window(5, 7).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].hour, 5);
        // A bound inside the gap has no point to anchor on
        assert!(series.window(3, 7).is_none());
    }

    #[test]
    fn test_window_on_offset_series() {
        // A series that does not start at hour 0 still slices by hour value
        let series = series_with_hours(&[100, 101, 102, 103]);
        let window = series.window(101, 102).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].hour, 101);
        assert!(series.window(99, 101).is_none());
    }
}
