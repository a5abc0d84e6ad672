//! Compound annual growth rate over a monthly value series.
//!
//! Leading zeros mean "no data yet" and are skipped. The observation window is
//! then shortened from the front so that it covers a whole number of years,
//! which drops at most eleven extra months.

const MONTHS_PER_YEAR: usize = 12;

/// Growth of a monthly series over its aligned observation window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Growth {
    /// Compound annual growth rate, in percent
    pub rate: f64,
    /// Length of the observation window, in years
    pub years: f64,
}

/// Computes the compound annual growth rate and the elapsed years of `values`.
///
/// An all-zero series divides by zero and yields NaN. This is left unguarded
/// so callers decide what to do with such records. A series with less than
/// one whole year of data after the leading zeros (including an empty slice)
/// has no window at all and yields NaN over zero years.
pub fn growth_rate(values: &[f64]) -> Growth {
    const NO_WINDOW: Growth = Growth {
        rate: f64::NAN,
        years: 0.0,
    };

    let Some(&last) = values.last() else {
        return NO_WINDOW;
    };

    let mut start = values.iter().position(|&v| v != 0.0).unwrap_or(0);
    let months = values.len() - start;
    start += months % MONTHS_PER_YEAR;
    if start >= values.len() {
        return NO_WINDOW;
    }

    let years = (values.len() - start) as f64 / MONTHS_PER_YEAR as f64;
    let rate = ((last / values[start]).powf(1.0 / years) - 1.0) * 100.0;

    Growth { rate, years }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_zero_padded_series_aligns_to_whole_years() {
        // 2 leading zeros, then 22 months of data: 22 % 12 = 10 months are
        // dropped so the window starts at index 12 and spans one year.
        let mut values = vec![0.0, 0.0];
        values.extend((0..22).map(|i| 100.0 + i as f64));
        assert_eq!(values.len(), 24);

        let growth = growth_rate(&values);
        let expected = ((values[23] / values[12]).powf(1.0) - 1.0) * 100.0;
        assert!((growth.years - 1.0).abs() < TOLERANCE);
        assert!((growth.rate - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_two_whole_years() {
        let mut values = vec![100.0; 24];
        values.push(121.0);
        // 25 months: one month dropped, window is 24 months from index 1.
        let growth = growth_rate(&values);
        assert!((growth.years - 2.0).abs() < TOLERANCE);
        assert!((growth.rate - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_known_value_with_leading_zeros() {
        let mut values = vec![0.0; 12];
        values.extend(std::iter::repeat(100.0).take(12));
        values.extend(std::iter::repeat(110.0).take(11));
        values.push(121.0);
        // First non-zero at 12, 24 months remain, window is exactly 2 years.
        let growth = growth_rate(&values);
        let expected = ((121.0_f64 / 100.0).powf(1.0 / 2.0) - 1.0) * 100.0;
        assert!((growth.years - 2.0).abs() < TOLERANCE);
        assert!((growth.rate - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_less_than_a_year_has_no_window() {
        let growth = growth_rate(&[100.0, 110.0, 121.0, 130.0, 140.0]);
        assert!(growth.rate.is_nan());
        assert_eq!(growth.years, 0.0);

        let mut values = vec![0.0; 12];
        values.push(5.0);
        assert!(growth_rate(&values).rate.is_nan());
    }

    #[test]
    fn test_exactly_one_year() {
        let mut values = vec![200.0; 11];
        values.push(220.0);
        let growth = growth_rate(&values);
        assert!((growth.years - 1.0).abs() < TOLERANCE);
        assert!((growth.rate - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_zero_series_is_not_finite() {
        let growth = growth_rate(&[0.0; 24]);
        assert!(!growth.rate.is_finite());
        assert!((growth.years - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_empty_series() {
        let growth = growth_rate(&[]);
        assert!(growth.rate.is_nan());
        assert_eq!(growth.years, 0.0);
    }
}
