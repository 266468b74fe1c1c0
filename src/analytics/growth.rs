use indexmap::IndexMap;

use crate::analytics::series::PartyPerformanceSeries;
use crate::analytics::types::{GrowthSeries, PartyGrowth};
use crate::model::Year;

/// Percentage change of each point relative to `series[baseline_index]`.
///
/// Points before the baseline are `None` (not applicable, drawn as a gap).
/// With a zero baseline a later point reads 100 when it is positive and 0
/// otherwise. A baseline index past the end leaves every point `None`.
pub fn percent_growth(series: &[f64], baseline_index: usize) -> Vec<Option<f64>> {
    let Some(&baseline) = series.get(baseline_index) else {
        return vec![None; series.len()];
    };

    series
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            if i < baseline_index {
                None
            } else if baseline == 0.0 {
                Some(if current > 0.0 { 100.0 } else { 0.0 })
            } else {
                Some((current - baseline) / baseline * 100.0)
            }
        })
        .collect()
}

/// Index of the first positive point, or 0 when there is none.
pub fn first_nonzero_index(series: &[f64]) -> usize {
    series.iter().position(|v| *v > 0.0).unwrap_or(0)
}

/// Seat series and growth for each of `parties` over the sorted years of `series`.
///
/// Each party's baseline is its first year with seats.
pub fn growth_by_party(series: &PartyPerformanceSeries, parties: &[String]) -> GrowthSeries {
    let years: Vec<Year> = series.years();

    let parties: IndexMap<String, PartyGrowth> = parties
        .iter()
        .map(|party| {
            let seats: Vec<u32> = years.iter().map(|y| series.seats_in(party, *y)).collect();
            let values: Vec<f64> = seats.iter().map(|s| *s as f64).collect();
            let baseline_index = first_nonzero_index(&values);
            let growth = percent_growth(&values, baseline_index);
            (
                party.clone(),
                PartyGrowth {
                    seats,
                    baseline_index,
                    growth,
                },
            )
        })
        .collect();

    GrowthSeries { years, parties }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_from_late_baseline() {
        assert_eq!(
            percent_growth(&[0.0, 0.0, 10.0, 20.0], 2),
            vec![None, None, Some(0.0), Some(100.0)]
        );
    }

    #[test]
    fn test_growth_from_first_point() {
        assert_eq!(percent_growth(&[5.0, 10.0], 0), vec![Some(0.0), Some(100.0)]);
    }

    #[test]
    fn test_growth_with_zero_baseline() {
        assert_eq!(
            percent_growth(&[0.0, 3.0, 0.0], 0),
            vec![Some(0.0), Some(100.0), Some(0.0)]
        );
    }

    #[test]
    fn test_growth_decline_is_negative() {
        assert_eq!(percent_growth(&[200.0, 50.0], 0), vec![Some(0.0), Some(-75.0)]);
    }

    #[test]
    fn test_growth_of_empty_or_out_of_range() {
        assert!(percent_growth(&[], 0).is_empty());
        assert_eq!(percent_growth(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn test_first_nonzero_index() {
        assert_eq!(first_nonzero_index(&[0.0, 0.0, 4.0]), 2);
        assert_eq!(first_nonzero_index(&[0.0, 0.0]), 0);
        assert_eq!(first_nonzero_index(&[]), 0);
    }

    #[test]
    fn test_growth_by_party_uses_first_year_with_seats() {
        let mut series = PartyPerformanceSeries::default();
        series.push("New", 2014, 0);
        series.push("New", 2019, 4);
        series.push("New", 2024, 8);
        series.push("Old", 2014, 100);
        series.push("Old", 2024, 50);

        let result = growth_by_party(&series, &["New".to_string(), "Old".to_string()]);
        assert_eq!(result.years, vec![2014, 2019, 2024]);
        assert_eq!(result.parties["New"].baseline_index, 1);
        assert_eq!(
            result.parties["New"].growth,
            vec![None, Some(0.0), Some(100.0)]
        );
        assert_eq!(result.parties["Old"].seats, vec![100, 0, 50]);
        assert_eq!(
            result.parties["Old"].growth,
            vec![Some(0.0), Some(-100.0), Some(-50.0)]
        );
    }
}
