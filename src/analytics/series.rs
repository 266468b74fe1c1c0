use indexmap::IndexMap;

use crate::analytics::rank::top_n_by_value;
use crate::analytics::types::SeatMatrixRow;
use crate::model::{ElectionYearResult, PartyComparison, Year, YearComparison};

/// Seats won by each party over time: `party → [(year, seats)]`, each list sorted by year.
///
/// Built fresh from fetched data for every render; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartyPerformanceSeries {
    series: IndexMap<String, Vec<(Year, u32)>>,
}

impl PartyPerformanceSeries {
    /// Builds the series from per-year snapshots. Snapshots without a year are skipped.
    pub fn from_results(results: &[ElectionYearResult]) -> Self {
        let mut dated: Vec<(Year, &ElectionYearResult)> = results
            .iter()
            .filter_map(|r| r.year.map(|y| (y, r)))
            .collect();
        dated.sort_by_key(|(year, _)| *year);

        let mut s = Self::default();
        for (year, result) in dated {
            for (party, seats) in &result.party_seats {
                s.push(party, year, *seats);
            }
        }
        s
    }

    /// Builds the series from a `/compare/years` response. Points missing a year or seat count are skipped.
    pub fn from_comparison(comparison: &YearComparison) -> Self {
        let mut s = Self::default();
        for (party, points) in &comparison.party_performance {
            s.series.entry(party.clone()).or_default();
            for point in points {
                if let (Some(year), Some(seats)) = (point.year, point.seats) {
                    s.push(party, year, seats);
                }
            }
        }
        s
    }

    /// Builds the series from a `/compare/parties` response. Years without a year field are skipped.
    pub fn from_party_comparison(comparison: &PartyComparison) -> Self {
        let mut s = Self::default();
        for party in &comparison.parties {
            s.series.entry(party.clone()).or_default();
        }
        for row in &comparison.data {
            let Some(year) = row.year else {
                continue;
            };
            for (party, seats) in &row.party_seats {
                s.push(party, year, *seats);
            }
        }
        s
    }

    /// Records `seats` for `party` in `year`, replacing an earlier value for that year.
    pub fn push(&mut self, party: &str, year: Year, seats: u32) {
        let points = self.series.entry(party.to_string()).or_default();
        match points.binary_search_by_key(&year, |(y, _)| *y) {
            Ok(idx) => points[idx].1 = seats,
            Err(idx) => points.insert(idx, (year, seats)),
        }
    }

    /// Seats for `party` in `year`; 0 when the party has no result that year.
    pub fn seats_in(&self, party: &str, year: Year) -> u32 {
        self.series
            .get(party)
            .and_then(|points| {
                points
                    .binary_search_by_key(&year, |(y, _)| *y)
                    .ok()
                    .map(|idx| points[idx].1)
            })
            .unwrap_or(0)
    }

    pub fn points(&self, party: &str) -> &[(Year, u32)] {
        self.series.get(party).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parties(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Distinct years across all parties, ascending.
    pub fn years(&self) -> Vec<Year> {
        let mut years: Vec<Year> = self
            .series
            .values()
            .flat_map(|points| points.iter().map(|(y, _)| *y))
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Total seats per party across all years, in party insertion order.
    pub fn totals(&self) -> IndexMap<String, u32> {
        self.series
            .iter()
            .map(|(party, points)| (party.clone(), points.iter().map(|(_, s)| s).sum()))
            .collect()
    }

    /// The `n` parties with the most seats summed over all years.
    pub fn top_parties(&self, n: usize) -> Vec<String> {
        top_n_by_value(self.totals(), n)
            .into_iter()
            .map(|(party, _)| party)
            .collect()
    }

    /// `party → seats` for a single year, only parties with a result that year.
    pub fn snapshot(&self, year: Year) -> IndexMap<String, u32> {
        self.series
            .iter()
            .filter_map(|(party, points)| {
                points
                    .binary_search_by_key(&year, |(y, _)| *y)
                    .ok()
                    .map(|idx| (party.clone(), points[idx].1))
            })
            .collect()
    }
}

/// One row per party with seats for each of `years` (0 when absent) and the
/// change from the first to the last year. Change is `None` with fewer than two years.
pub fn seat_matrix(
    series: &PartyPerformanceSeries,
    years: &[Year],
    parties: &[String],
) -> Vec<SeatMatrixRow> {
    parties
        .iter()
        .map(|party| {
            let seats: Vec<u32> = years.iter().map(|y| series.seats_in(party, *y)).collect();
            let change = match (seats.first(), seats.last()) {
                (Some(first), Some(last)) if seats.len() >= 2 => Some(*last as i64 - *first as i64),
                _ => None,
            };
            let total = seats.iter().sum();
            SeatMatrixRow {
                party: party.clone(),
                seats,
                total,
                change,
            }
        })
        .collect()
}
