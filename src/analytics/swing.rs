use indexmap::IndexMap;

use crate::analytics::series::PartyPerformanceSeries;
use crate::analytics::types::SwingSeries;
use crate::model::Year;

/// Seat change per party from `before` to `after`.
///
/// A party missing from one side counts as 0 there. Keys of `before` come
/// first, in order, followed by parties that only appear in `after`.
pub fn seat_swing(
    before: &IndexMap<String, u32>,
    after: &IndexMap<String, u32>,
) -> IndexMap<String, i64> {
    let mut swing: IndexMap<String, i64> = IndexMap::with_capacity(before.len() + after.len());

    for (party, seats) in before {
        let now = after.get(party).copied().unwrap_or(0);
        swing.insert(party.clone(), now as i64 - *seats as i64);
    }
    for (party, seats) in after {
        if !before.contains_key(party) {
            swing.insert(party.clone(), *seats as i64);
        }
    }

    swing
}

/// Swings between each pair of consecutive `years` for the given parties.
///
/// `years` are sorted first; fewer than two years yield no labels and empty series.
pub fn consecutive_swings(
    series: &PartyPerformanceSeries,
    years: &[Year],
    parties: &[String],
) -> SwingSeries {
    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();

    let labels: Vec<String> = years
        .windows(2)
        .map(|pair| format!("{} to {}", pair[0], pair[1]))
        .collect();

    let swings = parties
        .iter()
        .map(|party| {
            let deltas = years
                .windows(2)
                .map(|pair| {
                    series.seats_in(party, pair[1]) as i64 - series.seats_in(party, pair[0]) as i64
                })
                .collect();
            (party.clone(), deltas)
        })
        .collect();

    SwingSeries { labels, swings }
}
