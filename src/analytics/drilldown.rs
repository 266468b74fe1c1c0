use indexmap::IndexMap;

use crate::analytics::rank::top_n_by_value;
use crate::analytics::types::{ElectionHistory, StatePartySeries, WonSeatRow};
use crate::model::{
    ConstituencyHistory, ConstituencyResult, ElectionYearResult, PartyProfile, StatePartyTrends, Year,
};

/// Results of one constituency in year order. Results without a year are dropped.
pub fn constituency_timeline(history: &ConstituencyHistory) -> Vec<ConstituencyResult> {
    let mut timeline: Vec<ConstituencyResult> = history
        .results
        .iter()
        .filter(|r| r.year.is_some())
        .cloned()
        .collect();
    timeline.sort_by_key(|r| r.year);
    timeline
}

/// Winning party per year of a [`constituency_timeline`].
///
/// Parties appear in the order they first won. A year without a party has no winner series set.
pub fn election_history(timeline: &[ConstituencyResult]) -> ElectionHistory {
    let dated: Vec<&ConstituencyResult> = timeline.iter().filter(|r| r.year.is_some()).collect();
    let years: Vec<Year> = dated.iter().filter_map(|r| r.year).collect();
    let mut winners: IndexMap<String, Vec<u32>> = IndexMap::new();
    for (i, result) in dated.iter().enumerate() {
        if let Some(party) = &result.party {
            winners.entry(party.clone()).or_insert_with(|| vec![0; years.len()])[i] = 1;
        }
    }
    ElectionHistory { years, winners }
}

/// Every constituency a party won: latest year first, names alphabetical within a year.
pub fn won_constituencies(profile: &PartyProfile) -> Vec<WonSeatRow> {
    let mut rows: Vec<WonSeatRow> = profile
        .performance
        .iter()
        .filter_map(|p| p.year.map(|year| (year, p)))
        .flat_map(|(year, p)| {
            p.constituencies.iter().filter_map(move |seat| {
                Some(WonSeatRow {
                    year,
                    name: seat.name.clone()?,
                    winner: seat.winner.clone(),
                    margin_percent: seat.margin_percent,
                })
            })
        })
        .collect();
    rows.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// `constituency → state` for every constituency of one election.
pub fn constituency_states(result: &ElectionYearResult) -> IndexMap<String, String> {
    result
        .constituencies
        .iter()
        .filter_map(|c| Some((c.constituency.clone()?, c.state.clone()?)))
        .collect()
}

/// The `n` states where a party won most seats in its latest election.
///
/// A seat's own state is used when present, otherwise it is looked up in
/// `states`; seats with no known state are not counted. `None` when no
/// performance entry has a year.
pub fn latest_won_by_state(
    profile: &PartyProfile,
    states: &IndexMap<String, String>,
    n: usize,
) -> Option<(Year, Vec<(String, u32)>)> {
    let latest = profile
        .performance
        .iter()
        .filter(|p| p.year.is_some())
        .max_by_key(|p| p.year)?;

    let mut counts: IndexMap<String, u32> = IndexMap::new();
    for seat in &latest.constituencies {
        let state = seat
            .state
            .as_ref()
            .or_else(|| seat.name.as_ref().and_then(|name| states.get(name)));
        if let Some(state) = state {
            *counts.entry(state.clone()).or_default() += 1;
        }
    }
    Some((latest.year?, top_n_by_value(counts, n)))
}

/// Seat and vote-share series in year order, each padded or cut to the number of years.
///
/// Missing seats count as 0; a missing vote share stays a gap.
pub fn state_party_series(trends: &StatePartyTrends) -> StatePartySeries {
    let mut order: Vec<usize> = (0..trends.years.len()).collect();
    order.sort_by_key(|&i| trends.years[i]);

    let seats = trends
        .seat_trends
        .iter()
        .map(|(party, series)| {
            let aligned = order.iter().map(|&i| series.get(i).copied().unwrap_or(0)).collect();
            (party.clone(), aligned)
        })
        .collect();
    let vote_share = trends
        .vote_share_trends
        .iter()
        .map(|(party, series)| {
            let aligned = order.iter().map(|&i| series.get(i).copied().flatten()).collect();
            (party.clone(), aligned)
        })
        .collect();

    StatePartySeries {
        years: order.iter().map(|&i| trends.years[i]).collect(),
        seats,
        vote_share,
    }
}
