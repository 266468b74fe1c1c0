use crate::analytics::rank::{leading_party, top_n_by_value};
use crate::analytics::types::{SeatShare, YearSummary};
use crate::analytics::utility::{average_excluding_nulls, pct};
use crate::model::{ConstituencyTypeBreakdown, ElectionYearResult, PartyProfile};

/// Headline numbers for one election year.
///
/// When the backend omits `avg_turnout`, the mean of the constituency turnouts is used.
pub fn year_summary(result: &ElectionYearResult) -> YearSummary {
    let leader = leading_party(&result.party_seats);
    let avg_turnout = result.avg_turnout.or_else(|| {
        let turnouts: Vec<Option<f64>> = result.constituencies.iter().map(|c| c.turnout).collect();
        average_excluding_nulls(&turnouts)
    });

    YearSummary {
        year: result.year,
        total_constituencies: result.constituencies.len(),
        leading_party: leader.as_ref().map(|(party, _)| party.clone()),
        leading_seats: leader.map(|(_, seats)| seats).unwrap_or(0),
        avg_turnout,
    }
}

/// The `n` parties with the most seats in constituencies of `kind`, summed over all years.
pub fn top_parties_by_type(
    breakdown: &ConstituencyTypeBreakdown,
    kind: &str,
    n: usize,
) -> Vec<(String, u32)> {
    let Some(stats) = breakdown.data.get(kind) else {
        return Vec::new();
    };
    let totals = stats
        .party_performance
        .iter()
        .map(|(party, seats)| (party.clone(), seats.iter().sum::<u32>()));
    top_n_by_value(totals, n)
}

/// Seats won against seats contested, sorted by year. Years without a year field are skipped.
///
/// A missing `percentage` is derived from the two counts.
pub fn seat_share_series(profile: &PartyProfile) -> Vec<SeatShare> {
    let mut shares: Vec<SeatShare> = profile
        .performance
        .iter()
        .filter_map(|p| {
            let year = p.year?;
            let seats_won = p.seats_won.unwrap_or(0);
            let total_seats = p.total_seats.unwrap_or(0);
            Some(SeatShare {
                year,
                seats_won,
                total_seats,
                percentage: p.percentage.unwrap_or_else(|| pct(seats_won, total_seats)),
            })
        })
        .collect();
    shares.sort_by_key(|s| s.year);
    shares
}
