use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::model::ConstituencyResult;

/// The `n` entries with the largest values, largest first.
///
/// Ties keep the input order (the sort is stable), so with an insertion-ordered
/// map the earlier key wins. Incomparable values (NaN) are treated as equal.
pub fn top_n_by_value<K, V, I>(entries: I, n: usize) -> Vec<(K, V)>
where
    I: IntoIterator<Item = (K, V)>,
    V: PartialOrd,
{
    let mut ranked: Vec<(K, V)> = entries.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    ranked
}

/// Every entry, ranked as in [`top_n_by_value`].
pub fn rank_by_value<K, V, I>(entries: I) -> Vec<(K, V)>
where
    I: IntoIterator<Item = (K, V)>,
    V: PartialOrd,
{
    top_n_by_value(entries, usize::MAX)
}

/// The party with the most seats; the first listed party wins a tie.
pub fn leading_party(party_seats: &IndexMap<String, u32>) -> Option<(String, u32)> {
    top_n_by_value(party_seats.iter(), 1)
        .into_iter()
        .next()
        .map(|(party, seats)| (party.clone(), *seats))
}

/// The `n` constituencies won by the widest margin. Records without a margin are skipped.
pub fn top_by_margin(constituencies: &[ConstituencyResult], n: usize) -> Vec<&ConstituencyResult> {
    top_by_key(constituencies, n, |c| c.margin_percent)
}

/// The `n` constituencies with the highest turnout. Records without a turnout are skipped.
pub fn top_by_turnout(constituencies: &[ConstituencyResult], n: usize) -> Vec<&ConstituencyResult> {
    top_by_key(constituencies, n, |c| c.turnout)
}

fn top_by_key<F>(constituencies: &[ConstituencyResult], n: usize, key: F) -> Vec<&ConstituencyResult>
where
    F: Fn(&ConstituencyResult) -> Option<f64>,
{
    let keyed = constituencies
        .iter()
        .filter_map(|c| key(c).filter(|v| v.is_finite()).map(|v| (c, v)));
    top_n_by_value(keyed, n).into_iter().map(|(c, _)| c).collect()
}

/// Orders names by their summed series, largest first.
///
/// Falls back to alphabetical order of `names` when no series is available,
/// which is how party pickers behave before trend data has loaded.
pub fn rank_names_by_total(names: &[String], series: &IndexMap<String, Vec<u32>>) -> Vec<String> {
    let totals: Vec<(&String, u32)> = names
        .iter()
        .filter_map(|name| series.get(name).map(|s| (name, s.iter().sum::<u32>())))
        .collect();

    if totals.is_empty() {
        let mut sorted = names.to_vec();
        sorted.sort();
        return sorted;
    }

    rank_by_value(totals)
        .into_iter()
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(entries: &[(&str, u32)]) -> IndexMap<String, u32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_top_n_orders_descending() {
        let input = seats(&[("A", 10), ("B", 30), ("C", 20)]);
        let top = top_n_by_value(input.iter().map(|(k, v)| (k.as_str(), *v)), 2);
        assert_eq!(top, vec![("B", 30), ("C", 20)]);
    }

    #[test]
    fn test_top_n_ties_keep_insertion_order() {
        let input = seats(&[("Z", 5), ("A", 7), ("M", 5), ("B", 7)]);
        let top = top_n_by_value(input.iter().map(|(k, v)| (k.as_str(), *v)), 4);
        assert_eq!(top, vec![("A", 7), ("B", 7), ("Z", 5), ("M", 5)]);
    }

    #[test]
    fn test_top_n_of_empty_input() {
        let top: Vec<(&str, u32)> = top_n_by_value(Vec::new(), 3);
        assert!(top.is_empty());
        let top = top_n_by_value(vec![("A", 1)], 0);
        assert!(top.is_empty());
    }

    #[test]
    fn test_top_n_sum_never_exceeds_input() {
        let input = seats(&[("A", 4), ("B", 9), ("C", 1), ("D", 9), ("E", 0)]);
        let total: u32 = input.values().sum();
        for n in 0..8 {
            let top = top_n_by_value(input.iter().map(|(k, v)| (k.clone(), *v)), n);
            let top_total: u32 = top.iter().map(|(_, v)| v).sum();
            assert!(top_total <= total);
            if n >= input.len() {
                assert_eq!(top_total, total);
            }
        }
    }

    #[test]
    fn test_top_n_is_idempotent() {
        let input = seats(&[("A", 3), ("B", 3), ("C", 8)]);
        let first = top_n_by_value(input.iter(), 2);
        let second = top_n_by_value(input.iter(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_leading_party() {
        let input = seats(&[("P", 240), ("Q", 99), ("R", 240)]);
        assert_eq!(leading_party(&input), Some(("P".to_string(), 240)));
        assert_eq!(leading_party(&IndexMap::new()), None);
    }

    #[test]
    fn test_top_by_margin_skips_missing() {
        let rows = vec![
            ConstituencyResult {
                constituency: Some("A".into()),
                margin_percent: Some(3.0),
                ..Default::default()
            },
            ConstituencyResult {
                constituency: Some("B".into()),
                ..Default::default()
            },
            ConstituencyResult {
                constituency: Some("C".into()),
                margin_percent: Some(40.0),
                ..Default::default()
            },
        ];
        let top: Vec<_> = top_by_margin(&rows, 10)
            .into_iter()
            .filter_map(|c| c.constituency.as_deref())
            .collect();
        assert_eq!(top, vec!["C", "A"]);
    }

    #[test]
    fn test_top_by_turnout_ignores_nan() {
        let rows = vec![
            ConstituencyResult {
                constituency: Some("A".into()),
                turnout: Some(f64::NAN),
                ..Default::default()
            },
            ConstituencyResult {
                constituency: Some("B".into()),
                turnout: Some(71.2),
                ..Default::default()
            },
        ];
        let top = top_by_turnout(&rows, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].constituency.as_deref(), Some("B"));
    }

    #[test]
    fn test_rank_names_by_total() {
        let names = vec!["Q".to_string(), "P".to_string(), "R".to_string()];
        let mut trends = IndexMap::new();
        trends.insert("P".to_string(), vec![10, 20]);
        trends.insert("Q".to_string(), vec![50, 1]);
        assert_eq!(rank_names_by_total(&names, &trends), vec!["Q", "P"]);
        assert_eq!(
            rank_names_by_total(&names, &IndexMap::new()),
            vec!["P", "Q", "R"]
        );
    }
}
