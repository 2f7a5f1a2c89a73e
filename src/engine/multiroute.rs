//! Multi-route bookkeeping: when several routes to the same destination are
//! requested, candidates reaching it are grouped by their branch-point
//! origin and one finished representative is kept per group, while groups
//! that have not reached carry forward into the next step.

use std::collections::BTreeMap;

use crate::engine::frontier::FrontierState;

/// Grouping key: the candidate's previous-step position and heading,
/// rounded so that float noise does not split a branch point into several
/// groups. A `BTreeMap` keyed on this iterates groups deterministically.
fn origin_key(state: &FrontierState, col: usize) -> (i64, i64, i64) {
    let lat = state.lats_per_step.row(1)[col];
    let lon = state.lons_per_step.row(1)[col];
    let azi = state.azimuth_per_step.row(1)[col];
    (
        (lat * 1e6).round() as i64,
        (lon * 1e6).round() as i64,
        azi.map_or(i64::MIN, |a| (a * 1e6).round() as i64),
    )
}

/// Splits the frontier into finished representatives and carry-forward
/// columns.
///
/// Within each origin group holding at least one reaching candidate, only
/// the member with the minimum cumulative fuel finishes; the rest of that
/// group is dropped. Groups without a reaching member keep all their
/// members for the next step. Both result lists are in ascending column
/// order.
pub fn split_reaching_groups(
    state: &FrontierState,
    reaching: &[bool],
) -> (Vec<usize>, Vec<usize>) {
    let mut groups: BTreeMap<(i64, i64, i64), Vec<usize>> = BTreeMap::new();
    for col in 0..state.width() {
        groups.entry(origin_key(state, col)).or_default().push(col);
    }

    let mut finished = Vec::new();
    let mut carry = Vec::new();

    for members in groups.values() {
        let mut best: Option<usize> = None;
        for &col in members {
            if !reaching[col] {
                continue;
            }
            best = match best {
                Some(prev) if state.full_fuel_consumed[col] < state.full_fuel_consumed[prev] => {
                    Some(col)
                }
                Some(prev) => Some(prev),
                None => Some(col),
            };
        }
        match best {
            Some(col) => finished.push(col),
            None => carry.extend_from_slice(members),
        }
    }

    finished.sort_unstable();
    carry.sort_unstable();
    (finished, carry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::Coordinate;
    use chrono::Utc;

    /// Builds a 3-wide frontier two steps deep whose previous-step row holds
    /// two distinct branch points: column 0 alone, columns 1 and 2 together.
    fn two_origin_frontier() -> FrontierState {
        let mut state = FrontierState::new(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 10.0),
            Utc::now(),
        );
        state.expand_variants(2, 5.0);

        let now = Utc::now();
        for (lats, lons, azis) in [
            (
                vec![1.0, 2.0, 2.0],
                vec![1.0, 2.0, 2.0],
                vec![Some(10.0), Some(20.0), Some(20.0)],
            ),
            (
                vec![1.1, 2.1, 2.2],
                vec![1.1, 2.1, 2.2],
                vec![Some(11.0), Some(21.0), Some(22.0)],
            ),
        ] {
            state.lats_per_step.prepend(lats);
            state.lons_per_step.prepend(lons);
            state.azimuth_per_step.prepend(azis);
            state.dist_per_step.prepend(vec![100.0; 3]);
            state.starttime_per_step.prepend(vec![now; 3]);
            state.speed_per_step.prepend(vec![5.0; 3]);
            state.fuel_per_step.prepend(vec![1.0; 3]);
            state.rpm_per_step.prepend(vec![80.0; 3]);
            state.count += 1;
        }
        state.full_fuel_consumed = vec![5.0, 4.0, 3.0];
        state.full_dist_traveled = vec![200.0, 200.0, 200.0];
        state
    }

    #[test]
    fn test_reaching_groups_take_min_fuel_member() {
        let state = two_origin_frontier();
        let (finished, carry) = split_reaching_groups(&state, &[true, true, true]);
        // group {0} finishes with 0; group {1, 2} with the lower-fuel column 2
        assert_eq!(finished, vec![0, 2]);
        assert!(carry.is_empty());
    }

    #[test]
    fn test_non_reaching_groups_carry_all_members() {
        let state = two_origin_frontier();
        let (finished, carry) = split_reaching_groups(&state, &[false, true, false]);
        assert_eq!(finished, vec![1]);
        assert_eq!(carry, vec![0]);
    }

    #[test]
    fn test_no_reaching_candidates_carries_everything() {
        let state = two_origin_frontier();
        let (finished, carry) = split_reaching_groups(&state, &[false, false, false]);
        assert!(finished.is_empty());
        assert_eq!(carry, vec![0, 1, 2]);
    }

    #[test]
    fn test_one_representative_per_group() {
        let state = two_origin_frontier();
        let (finished, _) = split_reaching_groups(&state, &[true, true, true]);
        let mut keys: Vec<_> = finished.iter().map(|&c| origin_key(&state, c)).collect();
        keys.dedup();
        assert_eq!(keys.len(), finished.len());
    }
}
