//! Sector pruning: keep at most one candidate per angular sector, anchored
//! on the great-circle bearing recomputed from the frontier's mean progress.

use log::{error, warn};

use crate::engine::error::RoutingError;
use crate::engine::frontier::FrontierState;
use crate::engine::geodesic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneOutcome {
    pub survivors: usize,
    pub dropped_sectors: usize,
}

/// Prunes the frontier to at most `prune_segments` candidates.
///
/// The symmetry bearing is found by projecting the mean distance traveled
/// along the reference great circle from the active start, then taking the
/// bearing from that point to the active destination; the sectors therefore
/// track sphere curvature instead of a fixed heading. Per sector the
/// candidate with the maximum cumulative distance survives, ties going to
/// the lowest column index. Sectors whose maximum is zero (fully
/// constrained) are dropped with no survivor.
pub fn prune_frontier(
    state: &mut FrontierState,
    prune_segments: usize,
    sector_half_deg: f64,
) -> Result<PruneOutcome, RoutingError> {
    if state.width() == 0 {
        return Ok(PruneOutcome {
            survivors: 0,
            dropped_sectors: prune_segments,
        });
    }

    let mean_dist =
        state.full_dist_traveled.iter().sum::<f64>() / state.full_dist_traveled.len() as f64;
    let anchor = geodesic::direct(&state.start_leg, state.gcr_azi_leg, mean_dist);
    let symmetry_azi = geodesic::inverse(&anchor, &state.finish_leg).azimuth_deg;

    let sector_width = 2.0 * sector_half_deg / prune_segments as f64;

    // per sector: (maximum metric, first column index reaching it)
    let mut best: Vec<Option<(f64, usize)>> = vec![None; prune_segments];
    for col in 0..state.width() {
        let delta = geodesic::wrap180(state.current_heading[col] - symmetry_azi);
        if delta < -sector_half_deg || delta > sector_half_deg {
            continue;
        }
        let sector =
            (((delta + sector_half_deg) / sector_width) as usize).min(prune_segments - 1);
        let metric = state.full_dist_traveled[col];
        match best[sector] {
            Some((max, _)) if metric <= max => {}
            _ => best[sector] = Some((metric, col)),
        }
    }

    let mut idxs: Vec<usize> = best
        .iter()
        .filter_map(|slot| match slot {
            Some((max, col)) if *max > 0.0 => Some(*col),
            _ => None,
        })
        .collect();
    idxs.sort_unstable();

    let survivors = idxs.len();
    if survivors == 0 {
        error!(
            "All pruning segments fully constrained for step {}!",
            state.count
        );
    } else if (survivors as f64) < prune_segments as f64 * 0.1 {
        warn!(
            "More than 90% of pruning segments constrained for step {}!",
            state.count
        );
    } else if (survivors as f64) < prune_segments as f64 * 0.5 {
        warn!(
            "More than 50% of pruning segments constrained for step {}!",
            state.count
        );
    }

    state.select_columns(&idxs)?;

    Ok(PruneOutcome {
        survivors,
        dropped_sectors: prune_segments - survivors,
    })
}
