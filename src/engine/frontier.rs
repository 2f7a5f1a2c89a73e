//! The frontier data model: a step-indexed, column-oriented table of live
//! candidate routes. Rows are prepended, so row 0 always describes the
//! newest positions; route extraction reverses a column back into
//! chronological order.

use chrono::{DateTime, Utc};

use crate::engine::error::RoutingError;
use crate::engine::geodesic;
use crate::engine::models::{Coordinate, RouteKind, RoutePoint, RouteResult};

/// A row-growing series with one column per live candidate. Row 0 is the
/// most recent step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSeries<T> {
    rows: Vec<Vec<T>>,
}

impl<T: Clone> StepSeries<T> {
    pub fn single(value: T) -> Self {
        Self {
            rows: vec![vec![value]],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// The most recent row.
    pub fn current(&self) -> &[T] {
        &self.rows[0]
    }

    /// A row by recency: 0 is the most recent step, 1 the one before.
    pub fn row(&self, idx: usize) -> &[T] {
        &self.rows[idx]
    }

    pub fn current_mut(&mut self) -> &mut [T] {
        &mut self.rows[0]
    }

    /// Prepends a new step row. The row must match the current column count.
    pub fn prepend(&mut self, row: Vec<T>) {
        debug_assert_eq!(row.len(), self.cols());
        self.rows.insert(0, row);
    }

    /// Repeats every column `factor` times in place, so each candidate's
    /// history prefix is inherited by its variants.
    pub fn repeat_columns(&mut self, factor: usize) {
        for row in &mut self.rows {
            let mut expanded = Vec::with_capacity(row.len() * factor);
            for value in row.iter() {
                for _ in 0..factor {
                    expanded.push(value.clone());
                }
            }
            *row = expanded;
        }
    }

    /// Keeps only the given columns, in the given order.
    pub fn select_columns(&mut self, idxs: &[usize]) -> Result<(), RoutingError> {
        let cols = self.cols();
        if idxs.iter().any(|&i| i >= cols) {
            return Err(RoutingError::PrunedIndicesOutOfBounds);
        }
        for row in &mut self.rows {
            *row = idxs.iter().map(|&i| row[i].clone()).collect();
        }
        Ok(())
    }

    /// One column in chronological order, oldest row first.
    pub fn column_chronological(&self, col: usize) -> Result<Vec<T>, RoutingError> {
        if col >= self.cols() {
            return Err(RoutingError::PrunedIndicesOutOfBounds);
        }
        Ok(self.rows.iter().rev().map(|row| row[col].clone()).collect())
    }
}

/// All live candidate routes plus the per-run bookkeeping.
///
/// Every `*_per_step` series shares the same shape: `count + 1` rows and one
/// column per live candidate. The column-only vectors hold the running
/// totals per candidate.
pub struct FrontierState {
    pub start: Coordinate,
    pub finish: Coordinate,
    /// Endpoints of the active leg; equal to `start`/`finish` unless
    /// intermediate waypoints are in effect.
    pub start_leg: Coordinate,
    pub finish_leg: Coordinate,
    /// Reference great-circle azimuth from the active start to the active
    /// destination, anchoring branching and pruning symmetry.
    pub gcr_azi_leg: f64,
    /// Step counter.
    pub count: usize,
    pub departure_time: DateTime<Utc>,

    pub lats_per_step: StepSeries<f64>,
    pub lons_per_step: StepSeries<f64>,
    /// Heading sailed during the step arriving at the row's position;
    /// `None` in the departure row.
    pub azimuth_per_step: StepSeries<Option<f64>>,
    pub dist_per_step: StepSeries<f64>,
    pub starttime_per_step: StepSeries<DateTime<Utc>>,
    pub speed_per_step: StepSeries<f64>,
    pub fuel_per_step: StepSeries<f64>,
    pub rpm_per_step: StepSeries<f64>,

    /// Heading each candidate is currently committed to.
    pub current_heading: Vec<f64>,
    pub full_dist_traveled: Vec<f64>,
    pub full_time_traveled: Vec<f64>,
    pub full_fuel_consumed: Vec<f64>,
    /// Current simulation time per candidate.
    pub time: Vec<DateTime<Utc>>,
}

impl FrontierState {
    pub fn new(start: Coordinate, finish: Coordinate, departure_time: DateTime<Utc>) -> Self {
        let gcr = geodesic::inverse(&start, &finish);
        Self {
            start,
            finish,
            start_leg: start,
            finish_leg: finish,
            gcr_azi_leg: gcr.azimuth_deg,
            count: 0,
            departure_time,
            lats_per_step: StepSeries::single(start.lat),
            lons_per_step: StepSeries::single(start.lon),
            azimuth_per_step: StepSeries::single(None),
            dist_per_step: StepSeries::single(0.0),
            starttime_per_step: StepSeries::single(departure_time),
            speed_per_step: StepSeries::single(0.0),
            fuel_per_step: StepSeries::single(0.0),
            rpm_per_step: StepSeries::single(0.0),
            current_heading: vec![gcr.azimuth_deg],
            full_dist_traveled: vec![0.0],
            full_time_traveled: vec![0.0],
            full_fuel_consumed: vec![0.0],
            time: vec![departure_time],
        }
    }

    /// Number of live candidates.
    pub fn width(&self) -> usize {
        self.current_heading.len()
    }

    /// Current position of one candidate.
    pub fn position(&self, col: usize) -> Coordinate {
        Coordinate::new(
            self.lats_per_step.current()[col],
            self.lons_per_step.current()[col],
        )
    }

    /// True when all series share the expected shape: `count + 1` rows and
    /// one common column count matching the per-candidate vectors.
    pub fn is_consistent(&self) -> bool {
        let rows = self.count + 1;
        let cols = self.width();
        let series_ok = |r: usize, c: usize| r == rows && c == cols;
        series_ok(self.lats_per_step.rows(), self.lats_per_step.cols())
            && series_ok(self.lons_per_step.rows(), self.lons_per_step.cols())
            && series_ok(self.azimuth_per_step.rows(), self.azimuth_per_step.cols())
            && series_ok(self.dist_per_step.rows(), self.dist_per_step.cols())
            && series_ok(
                self.starttime_per_step.rows(),
                self.starttime_per_step.cols(),
            )
            && series_ok(self.speed_per_step.rows(), self.speed_per_step.cols())
            && series_ok(self.fuel_per_step.rows(), self.fuel_per_step.cols())
            && series_ok(self.rpm_per_step.rows(), self.rpm_per_step.cols())
            && self.full_dist_traveled.len() == cols
            && self.full_time_traveled.len() == cols
            && self.full_fuel_consumed.len() == cols
            && self.time.len() == cols
    }

    /// Branches every candidate into `segments + 1` heading variants spread
    /// around the bearing from its current position to the active
    /// destination. The bearing is recomputed every step so branching
    /// re-centers as the great circle curves.
    pub fn expand_variants(&mut self, segments: usize, increment_deg: f64) {
        let factor = segments + 1;
        let fan_half_deg = segments as f64 / 2.0 * increment_deg;

        let bearings: Vec<f64> = (0..self.width())
            .map(|col| geodesic::inverse(&self.position(col), &self.finish_leg).azimuth_deg)
            .collect();

        self.lats_per_step.repeat_columns(factor);
        self.lons_per_step.repeat_columns(factor);
        self.azimuth_per_step.repeat_columns(factor);
        self.dist_per_step.repeat_columns(factor);
        self.starttime_per_step.repeat_columns(factor);
        self.speed_per_step.repeat_columns(factor);
        self.fuel_per_step.repeat_columns(factor);
        self.rpm_per_step.repeat_columns(factor);

        repeat_values(&mut self.full_dist_traveled, factor);
        repeat_values(&mut self.full_time_traveled, factor);
        repeat_values(&mut self.full_fuel_consumed, factor);
        repeat_values(&mut self.time, factor);

        let mut headings = Vec::with_capacity(bearings.len() * factor);
        for bearing in bearings {
            for j in 0..factor {
                let offset = -fan_half_deg + j as f64 * increment_deg;
                headings.push(geodesic::wrap360(bearing - offset));
            }
        }
        self.current_heading = headings;

        debug_assert!(self.is_consistent());
    }

    /// Keeps only the given candidate columns, in the given order.
    pub fn select_columns(&mut self, idxs: &[usize]) -> Result<(), RoutingError> {
        let cols = self.width();
        if idxs.iter().any(|&i| i >= cols) {
            return Err(RoutingError::PrunedIndicesOutOfBounds);
        }

        self.lats_per_step.select_columns(idxs)?;
        self.lons_per_step.select_columns(idxs)?;
        self.azimuth_per_step.select_columns(idxs)?;
        self.dist_per_step.select_columns(idxs)?;
        self.starttime_per_step.select_columns(idxs)?;
        self.speed_per_step.select_columns(idxs)?;
        self.fuel_per_step.select_columns(idxs)?;
        self.rpm_per_step.select_columns(idxs)?;

        self.current_heading = idxs.iter().map(|&i| self.current_heading[i]).collect();
        self.full_dist_traveled = idxs.iter().map(|&i| self.full_dist_traveled[i]).collect();
        self.full_time_traveled = idxs.iter().map(|&i| self.full_time_traveled[i]).collect();
        self.full_fuel_consumed = idxs.iter().map(|&i| self.full_fuel_consumed[i]).collect();
        self.time = idxs.iter().map(|&i| self.time[i]).collect();
        Ok(())
    }

    /// Moves every surviving candidate exactly onto `coord`. Applied at
    /// intermediate waypoints so the next leg departs from the waypoint
    /// itself.
    pub fn snap_current_position(&mut self, coord: Coordinate) {
        for lat in self.lats_per_step.current_mut() {
            *lat = coord.lat;
        }
        for lon in self.lons_per_step.current_mut() {
            *lon = coord.lon;
        }
    }

    /// Re-targets the frontier at the next leg of the route and recomputes
    /// the reference azimuth. Histories stay in place; the new leg's first
    /// row follows directly from the previous leg's last row.
    pub fn start_new_leg(&mut self, start: Coordinate, finish: Coordinate) {
        self.start_leg = start;
        self.finish_leg = finish;
        self.gcr_azi_leg = geodesic::inverse(&start, &finish).azimuth_deg;
    }

    /// Rebuilds one candidate's column into a chronological route.
    pub fn extract_route(&self, col: usize, kind: RouteKind) -> Result<RouteResult, RoutingError> {
        let lats = self.lats_per_step.column_chronological(col)?;
        let lons = self.lons_per_step.column_chronological(col)?;
        let azimuths = self.azimuth_per_step.column_chronological(col)?;
        let dists = self.dist_per_step.column_chronological(col)?;
        let times = self.starttime_per_step.column_chronological(col)?;
        let speeds = self.speed_per_step.column_chronological(col)?;
        let fuels = self.fuel_per_step.column_chronological(col)?;
        let rpms = self.rpm_per_step.column_chronological(col)?;

        let points = (0..lats.len())
            .map(|i| RoutePoint {
                lat: lats[i],
                lon: lons[i],
                heading_deg: azimuths[i],
                distance_m: dists[i],
                speed_ms: speeds[i],
                fuel_kg: fuels[i],
                rpm: rpms[i],
                time: times[i],
                elapsed_s: (times[i] - self.departure_time).num_milliseconds() as f64 / 1000.0,
            })
            .collect();

        Ok(RouteResult {
            kind,
            start: self.start,
            finish: self.finish,
            points,
            total_distance_m: self.full_dist_traveled[col],
            total_time_s: self.full_time_traveled[col],
            total_fuel_kg: self.full_fuel_consumed[col],
        })
    }
}

fn repeat_values<T: Clone>(values: &mut Vec<T>, factor: usize) {
    let mut expanded = Vec::with_capacity(values.len() * factor);
    for value in values.iter() {
        for _ in 0..factor {
            expanded.push(value.clone());
        }
    }
    *values = expanded;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier() -> FrontierState {
        FrontierState::new(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 10.0),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_frontier_is_consistent() {
        let state = frontier();
        assert_eq!(state.width(), 1);
        assert!(state.is_consistent());
        assert!((state.gcr_azi_leg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_expansion_multiplies_columns() {
        let mut state = frontier();
        state.expand_variants(4, 3.0);
        // 2k+1 with k=2
        assert_eq!(state.width(), 5);
        assert!(state.is_consistent());

        // headings centered on the bearing to the destination (due east)
        assert!((state.current_heading[2] - 90.0).abs() < 1e-9);
        assert!((state.current_heading[0] - 96.0).abs() < 1e-9);
        assert!((state.current_heading[4] - 84.0).abs() < 1e-9);

        state.expand_variants(4, 3.0);
        assert_eq!(state.width(), 25);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_children_inherit_history_prefix() {
        let mut state = frontier();
        state.expand_variants(2, 5.0);
        for col in 0..state.width() {
            assert_eq!(state.lats_per_step.current()[col], 0.0);
            assert_eq!(state.full_dist_traveled[col], 0.0);
        }
    }

    #[test]
    fn test_select_columns_reorders() {
        let mut state = frontier();
        state.expand_variants(4, 3.0);
        state.full_dist_traveled = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        state.select_columns(&[4, 1]).expect("select");
        assert_eq!(state.width(), 2);
        assert_eq!(state.full_dist_traveled, vec![5.0, 2.0]);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_select_out_of_bounds_is_fatal() {
        let mut state = frontier();
        let err = state.select_columns(&[3]).unwrap_err();
        assert!(matches!(err, RoutingError::PrunedIndicesOutOfBounds));
    }

    #[test]
    fn test_extract_route_zero_steps_is_departure_only() {
        let state = frontier();
        let route = state.extract_route(0, RouteKind::MinimalTime).expect("route");
        assert_eq!(route.points.len(), 1);
        let departure = &route.points[0];
        assert_eq!(departure.lat, 0.0);
        assert_eq!(departure.lon, 0.0);
        assert_eq!(departure.heading_deg, None);
        assert_eq!(departure.distance_m, 0.0);
        assert_eq!(departure.elapsed_s, 0.0);
        assert_eq!(route.total_distance_m, 0.0);
    }

    #[test]
    fn test_step_series_prepend_and_chronological_column() {
        let mut series = StepSeries::single(1.0);
        series.repeat_columns(2);
        series.prepend(vec![2.0, 3.0]);
        assert_eq!(series.rows(), 2);
        assert_eq!(series.current(), &[2.0, 3.0]);
        // oldest first
        assert_eq!(series.column_chronological(1).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_snap_current_position() {
        let mut state = frontier();
        state.expand_variants(2, 5.0);
        state.snap_current_position(Coordinate::new(1.5, 2.5));
        for col in 0..state.width() {
            assert_eq!(state.position(col), Coordinate::new(1.5, 2.5));
        }
    }

    #[test]
    fn test_start_new_leg_recomputes_reference_azimuth() {
        let mut state = frontier();
        let wp = Coordinate::new(0.0, 5.0);
        state.start_new_leg(wp, Coordinate::new(5.0, 5.0));
        assert_eq!(state.start_leg, wp);
        // next leg runs due north
        assert!((state.gcr_azi_leg - 0.0).abs() < 1e-9);
    }
}
