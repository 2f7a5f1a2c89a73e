//! Safety constraints. Negative constraints reject points or transitions
//! (land, waves, shallow water); positive constraints are required
//! intermediate waypoints consumed one leg at a time.

use chrono::{DateTime, Utc};
use log::debug;

use crate::engine::mask::LandMask;
use crate::engine::models::Coordinate;
use crate::engine::weather::ScalarField;

/// A negative constraint: rejects unsafe points.
pub trait RouteConstraint {
    fn name(&self) -> &'static str;

    /// True if the point is unsafe at the given time.
    fn is_constrained(&self, lat: f64, lon: f64, time: DateTime<Utc>) -> bool;
}

/// Rejects points over land.
pub struct LandCrossing {
    mask: LandMask,
}

impl LandCrossing {
    pub fn new(mask: LandMask) -> Self {
        Self { mask }
    }
}

impl RouteConstraint for LandCrossing {
    fn name(&self) -> &'static str {
        "land crossing"
    }

    fn is_constrained(&self, lat: f64, lon: f64, _time: DateTime<Utc>) -> bool {
        self.mask.is_land(&Coordinate::new(lat, lon))
    }
}

/// Rejects points where the significant wave height exceeds the limit.
pub struct WaveHeightLimit {
    pub limit_m: f64,
    pub field: ScalarField,
}

impl RouteConstraint for WaveHeightLimit {
    fn name(&self) -> &'static str {
        "wave height"
    }

    fn is_constrained(&self, lat: f64, lon: f64, _time: DateTime<Utc>) -> bool {
        self.field.value_at(&Coordinate::new(lat, lon)) > self.limit_m
    }
}

/// Rejects points with less water under the keel than required.
pub struct WaterDepthLimit {
    pub min_depth_m: f64,
    pub field: ScalarField,
}

impl RouteConstraint for WaterDepthLimit {
    fn name(&self) -> &'static str {
        "water depth"
    }

    fn is_constrained(&self, lat: f64, lon: f64, _time: DateTime<Utc>) -> bool {
        self.field.value_at(&Coordinate::new(lat, lon)) < self.min_depth_m
    }
}

/// Ordered constraint collection plus the positive-waypoint leg state.
pub struct ConstraintList {
    negative: Vec<Box<dyn RouteConstraint>>,
    waypoints: Vec<Coordinate>,
    /// Leg endpoints once initialised: start, waypoints..., finish.
    legs: Vec<Coordinate>,
    leg_index: usize,
    /// Sampling resolution along a transition, degrees.
    resolution_deg: f64,
}

impl Default for ConstraintList {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintList {
    pub fn new() -> Self {
        Self {
            negative: Vec::new(),
            waypoints: Vec::new(),
            legs: Vec::new(),
            leg_index: 0,
            resolution_deg: 0.1,
        }
    }

    pub fn with_resolution(mut self, resolution_deg: f64) -> Self {
        self.resolution_deg = resolution_deg;
        self
    }

    pub fn add_negative(&mut self, constraint: Box<dyn RouteConstraint>) {
        self.negative.push(constraint);
    }

    pub fn negative_count(&self) -> usize {
        self.negative.len()
    }

    /// Appends a required intermediate waypoint. Order matters: waypoints
    /// are visited in insertion order.
    pub fn add_positive(&mut self, waypoint: Coordinate) {
        self.waypoints.push(waypoint);
    }

    pub fn have_positive(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Builds the leg list start -> waypoints -> finish and rewinds to the
    /// first leg.
    pub fn init_positive(&mut self, start: Coordinate, finish: Coordinate) {
        self.legs = Vec::with_capacity(self.waypoints.len() + 2);
        self.legs.push(start);
        self.legs.extend(self.waypoints.iter().copied());
        self.legs.push(finish);
        self.leg_index = 0;
    }

    pub fn current_start(&self) -> Coordinate {
        self.legs[self.leg_index]
    }

    pub fn current_destination(&self) -> Coordinate {
        self.legs[self.leg_index + 1]
    }

    /// Advances to the next leg after its destination waypoint was reached.
    pub fn reached_positive(&mut self) {
        if self.leg_index + 2 < self.legs.len() {
            self.leg_index += 1;
        }
    }

    /// Flags each endpoint that any negative constraint rejects. Existing
    /// `true` entries in `is_constrained` are preserved.
    pub fn safe_endpoint(
        &self,
        lats: &[f64],
        lons: &[f64],
        times: &[DateTime<Utc>],
        is_constrained: &mut [bool],
    ) {
        for i in 0..lats.len() {
            if is_constrained[i] {
                continue;
            }
            for constraint in &self.negative {
                if constraint.is_constrained(lats[i], lons[i], times[i]) {
                    debug!(
                        "constraint '{}' rejects ({:.4}, {:.4})",
                        constraint.name(),
                        lats[i],
                        lons[i]
                    );
                    is_constrained[i] = true;
                    break;
                }
            }
        }
    }

    /// Checks each transition by sampling points along it at the configured
    /// resolution; a transition is unsafe if any sampled point is.
    pub fn safe_crossing(
        &self,
        lats0: &[f64],
        lons0: &[f64],
        lats1: &[f64],
        lons1: &[f64],
        times: &[DateTime<Utc>],
    ) -> Vec<bool> {
        let mut is_constrained = vec![false; lats0.len()];
        if self.negative.is_empty() {
            return is_constrained;
        }

        for i in 0..lats0.len() {
            let span = (lats1[i] - lats0[i])
                .abs()
                .max((lons1[i] - lons0[i]).abs());
            let samples = (span / self.resolution_deg).ceil().max(1.0) as usize;

            'sampling: for s in 0..=samples {
                let f = s as f64 / samples as f64;
                let lat = lats0[i] + (lats1[i] - lats0[i]) * f;
                let lon = lons0[i] + (lons1[i] - lons0[i]) * f;
                for constraint in &self.negative {
                    if constraint.is_constrained(lat, lon, times[i]) {
                        is_constrained[i] = true;
                        break 'sampling;
                    }
                }
            }
        }
        is_constrained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dutch_coast_mask() -> LandMask {
        // a crude box over the IJsselmeer polders
        let mut mask = LandMask::new();
        mask.add_land_box(5.0, 6.5, 52.5, 53.3);
        mask
    }

    fn times(n: usize) -> Vec<DateTime<Utc>> {
        vec![Utc::now(); n]
    }

    #[test]
    fn test_add_negative_constraint() {
        let mut list = ConstraintList::new();
        list.add_negative(Box::new(LandCrossing::new(LandMask::new())));
        assert_eq!(list.negative_count(), 1);
    }

    #[test]
    fn test_safe_endpoint_land_crossing() {
        // first point at sea, second inside the land box
        let lats = [52.7, 53.04];
        let lons = [4.04, 5.66];

        let mut list = ConstraintList::new();
        list.add_negative(Box::new(LandCrossing::new(dutch_coast_mask())));
        list.add_negative(Box::new(WaveHeightLimit {
            limit_m: 10.0,
            field: ScalarField::constant(5.0),
        }));

        let mut is_constrained = vec![false; 2];
        list.safe_endpoint(&lats, &lons, &times(2), &mut is_constrained);
        assert!(!is_constrained[0]);
        assert!(is_constrained[1]);
    }

    #[test]
    fn test_safe_endpoint_wave_height() {
        let lats = [52.7, 53.55];
        let lons = [4.04, 3.45];

        let mut list = ConstraintList::new();
        list.add_negative(Box::new(LandCrossing::new(dutch_coast_mask())));
        list.add_negative(Box::new(WaveHeightLimit {
            limit_m: 10.0,
            field: ScalarField::constant(11.0),
        }));

        let mut is_constrained = vec![false; 2];
        list.safe_endpoint(&lats, &lons, &times(2), &mut is_constrained);
        assert!(is_constrained[0]);
        assert!(is_constrained[1]);
    }

    #[test]
    fn test_safe_crossing_land() {
        // first transition cuts through the land box, second stays at sea
        let lats0 = [52.76, 53.45];
        let lons0 = [4.40, 3.72];
        let lats1 = [52.70, 53.55];
        let lons1 = [6.40, 3.45];

        let mut list = ConstraintList::new();
        list.add_negative(Box::new(LandCrossing::new(dutch_coast_mask())));

        let flagged = list.safe_crossing(&lats0, &lons0, &lats1, &lons1, &times(2));
        assert!(flagged[0]);
        assert!(!flagged[1]);
    }

    #[test]
    fn test_safe_crossing_shape_matches_input() {
        let list = ConstraintList::new();
        let flagged = list.safe_crossing(&[0.0, 1.0], &[0.0, 1.0], &[0.5, 1.5], &[0.5, 1.5], &times(2));
        assert_eq!(flagged.len(), 2);
        assert!(flagged.iter().all(|c| !c));
    }

    #[test]
    fn test_water_depth_limit() {
        let mut shallow = ScalarField::constant(50.0);
        shallow.insert_point(Coordinate::new(51.3, 2.1), 4.0);

        let depth = WaterDepthLimit {
            min_depth_m: 12.0,
            field: shallow,
        };
        assert!(depth.is_constrained(51.34, 2.05, Utc::now()));
        assert!(!depth.is_constrained(48.0, -5.0, Utc::now()));
    }

    #[test]
    fn test_positive_waypoint_legs() {
        let start = Coordinate::new(0.0, 0.0);
        let wp = Coordinate::new(0.0, 5.0);
        let finish = Coordinate::new(0.0, 10.0);

        let mut list = ConstraintList::new();
        list.add_positive(wp);
        assert!(list.have_positive());

        list.init_positive(start, finish);
        assert_eq!(list.current_start(), start);
        assert_eq!(list.current_destination(), wp);

        list.reached_positive();
        assert_eq!(list.current_start(), wp);
        assert_eq!(list.current_destination(), finish);

        // advancing past the last leg stays on it
        list.reached_positive();
        assert_eq!(list.current_destination(), finish);
    }
}
