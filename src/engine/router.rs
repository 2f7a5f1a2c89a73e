//! The routing controller: drives expand -> move -> constrain -> detect ->
//! prune over the frontier until the destination is reached, the frontier
//! dies out, or the step budget ends.

use chrono::{DateTime, Duration, Utc};
use log::{error, info};
use rayon::prelude::*;

use crate::engine::config::{Optimization, RoutingConfig, StepMode};
use crate::engine::constraints::ConstraintList;
use crate::engine::error::RoutingError;
use crate::engine::frontier::FrontierState;
use crate::engine::geodesic;
use crate::engine::models::{Coordinate, RouteKind, RouteResult};
use crate::engine::multiroute;
use crate::engine::physics::BoatModel;
use crate::engine::pruning::prune_frontier;

/// What a motion step found out about the frontier.
struct StepFlags {
    /// Some candidate can reach the final destination within this step.
    last_step: bool,
    /// Some candidate can reach the active intermediate waypoint.
    waypoint_step: bool,
    /// Per-candidate reaching flags (unsafe transitions excluded).
    reaching: Vec<bool>,
}

pub struct RoutingController<'a> {
    config: RoutingConfig,
    boat: &'a dyn BoatModel,
    constraints: ConstraintList,
    observer: Option<Box<dyn FnMut(&FrontierState) + 'a>>,
}

impl<'a> RoutingController<'a> {
    /// Builds a controller. The configuration is validated here, before any
    /// stepping can happen.
    pub fn new(
        config: RoutingConfig,
        boat: &'a dyn BoatModel,
        constraints: ConstraintList,
    ) -> Result<Self, RoutingError> {
        config.validate()?;
        Ok(Self {
            config,
            boat,
            constraints,
            observer: None,
        })
    }

    /// Registers a callback invoked after each completed step with a
    /// read-only view of the frontier. The engine runs headless without it.
    pub fn with_observer(mut self, observer: impl FnMut(&FrontierState) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn route_kind(&self) -> RouteKind {
        match self.config.optimization {
            Optimization::MaxDistance => RouteKind::MinimalTime,
            Optimization::MinFuel => RouteKind::MinimalFuel,
        }
    }

    /// Runs the full routing loop and extracts the requested number of
    /// routes, sorted ascending by total fuel when more than one.
    pub fn run(
        &mut self,
        start: Coordinate,
        finish: Coordinate,
        departure_time: DateTime<Utc>,
    ) -> Result<Vec<RouteResult>, RoutingError> {
        let mut state = FrontierState::new(start, finish, departure_time);

        if self.constraints.have_positive() {
            self.constraints.init_positive(start, finish);
            state.start_new_leg(
                self.constraints.current_start(),
                self.constraints.current_destination(),
            );
            info!(
                "Routing via intermediate waypoints, first leg towards ({:.4}, {:.4})",
                state.finish_leg.lat, state.finish_leg.lon
            );
        }

        let multi = self.config.number_of_routes > 1;
        let kind = self.route_kind();
        let mut collected: Vec<RouteResult> = Vec::new();
        let mut last_step_reaching: Option<Vec<bool>> = None;

        for i in 0..self.config.routing_steps {
            info!("Step {}", i);

            state.expand_variants(
                self.config.heading_segments,
                self.config.heading_increment_deg,
            );
            let flags = self.move_boat_direct(&mut state);

            if flags.last_step {
                info!("Initiating last step at routing step {}", state.count);

                if !multi {
                    last_step_reaching = Some(flags.reaching);
                    break;
                }

                let (finished, carry) = multiroute::split_reaching_groups(&state, &flags.reaching);
                let mut step_routes = finished
                    .iter()
                    .map(|&col| state.extract_route(col, kind))
                    .collect::<Result<Vec<_>, _>>()?;
                step_routes.sort_by(|a, b| a.total_fuel_kg.total_cmp(&b.total_fuel_kg));
                step_routes.truncate(self.config.number_of_routes - collected.len());
                collected.extend(step_routes);

                if collected.len() >= self.config.number_of_routes || carry.is_empty() {
                    break;
                }

                state.select_columns(&carry)?;
                let outcome = prune_frontier(
                    &mut state,
                    self.config.prune_segments,
                    self.config.prune_sector_deg_half,
                )?;
                if outcome.survivors == 0 {
                    break;
                }
                self.notify(&state);
                continue;
            }

            if flags.waypoint_step {
                info!(
                    "Initiating pruning for intermediate waypoint at routing step {}",
                    state.count
                );
                let waypoint = state.finish_leg;
                let best = final_selection(&state, self.config.optimization, Some(&flags.reaching))
                    .ok_or(RoutingError::NoViableCandidates { step: state.count })?;
                state.select_columns(&[best])?;
                state.snap_current_position(waypoint);

                self.constraints.reached_positive();
                state.start_new_leg(
                    self.constraints.current_start(),
                    self.constraints.current_destination(),
                );
                info!(
                    "Initiating routing for next segment going from ({:.4}, {:.4}) to ({:.4}, {:.4})",
                    state.start_leg.lat, state.start_leg.lon,
                    state.finish_leg.lat, state.finish_leg.lon
                );
                self.notify(&state);
                continue;
            }

            let outcome = prune_frontier(
                &mut state,
                self.config.prune_segments,
                self.config.prune_sector_deg_half,
            )?;
            if outcome.survivors == 0 {
                if multi && !collected.is_empty() {
                    break;
                }
                return Err(RoutingError::NoViableCandidates { step: state.count });
            }
            self.notify(&state);
        }

        if multi && !collected.is_empty() {
            collected.sort_by(|a, b| a.total_fuel_kg.total_cmp(&b.total_fuel_kg));
            return Ok(collected);
        }

        // final pruning: prefer candidates that actually reached, fall back
        // to the whole frontier when the step budget ran out first
        let reaching = last_step_reaching.as_deref();
        let best = final_selection(&state, self.config.optimization, reaching)
            .or_else(|| final_selection(&state, self.config.optimization, None))
            .ok_or(RoutingError::NoViableCandidates { step: state.count })?;
        let route = state.extract_route(best, kind)?;

        if route.arrival() != Some(finish) {
            error!("Did not arrive at destination! Need further routing steps or lower resolution.");
        }

        Ok(vec![route])
    }

    /// Advances every candidate by one interval: boat performance lookup,
    /// terminal-distance clipping, geodesic projection, safety check and
    /// totals accumulation.
    fn move_boat_direct(&mut self, state: &mut FrontierState) -> StepFlags {
        let n = state.width();
        let headings = state.current_heading.clone();
        let lats = state.lats_per_step.current().to_vec();
        let lons = state.lons_per_step.current().to_vec();
        let times = state.time.clone();

        let params = self.boat.ship_params(&headings, &lats, &lons, &times);

        let (mut delta_time, mut delta_fuel, mut dist) = match self.config.mode {
            StepMode::FixedTime { seconds } => {
                let delta_time = vec![seconds; n];
                let delta_fuel: Vec<f64> = params.fuel_rate.iter().map(|r| r * seconds).collect();
                let dist: Vec<f64> = params.speed.iter().map(|s| s * seconds).collect();
                (delta_time, delta_fuel, dist)
            }
            StepMode::FixedFuel { kilograms } => {
                let delta_time: Vec<f64> = params
                    .fuel_rate
                    .iter()
                    .map(|&r| if r > 0.0 { kilograms / r } else { 0.0 })
                    .collect();
                let delta_fuel: Vec<f64> = params
                    .fuel_rate
                    .iter()
                    .zip(&delta_time)
                    .map(|(r, t)| r * t)
                    .collect();
                let dist: Vec<f64> = params
                    .speed
                    .iter()
                    .zip(&delta_time)
                    .map(|(s, t)| s * t)
                    .collect();
                (delta_time, delta_fuel, dist)
            }
        };

        // remaining distance and bearing towards the active destination
        let to_dest: Vec<geodesic::Inverse> = (0..n)
            .map(|i| geodesic::inverse(&Coordinate::new(lats[i], lons[i]), &state.finish_leg))
            .collect();
        let mut reaching: Vec<bool> = (0..n)
            .map(|i| to_dest[i].distance_m < dist[i])
            .collect();

        // candidates that can reach the destination this step sail exactly
        // onto it: clip the move and rescale time and fuel to the distance
        // actually covered
        let mut recorded_heading = headings.clone();
        for i in 0..n {
            if !reaching[i] {
                continue;
            }
            dist[i] = to_dest[i].distance_m;
            if params.speed[i] > 0.0 {
                delta_time[i] = dist[i] / params.speed[i];
            }
            delta_fuel[i] = params.fuel_rate[i] * delta_time[i];
            recorded_heading[i] = geodesic::wrap360(to_dest[i].azimuth_deg);
        }

        let finish_leg = state.finish_leg;
        let next: Vec<Coordinate> = (0..n)
            .into_par_iter()
            .map(|i| {
                if reaching[i] {
                    finish_leg
                } else {
                    geodesic::direct(&Coordinate::new(lats[i], lons[i]), headings[i], dist[i])
                }
            })
            .collect();
        let next_lats: Vec<f64> = next.iter().map(|c| c.lat).collect();
        let next_lons: Vec<f64> = next.iter().map(|c| c.lon).collect();

        let is_constrained =
            self.constraints
                .safe_crossing(&lats, &lons, &next_lats, &next_lons, &times);

        // unsafe transitions contribute zero distance; removal itself is
        // deferred to pruning so a fully constrained sector can be detected
        for i in 0..n {
            if is_constrained[i] {
                dist[i] = 0.0;
                reaching[i] = false;
            }
        }

        let any_reaching = reaching.iter().any(|&r| r);
        let reached_final = state.finish_leg == state.finish;

        let new_times: Vec<DateTime<Utc>> = times
            .iter()
            .zip(&delta_time)
            .map(|(t, &dt)| *t + Duration::milliseconds((dt * 1000.0).round() as i64))
            .collect();

        state.lats_per_step.prepend(next_lats);
        state.lons_per_step.prepend(next_lons);
        state
            .azimuth_per_step
            .prepend(recorded_heading.into_iter().map(Some).collect());
        state.dist_per_step.prepend(dist.clone());
        state.starttime_per_step.prepend(new_times.clone());
        state.speed_per_step.prepend(params.speed);
        state.fuel_per_step.prepend(delta_fuel.clone());
        state.rpm_per_step.prepend(params.rpm);

        for i in 0..n {
            state.full_dist_traveled[i] = if is_constrained[i] {
                0.0
            } else {
                state.full_dist_traveled[i] + dist[i]
            };
            state.full_time_traveled[i] += delta_time[i];
            state.full_fuel_consumed[i] += delta_fuel[i];
        }
        state.time = new_times;
        state.count += 1;

        if state.full_fuel_consumed.iter().any(|&f| f < 0.0) {
            error!("Negative cumulative fuel consumption. Performance model needs to be checked!");
        }

        debug_assert!(state.is_consistent());

        StepFlags {
            last_step: any_reaching && reached_final,
            waypoint_step: any_reaching && !reached_final,
            reaching,
        }
    }

    fn notify(&mut self, state: &FrontierState) {
        if let Some(observer) = self.observer.as_mut() {
            observer(state);
        }
    }
}

/// Index of the best candidate under the optimization criterion, optionally
/// restricted by a filter mask. Ties go to the lowest column index.
fn final_selection(
    state: &FrontierState,
    optimization: Optimization,
    filter: Option<&[bool]>,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for col in 0..state.width() {
        if let Some(mask) = filter {
            if !mask[col] {
                continue;
            }
        }
        best = match best {
            None => Some(col),
            Some(prev) => {
                let better = match optimization {
                    Optimization::MaxDistance => {
                        state.full_dist_traveled[col] > state.full_dist_traveled[prev]
                    }
                    Optimization::MinFuel => {
                        state.full_fuel_consumed[col] < state.full_fuel_consumed[prev]
                    }
                };
                Some(if better { col } else { prev })
            }
        };
    }
    best
}
