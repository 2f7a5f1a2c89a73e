use crate::engine::error::RoutingError;

/// How one routing step advances the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepMode {
    /// Every candidate sails for the same wall-clock interval.
    FixedTime { seconds: f64 },
    /// Every candidate sails until it has burned the same amount of fuel;
    /// the step duration then varies per candidate with its fuel rate.
    FixedFuel { kilograms: f64 },
}

/// Criterion used for final route selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimization {
    /// Maximise cumulative distance traveled (fastest progress).
    MaxDistance,
    /// Minimise cumulative fuel consumed.
    MinFuel,
}

/// Immutable settings for a routing run, handed to the controller at
/// construction. Validation happens up front; a controller is never built
/// from an inconsistent configuration.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Total number of heading branches per candidate, excluding the center
    /// course. Must be even; each candidate expands into `heading_segments + 1`
    /// variants.
    pub heading_segments: usize,
    /// Angular increment between adjacent heading branches (degrees).
    pub heading_increment_deg: f64,
    /// Half of the angular range considered for pruning (degrees).
    pub prune_sector_deg_half: f64,
    /// Number of azimuth bins used for pruning. Must be even.
    pub prune_segments: usize,
    /// Maximum number of routing steps.
    pub routing_steps: usize,
    /// How many routes to extract. Values above 1 enable multi-route mode.
    pub number_of_routes: usize,
    pub mode: StepMode,
    pub optimization: Optimization,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            heading_segments: 30,
            heading_increment_deg: 6.0,
            prune_sector_deg_half: 91.0,
            prune_segments: 20,
            routing_steps: 60,
            number_of_routes: 1,
            mode: StepMode::FixedTime { seconds: 3600.0 },
            optimization: Optimization::MaxDistance,
        }
    }
}

impl RoutingConfig {
    /// Checks the branching/pruning geometry. The heading fan must fit
    /// strictly inside the pruning sector, otherwise variants would be
    /// created that no pruning bin can ever keep.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.heading_segments % 2 != 0 {
            return Err(RoutingError::OddHeadingSegments(self.heading_segments));
        }
        if self.prune_segments % 2 != 0 {
            return Err(RoutingError::OddPruneSegments(self.prune_segments));
        }
        let fan_half_deg = self.heading_segments as f64 / 2.0 * self.heading_increment_deg;
        if fan_half_deg >= self.prune_sector_deg_half {
            return Err(RoutingError::FanExceedsPruneSector {
                fan_half_deg,
                sector_half_deg: self.prune_sector_deg_half,
            });
        }
        Ok(())
    }

    /// Branch half-width k: each candidate expands into 2k+1 variants.
    pub fn branch_half_width(&self) -> usize {
        self.heading_segments / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RoutingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_odd_heading_segments_rejected() {
        let cfg = RoutingConfig {
            heading_segments: 5,
            ..RoutingConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(RoutingError::OddHeadingSegments(5))
        ));
    }

    #[test]
    fn test_odd_prune_segments_rejected() {
        let cfg = RoutingConfig {
            prune_segments: 7,
            ..RoutingConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(RoutingError::OddPruneSegments(7))
        ));
    }

    #[test]
    fn test_fan_wider_than_prune_sector_rejected() {
        // 30/2 * 7 = 105 > 91
        let cfg = RoutingConfig {
            heading_increment_deg: 7.0,
            ..RoutingConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(RoutingError::FanExceedsPruneSector { .. })
        ));
    }

    #[test]
    fn test_fan_equal_to_prune_sector_rejected() {
        let cfg = RoutingConfig {
            heading_segments: 4,
            heading_increment_deg: 10.0,
            prune_sector_deg_half: 20.0,
            prune_segments: 4,
            ..RoutingConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
