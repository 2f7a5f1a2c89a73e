use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Wind at a specific point, as grid components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindData {
    /// U component of wind, positive eastward (m/s)
    pub u: f64,
    /// V component of wind, positive northward (m/s)
    pub v: f64,
}

impl WindData {
    pub const CALM: WindData = WindData { u: 0.0, v: 0.0 };

    /// True wind speed in m/s.
    pub fn speed(&self) -> f64 {
        (self.u.powi(2) + self.v.powi(2)).sqrt()
    }

    /// Direction the wind blows from, navigational degrees
    /// (0 = from North, 90 = from East).
    pub fn direction(&self) -> f64 {
        let angle = self.v.atan2(self.u).to_degrees();
        let mut dir = 270.0 - angle;
        if dir < 0.0 {
            dir += 360.0;
        }
        if dir >= 360.0 {
            dir -= 360.0;
        }
        dir
    }
}

/// What the selected route optimises for. Rendered into the persisted
/// route output as its route-kind label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteKind {
    MinimalTime,
    MinimalFuel,
}

impl std::fmt::Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteKind::MinimalTime => write!(f, "minimal time route"),
            RouteKind::MinimalFuel => write!(f, "minimal fuel route"),
        }
    }
}

/// One record of a finished route, departure to arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
    /// Heading sailed into this point. `None` for the departure record.
    pub heading_deg: Option<f64>,
    /// Distance covered since the previous record (m).
    pub distance_m: f64,
    /// Boat speed during the leg ending here (m/s).
    pub speed_ms: f64,
    /// Fuel burned during the leg ending here (kg).
    pub fuel_kg: f64,
    pub rpm: f64,
    /// Simulated time of arrival at this point.
    pub time: DateTime<Utc>,
    /// Seconds elapsed since departure.
    pub elapsed_s: f64,
}

/// A finished route with per-step records and aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub kind: RouteKind,
    pub start: Coordinate,
    pub finish: Coordinate,
    pub points: Vec<RoutePoint>,
    pub total_distance_m: f64,
    pub total_time_s: f64,
    pub total_fuel_kg: f64,
}

impl RouteResult {
    /// Position of the last record, i.e. where the route actually ends.
    pub fn arrival(&self) -> Option<Coordinate> {
        self.points.last().map(|p| Coordinate::new(p.lat, p.lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_direction_conventions() {
        // Navigational: 0 = wind from North, 90 = from East, 180 = from South.
        // In grid data u > 0 is eastward, v > 0 is northward, so wind FROM the
        // North has v < 0.
        let north_wind = WindData { u: 0.0, v: -5.0 };
        assert_eq!(north_wind.direction(), 0.0);

        let east_wind = WindData { u: -5.0, v: 0.0 };
        assert_eq!(east_wind.direction(), 90.0);

        let south_wind = WindData { u: 0.0, v: 5.0 };
        assert_eq!(south_wind.direction(), 180.0);

        let west_wind = WindData { u: 5.0, v: 0.0 };
        assert_eq!(west_wind.direction(), 270.0);
    }

    #[test]
    fn test_wind_speed() {
        let wind = WindData { u: 3.0, v: 4.0 };
        assert!((wind.speed() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_route_kind_labels() {
        assert_eq!(RouteKind::MinimalTime.to_string(), "minimal time route");
        assert_eq!(RouteKind::MinimalFuel.to_string(), "minimal fuel route");
    }
}
