use chrono::{DateTime, Utc};

use crate::engine::weather::WeatherProvider;
use crate::parsers::polars::PolarData;

/// Per-candidate performance figures for one routing step, one entry per
/// frontier column.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipParams {
    /// Achievable boat speed (m/s).
    pub speed: Vec<f64>,
    /// Fuel burn rate (kg/s).
    pub fuel_rate: Vec<f64>,
    /// Engine revolutions, carried through to the route output.
    pub rpm: Vec<f64>,
}

/// Boat performance lookup. Vectorized: one call per routing step covers the
/// whole frontier.
pub trait BoatModel {
    fn ship_params(
        &self,
        headings: &[f64],
        lats: &[f64],
        lons: &[f64],
        times: &[DateTime<Utc>],
    ) -> ShipParams;
}

/// True wind angle from true wind direction and boat heading, mirrored into
/// [0, 180] since polars are symmetric.
pub fn true_wind_angle(twd: f64, heading: f64) -> f64 {
    let mut twa = twd - heading;
    while twa > 180.0 {
        twa -= 360.0;
    }
    while twa < -180.0 {
        twa += 360.0;
    }
    twa.abs()
}

/// Boat performance backed by a polar table and a wind provider.
pub struct PolarBoat {
    polar: PolarData,
    weather: Box<dyn WeatherProvider>,
    /// Nominal fuel burn while underway (kg/s).
    fuel_rate_kg_s: f64,
    rpm: f64,
}

impl PolarBoat {
    pub fn new(
        polar: PolarData,
        weather: Box<dyn WeatherProvider>,
        fuel_rate_kg_s: f64,
        rpm: f64,
    ) -> Self {
        Self {
            polar,
            weather,
            fuel_rate_kg_s,
            rpm,
        }
    }
}

impl BoatModel for PolarBoat {
    fn ship_params(
        &self,
        headings: &[f64],
        lats: &[f64],
        lons: &[f64],
        times: &[DateTime<Utc>],
    ) -> ShipParams {
        let winds = self.weather.wind(lats, lons, times);

        let speed = headings
            .iter()
            .zip(&winds)
            .map(|(&heading, wind)| {
                let twa = true_wind_angle(wind.direction(), heading);
                self.polar.speed(wind.speed(), twa)
            })
            .collect();

        ShipParams {
            speed,
            fuel_rate: vec![self.fuel_rate_kg_s; headings.len()],
            rpm: vec![self.rpm; headings.len()],
        }
    }
}

/// A boat that makes the same speed on every heading. Useful for tests and
/// motor-vessel runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedSpeedBoat {
    pub speed_ms: f64,
    pub fuel_rate_kg_s: f64,
    pub rpm: f64,
}

impl BoatModel for FixedSpeedBoat {
    fn ship_params(
        &self,
        headings: &[f64],
        _lats: &[f64],
        _lons: &[f64],
        _times: &[DateTime<Utc>],
    ) -> ShipParams {
        ShipParams {
            speed: vec![self.speed_ms; headings.len()],
            fuel_rate: vec![self.fuel_rate_kg_s; headings.len()],
            rpm: vec![self.rpm; headings.len()],
        }
    }
}
