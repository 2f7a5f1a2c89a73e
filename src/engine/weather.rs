//! Wind and scalar environment fields queried by the boat model and the
//! safety constraints. All real I/O (downloading, decoding) happens before a
//! routing step begins; lookups here are pure in-memory reads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::engine::models::{Coordinate, WindData};

/// Vectorized wind lookup, one sample per queried candidate position.
pub trait WeatherProvider {
    fn wind(&self, lats: &[f64], lons: &[f64], times: &[DateTime<Utc>]) -> Vec<WindData>;
}

/// The same wind everywhere. Useful for tests and for runs without a
/// forecast.
#[derive(Debug, Clone, Copy)]
pub struct UniformWind {
    pub wind: WindData,
}

impl UniformWind {
    pub fn new(wind: WindData) -> Self {
        Self { wind }
    }
}

impl WeatherProvider for UniformWind {
    fn wind(&self, lats: &[f64], _lons: &[f64], _times: &[DateTime<Utc>]) -> Vec<WindData> {
        vec![self.wind; lats.len()]
    }
}

/// Wind samples bucketed into 1x1 degree spatial chunks.
/// Key: (lon.floor(), lat.floor())
#[derive(Debug, Clone, Default)]
pub struct WindField {
    chunks: HashMap<(i32, i32), Vec<(Coordinate, WindData)>>,
}

impl WindField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_point(&mut self, coord: Coordinate, wind: WindData) {
        let chunk_x = coord.lon.floor() as i32;
        let chunk_y = coord.lat.floor() as i32;
        self.chunks
            .entry((chunk_x, chunk_y))
            .or_default()
            .push((coord, wind));
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Nearest sample within the coordinate's chunk, calm air when the chunk
    /// holds no data.
    pub fn wind_at(&self, coord: &Coordinate) -> WindData {
        let chunk_x = coord.lon.floor() as i32;
        let chunk_y = coord.lat.floor() as i32;

        let Some(chunk) = self.chunks.get(&(chunk_x, chunk_y)) else {
            return WindData::CALM;
        };

        let mut best_dist = f64::MAX;
        let mut best_wind = WindData::CALM;
        for (p_coord, wind) in chunk {
            let d_lat = p_coord.lat - coord.lat;
            let d_lon = p_coord.lon - coord.lon;
            let dist_sq = d_lat * d_lat + d_lon * d_lon;
            if dist_sq < best_dist {
                best_dist = dist_sq;
                best_wind = *wind;
            }
        }
        best_wind
    }
}

impl WeatherProvider for WindField {
    fn wind(&self, lats: &[f64], lons: &[f64], _times: &[DateTime<Utc>]) -> Vec<WindData> {
        lats.iter()
            .zip(lons)
            .map(|(&lat, &lon)| self.wind_at(&Coordinate::new(lat, lon)))
            .collect()
    }
}

/// Scalar environment samples (wave height, water depth) in the same
/// chunked layout as [`WindField`].
#[derive(Debug, Clone)]
pub struct ScalarField {
    chunks: HashMap<(i32, i32), Vec<(Coordinate, f64)>>,
    /// Returned where no sample is available.
    default: f64,
}

impl ScalarField {
    pub fn constant(value: f64) -> Self {
        Self {
            chunks: HashMap::new(),
            default: value,
        }
    }

    pub fn insert_point(&mut self, coord: Coordinate, value: f64) {
        let chunk_x = coord.lon.floor() as i32;
        let chunk_y = coord.lat.floor() as i32;
        self.chunks
            .entry((chunk_x, chunk_y))
            .or_default()
            .push((coord, value));
    }

    pub fn value_at(&self, coord: &Coordinate) -> f64 {
        let chunk_x = coord.lon.floor() as i32;
        let chunk_y = coord.lat.floor() as i32;

        let Some(chunk) = self.chunks.get(&(chunk_x, chunk_y)) else {
            return self.default;
        };

        let mut best_dist = f64::MAX;
        let mut best_value = self.default;
        for (p_coord, value) in chunk {
            let d_lat = p_coord.lat - coord.lat;
            let d_lon = p_coord.lon - coord.lon;
            let dist_sq = d_lat * d_lat + d_lon * d_lon;
            if dist_sq < best_dist {
                best_dist = dist_sq;
                best_value = *value;
            }
        }
        best_value
    }
}
