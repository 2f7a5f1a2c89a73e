//! Boat polar table: boat speed as a function of true wind angle and true
//! wind speed, loaded from a delimiter-separated text grid.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use thiserror::Error;

/// Knots per meter-per-second.
const KNOTS_PER_MPS: f64 = 1.94384;

fn knots_to_mps(knots: f64) -> f64 {
    knots / KNOTS_PER_MPS
}

#[derive(Debug, Error)]
pub enum PolarLoadError {
    #[error("failed to read polar file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("polar file {path} has no wind-speed header row")]
    MissingHeader { path: String },
    #[error("polar file {path} has no wind-angle rows")]
    MissingRows { path: String },
}

/// Polar grid with speeds indexed as `speeds[twa_idx][tws_idx]`.
///
/// On disk all speed values are knots; they are converted to meters per
/// second on load and everything in here is m/s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarData {
    /// True wind speeds (m/s), ascending.
    pub tws: Vec<f64>,
    /// True wind angles (degrees), ascending, typically 0..180.
    pub twa: Vec<f64>,
    /// Boat speeds (m/s).
    pub speeds: Vec<Vec<f64>>,
}

impl PolarData {
    /// Loads a polar grid from a text file.
    ///
    /// Row 0 holds the wind-speed header (its first cell is a label and is
    /// skipped), column 0 the wind angles, interior cells the boat speeds.
    /// Cells are split on `;` when present, `,` otherwise. Non-numeric or
    /// missing cells read as zero.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PolarLoadError> {
        let path_str = path.as_ref().display().to_string();
        info!("Loading polar data from {}", path_str);

        let file = File::open(&path).map_err(|source| PolarLoadError::Io {
            path: path_str.clone(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut tws = Vec::new();
        let mut twa = Vec::new();
        let mut speeds: Vec<Vec<f64>> = Vec::new();

        for line in reader.lines() {
            let line = line.map_err(|source| PolarLoadError::Io {
                path: path_str.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let delimiter = if line.contains(';') { ';' } else { ',' };
            let cells: Vec<&str> = line.split(delimiter).collect();

            if tws.is_empty() {
                // header row: wind speeds from the second cell on
                tws = cells[1..].iter().map(|c| parse_cell(c)).collect();
                if tws.is_empty() {
                    return Err(PolarLoadError::MissingHeader { path: path_str });
                }
                continue;
            }

            twa.push(parse_cell(cells[0]));
            let mut row_speeds: Vec<f64> = cells[1..].iter().map(|c| parse_cell(c)).collect();
            // ragged rows: missing trailing cells count as zero
            row_speeds.resize(tws.len(), 0.0);
            speeds.push(row_speeds);
        }

        if tws.is_empty() {
            return Err(PolarLoadError::MissingHeader { path: path_str });
        }
        if twa.is_empty() {
            return Err(PolarLoadError::MissingRows { path: path_str });
        }

        let tws: Vec<f64> = tws.into_iter().map(knots_to_mps).collect();
        let speeds: Vec<Vec<f64>> = speeds
            .into_iter()
            .map(|row| row.into_iter().map(knots_to_mps).collect())
            .collect();

        info!(
            "Polar loaded: {} wind angles x {} wind speeds",
            twa.len(),
            tws.len()
        );

        Ok(Self { tws, twa, speeds })
    }

    /// A polar that returns the same boat speed for every wind condition.
    pub fn flat(speed_ms: f64) -> Self {
        Self {
            tws: vec![0.0, 30.0],
            twa: vec![0.0, 180.0],
            speeds: vec![vec![speed_ms; 2], vec![speed_ms; 2]],
        }
    }

    /// Boat speed (m/s) for the given true wind speed (m/s) and true wind
    /// angle (degrees).
    ///
    /// The angle is mirrored into [0, 180] by polar symmetry. Interpolation
    /// is bilinear on the grid; queries beyond the grid bounds extrapolate
    /// linearly from the edge cells rather than erroring.
    pub fn speed(&self, tws_ms: f64, twa_deg: f64) -> f64 {
        if self.tws.is_empty() || self.twa.is_empty() || self.speeds.is_empty() {
            return 0.0;
        }

        let mut angle = twa_deg.abs() % 360.0;
        if angle > 180.0 {
            angle = 360.0 - angle;
        }

        let (si0, si1, sfrac) = bracket(&self.tws, tws_ms);
        let (ai0, ai1, afrac) = bracket(&self.twa, angle);

        let val00 = self.speeds[ai0][si0];
        let val01 = self.speeds[ai0][si1];
        let val10 = self.speeds[ai1][si0];
        let val11 = self.speeds[ai1][si1];

        let low = val00 * (1.0 - sfrac) + val01 * sfrac;
        let high = val10 * (1.0 - sfrac) + val11 * sfrac;
        low * (1.0 - afrac) + high * afrac
    }
}

fn parse_cell(cell: &str) -> f64 {
    cell.trim().parse().unwrap_or(0.0)
}

/// Bracketing indices and interpolation fraction for `x` on an ascending
/// axis. The fraction is not clamped, so out-of-range queries extrapolate
/// along the nearest edge segment.
fn bracket(axis: &[f64], x: f64) -> (usize, usize, f64) {
    if axis.len() < 2 {
        return (0, 0, 0.0);
    }
    let mut i0 = axis.partition_point(|&v| v <= x);
    i0 = i0.saturating_sub(1).min(axis.len() - 2);
    let i1 = i0 + 1;
    let span = axis[i1] - axis[i0];
    let frac = if span == 0.0 {
        0.0
    } else {
        (x - axis[i0]) / span
    };
    (i0, i1, frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_polar(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write polar");
        file
    }

    #[test]
    fn test_load_semicolon_grid_converts_knots() {
        let file = write_polar("twa/tws;10;20\n0;0;0\n90;5;10\n180;2;4\n");
        let polar = PolarData::load_from_file(file.path()).expect("load");

        assert_eq!(polar.tws.len(), 2);
        assert_eq!(polar.twa, vec![0.0, 90.0, 180.0]);
        // 10 knots header -> m/s
        assert!((polar.tws[0] - 10.0 / KNOTS_PER_MPS).abs() < 1e-9);
        // interior 5 knots -> m/s
        assert!((polar.speeds[1][0] - 5.0 / KNOTS_PER_MPS).abs() < 1e-9);
    }

    #[test]
    fn test_load_comma_grid_and_bad_cells_read_zero() {
        let file = write_polar("twa/tws,10,20\n0,,x\n90,5,10\n");
        let polar = PolarData::load_from_file(file.path()).expect("load");
        assert_eq!(polar.speeds[0], vec![0.0, 0.0]);
        assert!(polar.speeds[1][1] > 0.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PolarData::load_from_file("/nonexistent/polar.csv").unwrap_err();
        assert!(matches!(err, PolarLoadError::Io { .. }));
    }

    #[test]
    fn test_interpolation_midpoints() {
        let polar = PolarData {
            tws: vec![0.0, 10.0],
            twa: vec![0.0, 180.0],
            speeds: vec![vec![0.0, 10.0], vec![0.0, 10.0]],
        };
        assert!((polar.speed(5.0, 90.0) - 5.0).abs() < 1e-9);
        assert!((polar.speed(10.0, 0.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_mirrored_above_180() {
        let polar = PolarData {
            tws: vec![0.0, 10.0],
            twa: vec![0.0, 90.0, 180.0],
            speeds: vec![vec![0.0, 0.0], vec![4.0, 4.0], vec![1.0, 1.0]],
        };
        // 270 mirrors to 90
        assert!((polar.speed(5.0, 270.0) - polar.speed(5.0, 90.0)).abs() < 1e-12);
        assert!((polar.speed(5.0, -90.0) - polar.speed(5.0, 90.0)).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolation_beyond_grid() {
        let polar = PolarData {
            tws: vec![0.0, 10.0],
            twa: vec![0.0, 180.0],
            speeds: vec![vec![0.0, 10.0], vec![0.0, 10.0]],
        };
        // edge slope continues past the last grid column
        assert!((polar.speed(20.0, 90.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_polar_is_zero_speed() {
        let polar = PolarData::default();
        assert_eq!(polar.speed(10.0, 90.0), 0.0);
    }
}
