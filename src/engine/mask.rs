use std::io;
use std::path::Path;

use log::info;
use roaring::RoaringTreemap;

use crate::engine::models::Coordinate;

pub const NX: u64 = 86400;
pub const NY: u64 = 43200;

/// Global land/sea raster backed by a roaring treemap. A set bit means land.
#[derive(Debug, Default)]
pub struct LandMask {
    mask: RoaringTreemap,
}

impl LandMask {
    /// An all-sea mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a high-resolution mask from an xz-compressed serialized treemap.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        use std::io::BufReader;
        use xz2::read::XzDecoder;

        info!("Loading land mask from {:?}", path.as_ref());

        let file = std::fs::File::open(&path)?;
        let reader = BufReader::new(file);
        let decoder = XzDecoder::new(reader);

        let mask = RoaringTreemap::deserialize_from(decoder)?;
        info!("Land mask loaded, {} cells flagged as land", mask.len());

        Ok(Self { mask })
    }

    fn coords_to_indices(&self, lon: f64, lat: f64) -> (u64, u64) {
        // Affine transform: 240 cells per degree, origin at (-180, -90)
        let x = (lon * 240.0 + 43200.0) as u64;
        let y = (lat * 240.0 + 21600.0) as u64;
        (x.clamp(0, NX - 1), y.clamp(0, NY - 1))
    }

    /// Rasterises a rectangular bounding box as land. Used by tests and
    /// demos that run without the full mask file.
    pub fn add_land_box(&mut self, min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) {
        let (min_x, min_y) = self.coords_to_indices(min_lon, min_lat);
        let (max_x, max_y) = self.coords_to_indices(max_lon, max_lat);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.mask.insert(y * NX + x);
            }
        }
    }

    /// Checks if a coordinate is over land.
    pub fn is_land(&self, coord: &Coordinate) -> bool {
        let (x, y) = self.coords_to_indices(coord.lon, coord.lat);
        if y >= NY {
            return false;
        }
        self.mask.contains(y * NX + x)
    }
}
