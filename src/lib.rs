pub mod engine;
pub mod parsers;

pub use engine::config::{Optimization, RoutingConfig, StepMode};
pub use engine::constraints::{
    ConstraintList, LandCrossing, RouteConstraint, WaterDepthLimit, WaveHeightLimit,
};
pub use engine::error::RoutingError;
pub use engine::frontier::FrontierState;
pub use engine::mask::LandMask;
pub use engine::models::{Coordinate, RouteKind, RoutePoint, RouteResult, WindData};
pub use engine::physics::{BoatModel, FixedSpeedBoat, PolarBoat, ShipParams};
pub use engine::router::RoutingController;
pub use engine::weather::{ScalarField, UniformWind, WeatherProvider, WindField};
pub use parsers::polars::PolarData;
