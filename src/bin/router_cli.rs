use std::time::Instant;

use chrono::Utc;
use windrouter::{
    BoatModel, ConstraintList, Coordinate, FixedSpeedBoat, PolarBoat, PolarData, RoutingConfig,
    RoutingController, StepMode, UniformWind, WindData,
};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    println!("--- windrouter CLI ---");

    // Off the coast of Brittany, towards the Azores
    let start = Coordinate::new(48.0, -5.0);
    let destination = Coordinate::new(40.0, -10.0);

    // 20 knots from the North
    let wind = WindData { u: 0.0, v: -10.288 };

    let boat: Box<dyn BoatModel> = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading polar from {}...", path);
            let polar = PolarData::load_from_file(&path).expect("unable to load polar file");
            println!(
                "Polar loaded: {} TWA, {} TWS points",
                polar.twa.len(),
                polar.tws.len()
            );
            Box::new(PolarBoat::new(
                polar,
                Box::new(UniformWind::new(wind)),
                0.08,
                85.0,
            ))
        }
        None => {
            println!("No polar file given, sailing a fixed 5 m/s boat");
            Box::new(FixedSpeedBoat {
                speed_ms: 5.0,
                fuel_rate_kg_s: 0.08,
                rpm: 85.0,
            })
        }
    };

    let config = RoutingConfig {
        mode: StepMode::FixedTime { seconds: 4.0 * 3600.0 },
        ..RoutingConfig::default()
    };

    let mut controller = RoutingController::new(config, boat.as_ref(), ConstraintList::new())
        .expect("invalid routing configuration")
        .with_observer(|state| {
            println!(
                "step {}: front holds {} candidates",
                state.count,
                state.width()
            );
        });

    let started = Instant::now();
    match controller.run(start, destination, Utc::now()) {
        Ok(routes) => {
            println!("Calculation time: {:?}", started.elapsed());
            for route in &routes {
                println!("\n=== {} ===", route.kind);
                println!(
                    "distance: {:.1} km, time: {:.1} h, fuel: {:.0} kg",
                    route.total_distance_m / 1000.0,
                    route.total_time_s / 3600.0,
                    route.total_fuel_kg
                );
                for point in &route.points {
                    println!(
                        "  {:>7.3} {:>8.3}  hdg {}  +{:.1} h",
                        point.lat,
                        point.lon,
                        point
                            .heading_deg
                            .map_or("  --  ".to_string(), |h| format!("{:6.1}", h)),
                        point.elapsed_s / 3600.0
                    );
                }
            }
        }
        Err(err) => {
            eprintln!("routing failed: {}", err);
            std::process::exit(1);
        }
    }
}
