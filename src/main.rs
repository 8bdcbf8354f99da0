use ar_overlay::api::scenario::load_config;
use ar_overlay::api::Scenario;
use log::{error, info};
use serde::Serialize;
use std::path::Path;

/// One output line per projected point
#[derive(Serialize)]
struct PointLine<'a> {
    frame: usize,
    heading: f64,
    pitch: f64,
    roll: f64,
    name: &'a str,
    label: String,
    x_px: f64,
    y_px: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!(
            "Usage: {} <scenario.json> [config.json]",
            args.first().map_or("ar_overlay", |s| s.as_str())
        );
        return Err("Invalid arguments".into());
    }

    let config = load_config(args.get(2).map(Path::new))?;

    let json_data = std::fs::read_to_string(&args[1])?;
    let scenario = Scenario::from_json_str(&json_data)?;

    let report = match scenario.replay(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("Replay failed: {}", e);
            return Err(e.into());
        }
    };
    info!("Location update: {:?}", report.location_update);

    for (frame_index, frame) in report.frames.iter().enumerate() {
        for projected in &frame.points {
            let line = PointLine {
                frame: frame_index,
                heading: frame.attitude.heading,
                pitch: frame.attitude.pitch,
                roll: frame.attitude.roll,
                name: projected.point.name(),
                label: projected.label(),
                x_px: projected.x_px,
                y_px: projected.y_px,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
    }

    Ok(())
}
