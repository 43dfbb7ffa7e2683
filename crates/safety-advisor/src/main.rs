//! Travel Safety Check CLI
//!
//! Usage:
//!   safety-check zone --lat 28.62 --lon 77.21 --zones data/zones.json --all
//!   safety-check weather --temp 20 --history 12 14 13
//!   safety-check overlay --zones data/zones.json --output overlay.geojson

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geofence::overlay::{self, ZoneShape, DEFAULT_RING_SEGMENTS};
use geofence::{enclosing_zones, find_enclosing_zone, Coordinate, ZoneEvent};
use safety_advisor::{Advisory, SafetyAdvisor};
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use weather_risk::{classify, historical_average};

#[derive(Parser, Debug)]
#[command(name = "safety-check", about = "Check danger zones and weather risk for a location")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the danger zone enclosing a coordinate
    Zone {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Zones JSON file (built-in New Delhi zones if omitted)
        #[arg(short, long)]
        zones: Option<PathBuf>,

        /// List every enclosing zone, most severe first
        #[arg(long)]
        all: bool,
    },

    /// Classify a temperature
    Weather {
        /// Current temperature (Celsius)
        #[arg(long, allow_negative_numbers = true)]
        temp: f64,

        /// Recent daily average temperatures (Celsius)
        #[arg(long, num_args = 1.., allow_negative_numbers = true)]
        history: Vec<f64>,
    },

    /// Write a GeoJSON overlay of zones and attractions
    Overlay {
        #[arg(short, long)]
        zones: Option<PathBuf>,

        #[arg(short, long)]
        attractions: Option<PathBuf>,

        /// Output GeoJSON file
        #[arg(short, long, default_value = "safety_overlay.geojson")]
        output: PathBuf,

        /// Draw zones as circle polygons instead of points
        #[arg(long)]
        polygons: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Zone {
            lat,
            lon,
            zones,
            all,
        } => check_zone(lat, lon, zones, all),
        Command::Weather { temp, history } => check_weather(temp, &history),
        Command::Overlay {
            zones,
            attractions,
            output,
            polygons,
        } => write_overlay(zones, attractions, output, polygons),
    }
}

fn check_zone(lat: f64, lon: f64, zones: Option<PathBuf>, all: bool) -> Result<()> {
    let point = Coordinate::new(lat, lon).context("invalid coordinate")?;
    let advisor = SafetyAdvisor::from_files(zones.as_deref(), None)?;

    info!("Checking {} against {} zones", point.maps_link(), advisor.zones().len());

    let enclosing = find_enclosing_zone(&point, advisor.zones());
    let advisory = enclosing.and_then(|zone| {
        Advisory::from_zone_event(&ZoneEvent::Entered {
            zone: zone.clone(),
            distance_m: zone.distance_from(&point),
        })
    });

    match &advisory {
        Some(a) => warn!("{}", a.body),
        None => info!("Not inside any danger zone"),
    }

    let mut report = json!({
        "location": point,
        "enclosing": enclosing,
        "advisory": advisory,
    });
    if all {
        report["matches"] = serde_json::to_value(enclosing_zones(&point, advisor.zones()))?;
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn check_weather(temp: f64, history: &[f64]) -> Result<()> {
    if !temp.is_finite() {
        anyhow::bail!("temperature must be a finite number");
    }

    let avg = historical_average(history);
    match avg {
        Some(avg) => info!("Historical average over {} days: {:.1}°C", history.len(), avg),
        None => info!("No historical data; classifying without comparison"),
    }

    let alert = classify(temp, avg);
    if alert.is_safety_alert_active() {
        warn!("{}", alert.message);
    } else {
        info!("{}", alert.message);
    }

    println!("{}", serde_json::to_string_pretty(&alert)?);
    Ok(())
}

fn write_overlay(
    zones: Option<PathBuf>,
    attractions: Option<PathBuf>,
    output: PathBuf,
    polygons: bool,
) -> Result<()> {
    let advisor = SafetyAdvisor::from_files(zones.as_deref(), attractions.as_deref())?;

    let shape = if polygons {
        ZoneShape::Polygon {
            segments: DEFAULT_RING_SEGMENTS,
        }
    } else {
        ZoneShape::Point
    };
    let collection = overlay::to_geojson(advisor.zones(), advisor.attractions(), shape);

    info!("Writing GeoJSON to {:?}", output);
    let file = File::create(&output).with_context(|| format!("creating {:?}", output))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &collection)?;

    info!(
        "{} features ({} zones, {} attractions)",
        collection.features.len(),
        advisor.zones().len(),
        advisor.attractions().len()
    );
    Ok(())
}
