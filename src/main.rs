mod catalog;
mod clock;
mod propagation;
mod web;

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::catalog::tle::line_checksum_valid;
use crate::clock::SimClock;
use crate::propagation::{
    ecef_to_geodetic, format_display, orbital_stats, to_earth_fixed, Propagator,
};
use crate::web::{build_aggregator, Config};

#[derive(Parser)]
#[command(name = "satwatch")]
#[command(about = "Satellite catalog service and orbital toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog web service
    Serve {
        #[arg(long)]
        config: Option<String>,
    },
    /// Run one catalog acquisition cycle and print a summary
    Fetch {
        #[arg(long)]
        config: Option<String>,
    },
    /// Validate the checksums of a local TLE file
    Check { file: String },
    /// Fetch historical element sets for one object over a date window
    History {
        #[arg(long)]
        config: Option<String>,
        /// Catalog number
        #[arg(long)]
        id: String,
        /// Window start, YYYY-MM-DD
        #[arg(long)]
        start: chrono::NaiveDate,
        /// Window end, YYYY-MM-DD
        #[arg(long)]
        stop: chrono::NaiveDate,
    },
    /// Print live geodetic fixes for one object under a simulated clock
    Track {
        #[arg(long)]
        config: Option<String>,
        /// Catalog number of the object to follow
        #[arg(long)]
        id: String,
        /// Simulated-time multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Wall-clock time between frames, e.g. "1s", "250ms"
        #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
        interval: std::time::Duration,
        /// Number of frames to print before exiting; unbounded when omitted
        #[arg(long)]
        frames: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::Fetch { config } => fetch(config.as_deref()).await,
        Commands::Check { file } => check(&file),
        Commands::History {
            config,
            id,
            start,
            stop,
        } => history(config.as_deref(), &id, start, stop).await,
        Commands::Track {
            config,
            id,
            speed,
            interval,
            frames,
        } => track(config.as_deref(), &id, speed, interval, frames).await,
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    match Config::load(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

async fn serve(config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn fetch(config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    let aggregator = match build_aggregator(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let status = aggregator.refresh().await;
    let snapshot = match aggregator.snapshot() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("{} satellites [{}]", snapshot.satellites.len(), status);

    if snapshot.satellites.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn check(path: &str) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect();

    let mut valid = 0usize;
    let mut rejected = 0usize;
    for block in lines.chunks(3) {
        if block.len() < 3 {
            println!("  (trailing partial block discarded)");
            break;
        }
        let name = block[0].trim();
        if line_checksum_valid(block[1]) && line_checksum_valid(block[2]) {
            valid += 1;
        } else {
            rejected += 1;
            println!("  checksum failure: {}", name);
        }
    }

    println!("{} valid, {} rejected", valid, rejected);
    if rejected == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn history(
    config_path: Option<&str>,
    id: &str,
    start: chrono::NaiveDate,
    stop: chrono::NaiveDate,
) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    let fetcher = match catalog::GroupFetcher::new(
        config.catalog.sources.clone(),
        config.catalog.request_timeout,
    ) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match fetcher.fetch_object_history(id, start, stop).await {
        Ok(records) => {
            println!("{} element sets for {}", records.len(), id);
            for record in records {
                println!("{}\n{}\n{}", record.name, record.line1, record.line2);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn track(
    config_path: Option<&str>,
    id: &str,
    speed: f64,
    interval: std::time::Duration,
    frames: Option<u64>,
) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    let aggregator = match build_aggregator(&config) {
        Ok(a) => Arc::new(a),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    aggregator.refresh().await;
    let snapshot = match aggregator.snapshot() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(satellite) = snapshot.satellites.iter().find(|s| s.id == id) else {
        eprintln!("No object with catalog number {} in the catalog", id);
        return ExitCode::FAILURE;
    };

    println!("Tracking {} ({}), speed {}x", satellite.name, satellite.id, speed);
    if let Some(stats) = orbital_stats(&satellite.tle1, &satellite.tle2, Utc::now()) {
        println!(
            "  intl {}  period {:.1} min  apogee {:.0} km  perigee {:.0} km",
            stats.intl_designator, stats.period_min, stats.apogee_km, stats.perigee_km
        );
    }

    let Some(propagator) = Propagator::new(&satellite.tle1, &satellite.tle2) else {
        eprintln!("Element set for {} is unusable", id);
        return ExitCode::FAILURE;
    };

    let mut sim = SimClock::new(Utc::now());
    sim.set_speed(speed);
    let mut ticker = tokio::time::interval(interval);
    let mut frame = 0u64;

    loop {
        ticker.tick().await;
        sim.tick(Utc::now());

        // One clock read per frame; every derived value uses it.
        let at = sim.sim_time;
        let state = propagator.state_at(at);
        let geodetic = state.map(|sv| ecef_to_geodetic(to_earth_fixed(sv.position, at)));
        let coords = format_display(geodetic.as_ref());
        let speed_km_s = state
            .map(|sv| {
                (sv.velocity[0].powi(2) + sv.velocity[1].powi(2) + sv.velocity[2].powi(2)).sqrt()
            })
            .unwrap_or(0.0);

        println!(
            "{}  lat {}  lon {}  alt {} km  vel {:.2} km/s",
            at.format("%Y-%m-%dT%H:%M:%SZ"),
            coords.lat,
            coords.lon,
            coords.alt,
            speed_km_s
        );

        frame += 1;
        if frames.is_some_and(|limit| frame >= limit) {
            break;
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_accepts_humantime_interval() {
        let cli = Cli::try_parse_from([
            "satwatch", "track", "--id", "25544", "--interval", "250ms",
        ])
        .unwrap();
        let Commands::Track {
            speed, interval, ..
        } = cli.command
        else {
            panic!("expected track subcommand");
        };
        assert_eq!(interval, std::time::Duration::from_millis(250));
        assert_eq!(speed, 1.0);
    }

    #[test]
    fn track_interval_defaults_to_one_second() {
        let cli = Cli::try_parse_from(["satwatch", "track", "--id", "25544"]).unwrap();
        let Commands::Track { interval, .. } = cli.command else {
            panic!("expected track subcommand");
        };
        assert_eq!(interval, std::time::Duration::from_secs(1));
    }
}
