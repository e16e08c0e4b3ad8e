mod catalog;
mod mount;
mod predict;
mod track;
mod tracker;
mod web;

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex as StdMutex};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::catalog::{Catalog, CatalogError};
use crate::mount::{lock_mount, MountDispatcher, MountError, SerialPortProvider, SharedMount};
use crate::predict::{ObserverSlot, PredictError, Propagator, Sgp4Propagator};
use crate::track::{generate_path, rank_targets, PathBook, PathError, RankError};
use crate::tracker::{preview_pointing, spawn_event_logger, Tracker, TrackerError};
use crate::web::state::AppState;
use crate::web::config::ConfigError;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "sat-mount")]
#[command(about = "Satellite ground tracks, target ranking and antenna mount control")]
struct Cli {
    /// Station configuration file
    #[arg(long, short, global = true, default_value = "config.yaml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP control API
    Serve,
    /// Print the ground track of a target as JSON
    Path { norad_id: u32 },
    /// List targets by distance to the observer in five minutes
    Rank {
        /// Show at most this many targets
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print the look angles of a target over the next few minutes
    Pointing { norad_id: u32 },
    /// Stream a target to the mount until Ctrl-C
    Track { norad_id: u32 },
    /// List serial adapters
    Devices,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("path: {0}")]
    Path(#[from] PathError),
    #[error("ranking: {0}")]
    Rank(#[from] RankError),
    #[error("prediction: {0}")]
    Predict(#[from] PredictError),
    #[error("mount: {0}")]
    Mount(#[from] MountError),
    #[error("tracker: {0}")]
    Tracker(#[from] TrackerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match Config::from_file(&cli.config) {
        Ok(config) => match cli.command {
            Commands::Serve => serve(config).await,
            Commands::Path { norad_id } => path(&config, norad_id),
            Commands::Rank { limit } => rank(&config, limit),
            Commands::Pointing { norad_id } => pointing(&config, norad_id),
            Commands::Track { norad_id } => track(&config, norad_id).await,
            Commands::Devices => devices(&config),
        },
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn observer_slot(config: &Config) -> Result<ObserverSlot, CliError> {
    Ok(match config.observer()? {
        Some(observer) => {
            log::info!(
                "Station {} at {:.4}, {:.4}",
                config.station_name().unwrap_or("(unnamed)"),
                observer.latitude_deg,
                observer.longitude_deg
            );
            ObserverSlot::with(observer)
        }
        None => {
            log::warn!("No station configured; set the observer before ranking or tracking");
            ObserverSlot::new()
        }
    })
}

fn shared_mount(config: &Config) -> SharedMount {
    MountDispatcher::new(
        Box::new(SerialPortProvider),
        config.mount.serial_settings(),
    )
    .shared()
}

fn new_tracker(
    config: &Config,
    propagator: Arc<dyn Propagator>,
    mount: SharedMount,
    observer: ObserverSlot,
) -> Tracker {
    let tracker = Tracker::new(propagator, mount, observer, config.tracker.cadence);
    spawn_event_logger(tracker.subscribe());
    tracker
}

async fn serve(config: Config) -> Result<(), CliError> {
    let catalog = Catalog::from_file(&config.catalog.tle_file)?;
    if catalog.is_empty() {
        log::warn!("Catalog {} has no usable TLE sets", config.catalog.tle_file.display());
    }
    let observer = observer_slot(&config)?;
    let propagator: Arc<dyn Propagator> = Arc::new(Sgp4Propagator::new());
    let mount = shared_mount(&config);
    let tracker = new_tracker(&config, propagator.clone(), mount.clone(), observer.clone());
    let tracker = Arc::new(Mutex::new(tracker));
    let bind_addr = config.web.bind.clone();

    let state = AppState {
        config: Arc::new(config),
        catalog: Arc::new(catalog),
        propagator,
        observer,
        mount: mount.clone(),
        tracker: tracker.clone(),
        paths: Arc::new(StdMutex::new(PathBook::new())),
    };
    web::run_server(&bind_addr, state).await?;

    let mut tracker = tracker.lock().await;
    if tracker.is_streaming() {
        tracker.stop().await?;
    } else {
        let mut mount = lock_mount(&mount);
        if mount.is_open() {
            mount.park_and_close();
        }
    }
    Ok(())
}

fn path(config: &Config, norad_id: u32) -> Result<(), CliError> {
    let catalog = Catalog::from_file(&config.catalog.tle_file)?;
    let target = catalog.target(norad_id)?;
    let window = config.paths.window(Utc::now())?;
    let track = generate_path(&Sgp4Propagator::new(), &target, &window, &config.filter)?;
    println!("{}", serde_json::to_string_pretty(&track)?);
    Ok(())
}

fn rank(config: &Config, limit: usize) -> Result<(), CliError> {
    let catalog = Catalog::from_file(&config.catalog.tle_file)?;
    let observer = config.observer()?;
    let ranked = rank_targets(
        &catalog.targets(),
        observer.as_ref(),
        &Sgp4Propagator::new(),
        Utc::now(),
        &config.ranking.params(),
        &config.filter,
    )?;

    println!("{:>7}  {:<24} {:>10}", "NORAD", "NAME", "DIST (km)");
    for entry in ranked.iter().take(limit) {
        println!(
            "{:>7}  {:<24} {:>10.1}",
            entry.target.norad_id, entry.target.name, entry.distance_km
        );
    }
    Ok(())
}

fn pointing(config: &Config, norad_id: u32) -> Result<(), CliError> {
    let catalog = Catalog::from_file(&config.catalog.tle_file)?;
    let target = catalog.target(norad_id)?;
    let observer = config.observer()?.ok_or(TrackerError::ObserverUnavailable)?;
    let window = config.pointing.window(Utc::now())?;
    let preview = preview_pointing(&Sgp4Propagator::new(), &target, &observer, &window)?;

    println!("{} (NORAD {})", preview.name, preview.norad_id);
    println!("{:<24} {:>8} {:>8}", "TIME (UTC)", "AZ", "EL");
    for sample in &preview.samples {
        println!(
            "{:<24} {:>8.2} {:>8.2}",
            sample.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            sample.azimuth_deg,
            sample.elevation_deg
        );
    }
    Ok(())
}

async fn track(config: &Config, norad_id: u32) -> Result<(), CliError> {
    let catalog = Catalog::from_file(&config.catalog.tle_file)?;
    let target = catalog.target(norad_id)?;
    let mount = shared_mount(config);
    let device = lock_mount(&mount).open()?;
    log::info!("Using {}", device.path);

    let mut tracker = new_tracker(
        config,
        Arc::new(Sgp4Propagator::new()),
        mount,
        observer_slot(config)?,
    );
    tracker.start(target).await?;

    tokio::signal::ctrl_c().await?;
    log::info!("Shutdown signal received");
    tracker.stop().await?;
    Ok(())
}

fn devices(config: &Config) -> Result<(), CliError> {
    let mount = shared_mount(config);
    let devices = lock_mount(&mount).devices()?;
    if devices.is_empty() {
        println!("No serial adapters found");
    }
    for device in devices {
        let marker = if device.is_compatible() { "*" } else { " " };
        println!("{} {:<20} {:?}", marker, device.path, device.kind);
    }
    Ok(())
}
