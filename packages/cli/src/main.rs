#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the safe zone data service.
//!
//! Every subcommand maps onto one service operation and prints its result
//! as JSON. Run without a subcommand for an interactive menu.

mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use safe_zone_models::{Coordinates, ZoneId};
use safe_zone_service::config::ENV_CONFIG;
use safe_zone_service::{SafeZoneService, ServiceConfig, ZoneFilter, ZoneQuery};
use safe_zone_source::{HttpSource, SafeZoneSource, SimulatedSource};
use serde::Serialize;

/// Climate safe zone scores, alerts, and reports.
#[derive(Parser)]
#[command(name = "safe_zone_cli")]
#[command(about = "Climate safe zone scores, alerts, and reports")]
struct Cli {
    /// TOML config file (default: embedded config, or `SAFE_ZONE_CONFIG`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve the built-in Kigali dataset instead of calling the API.
    #[arg(long)]
    offline: bool,

    /// Subcommand to execute. Omit for the interactive menu.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List all safe zones with their scores.
    Zones,

    /// List active climate alerts.
    Alerts,

    /// Safe zones near a point, nearest first.
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Search radius in km (default from config).
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Recycling centers near a point.
    Centers {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Search radius in km (default from config).
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Current air quality at a point.
    Air {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Report an issue with a safe zone.
    Report {
        zone_id: String,
        /// Kind of issue (e.g. "Overcrowded").
        #[arg(long)]
        issue_type: String,
        #[arg(long)]
        description: String,
        /// Reporter latitude.
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        /// Reporter longitude.
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
    },

    /// List reports filed from this device.
    Reports,

    /// Manage favorite safe zones.
    Favorites {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// Score breakdown, recommendations, and climate risks for a zone.
    Insights { zone_id: String },

    /// Search safe zones by name, address, or district.
    Search {
        /// Text to match (blank matches everything).
        #[arg(default_value = "")]
        text: String,
        /// Structured filter.
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        /// District for `--filter district`.
        #[arg(long, required_if_eq("filter", "district"))]
        district: Option<String>,
    },

    /// Drop cached zones and alerts.
    ClearCache,

    /// Show whether cached data is fresh.
    Status,
}

/// Actions for the `favorites` subcommand.
#[derive(Subcommand)]
enum FavoriteAction {
    Add { zone_id: String },
    Remove { zone_id: String },
    List {
        /// Resolve ids to full zone records.
        #[arg(long)]
        details: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    HighScore,
    LowRisk,
    District,
}

impl FilterArg {
    fn into_filter(self, district: Option<String>) -> ZoneFilter {
        match self {
            Self::All => ZoneFilter::All,
            Self::HighScore => ZoneFilter::HighScore,
            Self::LowRisk => ZoneFilter::LowRisk,
            Self::District => ZoneFilter::District(district.unwrap_or_default()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));
    let config =
        ServiceConfig::load(config_path.as_deref())?.with_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;

    let service = build_service(&config, cli.offline).await?;

    match cli.command {
        Some(command) => run_command(&service, command).await,
        None => interactive::run(&service).await,
    }
}

async fn build_service(
    config: &ServiceConfig,
    offline: bool,
) -> Result<SafeZoneService, Box<dyn std::error::Error>> {
    let source: Arc<dyn SafeZoneSource> = if offline {
        log::info!("Offline mode: serving the built-in dataset");
        Arc::new(SimulatedSource::new())
    } else {
        Arc::new(HttpSource::new(config.http_source_config())?)
    };
    let store = safe_zone_service::open_store(&config.storage).await?;
    Ok(SafeZoneService::new(source, store, config)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs one subcommand and prints its result.
async fn run_command(
    service: &SafeZoneService,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Zones => print_json(&service.get_safe_zones().await),
        Commands::Alerts => print_json(&service.get_climate_alerts().await),
        Commands::Nearby { lat, lon, radius } => print_json(
            &service
                .find_nearby_safe_zones(Coordinates::new(lat, lon), radius)
                .await,
        ),
        Commands::Centers { lat, lon, radius } => {
            print_json(&service.get_nearby_recycling_centers(lat, lon, radius).await)
        }
        Commands::Air { lat, lon } => print_json(&service.get_air_quality_data(lat, lon).await),
        Commands::Report {
            zone_id,
            issue_type,
            description,
            lat,
            lon,
        } => {
            let location = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
            let result = service
                .report_issue(ZoneId::new(zone_id), &issue_type, &description, location)
                .await;
            print_json(&result)
        }
        Commands::Reports => print_json(&service.get_user_reports().await),
        Commands::Favorites { action } => match action {
            FavoriteAction::Add { zone_id } => {
                print_json(&service.add_to_favorites(&ZoneId::new(zone_id)).await)
            }
            FavoriteAction::Remove { zone_id } => {
                print_json(&service.remove_from_favorites(&ZoneId::new(zone_id)).await)
            }
            FavoriteAction::List { details: true } => {
                print_json(&service.get_favorite_zone_details().await)
            }
            FavoriteAction::List { details: false } => {
                print_json(&service.get_favorite_safe_zones().await)
            }
        },
        Commands::Insights { zone_id } => {
            match service.get_zone_insights(&ZoneId::new(zone_id.as_str())).await {
                Some(insights) => print_json(&insights),
                None => {
                    println!("No safe zone with id {zone_id}");
                    Ok(())
                }
            }
        }
        Commands::Search {
            text,
            filter,
            district,
        } => {
            let query = ZoneQuery::new(text, filter.into_filter(district));
            print_json(&service.search_safe_zones(&query).await)
        }
        Commands::ClearCache => print_json(&service.clear_cache().await),
        Commands::Status => {
            println!("Source:     {}", service.source_name());
            println!("Fresh data: {}", service.has_fresh_data());
            Ok(())
        }
    }
}
