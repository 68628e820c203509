//! Menu-driven front end for the safe zone service.
//!
//! Each menu entry prompts for the arguments of one subcommand and then runs
//! it exactly as the command line would.

use dialoguer::{Input, Select};
use safe_zone_service::SafeZoneService;

use crate::{Commands, FavoriteAction, FilterArg};

/// Runs the menu loop until the user exits.
///
/// # Errors
///
/// Returns an error if a prompt or the JSON output fails.
pub async fn run(service: &SafeZoneService) -> Result<(), Box<dyn std::error::Error>> {
    println!("Climate Safe Zones ({})", service.source_name());

    loop {
        println!();
        let items = &[
            "List safe zones",
            "Climate alerts",
            "Safe zones near me",
            "Recycling centers near me",
            "Air quality",
            "Report an issue",
            "My reports",
            "Favorites",
            "Zone insights",
            "Search safe zones",
            "Clear cache",
            "Status",
            "Exit",
        ];

        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(items)
            .default(0)
            .interact()?;

        let command = match selection {
            0 => Commands::Zones,
            1 => Commands::Alerts,
            2 => {
                let (lat, lon) = prompt_location()?;
                Commands::Nearby {
                    lat,
                    lon,
                    radius: prompt_radius()?,
                }
            }
            3 => {
                let (lat, lon) = prompt_location()?;
                Commands::Centers {
                    lat,
                    lon,
                    radius: prompt_radius()?,
                }
            }
            4 => {
                let (lat, lon) = prompt_location()?;
                Commands::Air { lat, lon }
            }
            5 => Commands::Report {
                zone_id: prompt_text("Zone id", false)?,
                issue_type: prompt_text("Issue type", false)?,
                description: prompt_text("Description", false)?,
                lat: None,
                lon: None,
            },
            6 => Commands::Reports,
            7 => Commands::Favorites {
                action: prompt_favorite_action()?,
            },
            8 => Commands::Insights {
                zone_id: prompt_text("Zone id", false)?,
            },
            9 => prompt_search()?,
            10 => Commands::ClearCache,
            11 => Commands::Status,
            _ => {
                println!("Goodbye.");
                return Ok(());
            }
        };

        crate::run_command(service, command).await?;
    }
}

fn prompt_text(prompt: &str, allow_empty: bool) -> Result<String, dialoguer::Error> {
    Input::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
}

fn prompt_location() -> Result<(f64, f64), dialoguer::Error> {
    let lat: f64 = Input::new()
        .with_prompt("Latitude")
        .default(-1.9501)
        .interact_text()?;
    let lon: f64 = Input::new()
        .with_prompt("Longitude")
        .default(30.0588)
        .interact_text()?;
    Ok((lat, lon))
}

fn prompt_radius() -> Result<Option<f64>, dialoguer::Error> {
    let radius = prompt_text("Radius in km (blank for default)", true)?;
    Ok(radius.trim().parse().ok())
}

fn prompt_favorite_action() -> Result<FavoriteAction, dialoguer::Error> {
    let items = &["List", "List with details", "Add", "Remove"];
    let selection = Select::new()
        .with_prompt("Favorites")
        .items(items)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => FavoriteAction::List { details: false },
        1 => FavoriteAction::List { details: true },
        2 => FavoriteAction::Add {
            zone_id: prompt_text("Zone id", false)?,
        },
        _ => FavoriteAction::Remove {
            zone_id: prompt_text("Zone id", false)?,
        },
    })
}

fn prompt_search() -> Result<Commands, dialoguer::Error> {
    let text = prompt_text("Search text (blank for all)", true)?;
    let items = &["All", "High score", "Low risk", "District"];
    let selection = Select::new()
        .with_prompt("Filter")
        .items(items)
        .default(0)
        .interact()?;

    let (filter, district) = match selection {
        0 => (FilterArg::All, None),
        1 => (FilterArg::HighScore, None),
        2 => (FilterArg::LowRisk, None),
        _ => (FilterArg::District, Some(prompt_text("District", false)?)),
    };
    Ok(Commands::Search {
        text,
        filter,
        district,
    })
}
