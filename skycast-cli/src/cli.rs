use anyhow::Context;
use chrono::{FixedOffset, Local};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Select, Text};

use skycast_core::{
    Config, Coordinate, FixRequest, LastReportCache, LocationSourceKind, Presenter, WeatherScreen,
    network_available, present::locale_country, provider_from_config,
};

use crate::screen_io::{CliLocationService, TerminalSink};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and location preferences.
    Configure,

    /// Show the weather screen, then offer the Refresh menu.
    Show {
        /// Latitude override; skips the location service.
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,

        /// Longitude override; skips the location service.
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,

        /// Grant the location permission for this run without prompting.
        #[arg(long)]
        yes: bool,

        /// Render once and exit instead of offering the Refresh menu.
        #[arg(long)]
        once: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                lat,
                lon,
                yes,
                once,
            } => show(lat.zip(lon), yes, once).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_initial_value(config.api_key.as_deref().unwrap_or(""))
        .prompt()
        .context("Configuration requires an interactive terminal")?;
    config.api_key = Some(api_key.trim().to_string()).filter(|key| !key.is_empty());

    let source = Select::new(
        "Location source:",
        vec!["ip lookup", "manual coordinate", "off"],
    )
    .prompt()?;

    config.location.source = match source {
        "manual coordinate" => {
            config.location.latitude = Some(
                CustomType::<f64>::new("Latitude:")
                    .with_error_message("Enter a decimal number")
                    .prompt()?,
            );
            config.location.longitude = Some(
                CustomType::<f64>::new("Longitude:")
                    .with_error_message("Enter a decimal number")
                    .prompt()?,
            );
            LocationSourceKind::Manual
        }
        "off" => LocationSourceKind::Off,
        _ => LocationSourceKind::Ip,
    };

    let always_allow = Confirm::new("Allow location access without asking each run?")
        .with_default(config.location.allow == Some(true))
        .prompt()?;
    // "No" means ask again next run, not a standing denial.
    config.location.allow = always_allow.then_some(true);

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn show(coordinate: Option<(f64, f64)>, yes: bool, once: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let cache = LastReportCache::at_default_location()?;

    let location = match coordinate {
        Some((latitude, longitude)) => CliLocationService::manual_override(
            Coordinate {
                latitude,
                longitude,
            },
            &config.location,
        )?,
        None => CliLocationService::from_config(&config.location, yes)?,
    };

    let presenter = Presenter::new(
        locale_country().unwrap_or_default(),
        device_utc_offset(),
    );
    let sink = TerminalSink::new(Config::config_file_path()?);
    let fix_request = FixRequest {
        timeout: config.location.fix_timeout(),
        ..FixRequest::default()
    };

    let screen = WeatherScreen::new(
        provider,
        location,
        sink,
        network_available,
        cache,
        presenter,
        fix_request,
    );

    // Ctrl-C tears the screen down; in-flight work is abandoned.
    let cancel = screen.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    screen.start().await;

    if once {
        return Ok(());
    }

    let token = screen.cancellation_token();
    while !token.is_cancelled() {
        match Select::new("Menu", vec!["Refresh"])
            .with_help_message("Esc to quit")
            .prompt()
        {
            Ok(_) => screen.refresh().await,
            // Esc, Ctrl-C, or no terminal: leave the screen.
            Err(_) => break,
        }
    }

    Ok(())
}

fn device_utc_offset() -> FixedOffset {
    *Local::now().offset()
}
