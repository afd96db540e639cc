//! Terminal implementations of the screen's platform seams: the output
//! sink and the location service.

use async_trait::async_trait;
use inquire::{Confirm, InquireError, Select};
use std::path::PathBuf;
use tracing::debug;

use skycast_core::{
    Coordinate, FixRequest, IpLocator, LocationConfig, LocationError, LocationService,
    LocationSourceKind, Notice, Permission, PermissionDecision, ScreenSink, WeatherView,
};

/// Prints the weather card and notices to the terminal.
pub struct TerminalSink {
    config_path: PathBuf,
}

impl TerminalSink {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    // App-settings analog: open the config file, falling back to its
    // directory when no handler takes the file itself.
    fn open_settings(&self) {
        if open::that(&self.config_path).is_ok() {
            return;
        }
        if let Some(dir) = self.config_path.parent() {
            if open::that(dir).is_ok() {
                return;
            }
        }
        println!("Settings file: {}", self.config_path.display());
    }

    fn rationale_dialog(&self) {
        let choice = Select::new(
            "Location permission is turned off for this feature. It can be enabled in the settings file.",
            vec!["Go to settings", "Cancel"],
        )
        .prompt();

        match choice {
            Ok("Go to settings") => self.open_settings(),
            Ok(_) => {}
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {}
            Err(error) => {
                // Not a terminal; print the path instead of a dialog.
                debug!(%error, "rationale dialog unavailable");
                println!(
                    "Location permission denied. Enable it in {}",
                    self.config_path.display()
                );
            }
        }
    }
}

impl ScreenSink for TerminalSink {
    fn render(&self, view: &WeatherView) {
        println!();
        println!("{}, {}   [{}]", view.location_name, view.country, view.icon.asset());
        println!(
            "{}   ({} / {})",
            view.temperature, view.temp_min, view.temp_max
        );
        println!("Humidity: {}", view.humidity);
        println!("Wind: {}", view.wind_speed);
        println!("Sunrise: {}   Sunset: {}", view.sunrise, view.sunset);
        if !view.condition_label.is_empty() {
            println!("{}: {}", view.condition_label, view.condition_description);
        }
        println!();
    }

    fn notice(&self, notice: Notice) {
        match notice {
            Notice::NoInternet => println!("No internet connection."),
            Notice::LocationProviderDisabled => {
                println!("Location is turned off. Please turn it on.");
                self.open_settings();
            }
            Notice::PermissionRationale => self.rationale_dialog(),
        }
    }

    fn progress_started(&self) {
        println!("Please wait, fetching the weather...");
    }

    fn progress_dismissed(&self) {}
}

/// Location facility backed by the config file: a manual coordinate, a
/// network-based lookup, or nothing at all.
pub struct CliLocationService {
    source: LocationSourceKind,
    allow: Option<bool>,
    manual: Option<Coordinate>,
    locator: IpLocator,
}

impl CliLocationService {
    pub fn from_config(location: &LocationConfig, assume_granted: bool) -> anyhow::Result<Self> {
        let locator = IpLocator::new(location.geolocation_url.clone(), location.fix_timeout())?;

        Ok(Self {
            source: location.source,
            allow: if assume_granted {
                Some(true)
            } else {
                location.allow
            },
            manual: location.manual_coordinate(),
            locator,
        })
    }

    /// An explicit coordinate from the command line bypasses both the
    /// permission prompt and the lookup.
    pub fn manual_override(
        coordinate: Coordinate,
        location: &LocationConfig,
    ) -> anyhow::Result<Self> {
        let locator = IpLocator::new(location.geolocation_url.clone(), location.fix_timeout())?;

        Ok(Self {
            source: LocationSourceKind::Manual,
            allow: Some(true),
            manual: Some(coordinate),
            locator,
        })
    }
}

#[async_trait]
impl LocationService for CliLocationService {
    fn is_enabled(&self) -> bool {
        match self.source {
            LocationSourceKind::Ip => true,
            LocationSourceKind::Manual => self.manual.is_some(),
            LocationSourceKind::Off => false,
        }
    }

    async fn request_permissions(&self, _permissions: &[Permission]) -> PermissionDecision {
        match self.allow {
            Some(true) => PermissionDecision::Granted,
            Some(false) => PermissionDecision::Denied,
            None => {
                let answer = Confirm::new("Allow skycast to access your location?")
                    .with_default(true)
                    .prompt();
                match answer {
                    Ok(true) => PermissionDecision::Granted,
                    // A dismissed or unavailable prompt counts as denial.
                    Ok(false) | Err(_) => PermissionDecision::Denied,
                }
            }
        }
    }

    async fn request_fix(&self, request: &FixRequest) -> Result<Coordinate, LocationError> {
        match self.source {
            LocationSourceKind::Off => Err(LocationError::ProviderDisabled),
            LocationSourceKind::Manual => self.manual.ok_or(LocationError::ProviderDisabled),
            LocationSourceKind::Ip => match request.timeout {
                Some(timeout) => tokio::time::timeout(timeout, self.locator.locate())
                    .await
                    .map_err(|_| LocationError::Timeout)?,
                None => self.locator.locate().await,
            },
        }
    }
}
