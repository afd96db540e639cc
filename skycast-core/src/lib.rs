//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location acquisition (permissions, one-shot fix)
//! - The OpenWeather current-weather client
//! - The last-result cache and the screen presenter
//! - The screen flow tying them together
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod net;
pub mod present;
pub mod provider;
pub mod screen;

pub use cache::LastReportCache;
pub use config::{Config, LocationConfig, LocationSourceKind};
pub use error::{FetchError, LocationError};
pub use location::{
    FixRequest, IpLocator, LocationService, Permission, PermissionDecision, acquire_fix,
};
pub use model::{Condition, Coordinate, WeatherRecord};
pub use net::network_available;
pub use present::{Presenter, WeatherIcon, WeatherView};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient, provider_from_config};
pub use screen::{Notice, ScreenSink, WeatherScreen};
