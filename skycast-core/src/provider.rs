use crate::{
    Config,
    error::FetchError,
    model::{Coordinate, WeatherRecord},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of current-weather observations.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the current weather at `coordinate`. Issues exactly one
    /// request per invocation and never retries.
    async fn current_weather(
        &self,
        coordinate: Coordinate,
    ) -> Result<WeatherRecord, FetchError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.require_api_key()?;

    let client = OpenWeatherClient::new(
        config.base_url.clone(),
        api_key.to_owned(),
        config.units.clone(),
        config.http_timeout(),
    )?;

    Ok(client)
}
