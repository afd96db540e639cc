use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::model::{Condition, Coordinate, WeatherRecord};

use super::WeatherProvider;

/// OpenWeather current-weather client.
///
/// The endpoint and credentials are injected so tests can point it at a
/// local double.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        units: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            units: units.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/2.5/weather", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    wind: OwWind,
    weather: Vec<OwWeather>,
}

impl From<OwCurrentResponse> for WeatherRecord {
    fn from(parsed: OwCurrentResponse) -> Self {
        WeatherRecord {
            location_name: parsed.name,
            country_code: parsed.sys.country,
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| Condition {
                    main_label: w.main,
                    description: w.description,
                    icon_code: w.icon,
                })
                .collect(),
            temperature: parsed.main.temp,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity_percent: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            sunrise_epoch: parsed.sys.sunrise,
            sunset_epoch: parsed.sys.sunset,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(
        &self,
        coordinate: Coordinate,
    ) -> Result<WeatherRecord, FetchError> {
        let response = self
            .http
            .get(self.endpoint())
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("units", self.units.clone()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "weather request rejected");
            return Err(match status.as_u16() {
                400 => FetchError::BadRequest,
                404 => FetchError::NotFound,
                code => FetchError::Http(code),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
