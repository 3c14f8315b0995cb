// OpenWeather current conditions and 5-day forecast by coordinates.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ServicesClient, endpoint};
use crate::error::{Error, Service};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
}

/// `GET /weather` response (subset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub name: Option<String>,
    pub main: WeatherMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub dt: Option<i64>,
}

impl CurrentWeather {
    /// First condition description, e.g. `"light rain"`.
    pub fn summary(&self) -> &str {
        self.weather
            .first()
            .map_or("", |c| c.description.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: WeatherMain,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub dt_txt: Option<String>,
    /// Probability of precipitation, 0..=1.
    #[serde(default)]
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// `GET /forecast` response (subset): 3-hour steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    #[serde(default)]
    pub city: Option<ForecastCity>,
}

impl ServicesClient {
    /// Current weather at a point, metric units.
    pub async fn current_weather(
        &self,
        lat: f64,
        lon: f64,
        api_key: &SecretString,
    ) -> Result<CurrentWeather, Error> {
        let url = endpoint(&self.endpoints().openweather, "weather")?;
        let builder = self.http().get(url).query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_owned()),
            ("appid", api_key.expose_secret().to_owned()),
        ]);
        self.send_json(Service::OpenWeather, builder).await
    }

    /// 5-day / 3-hour forecast at a point, metric units.
    pub async fn forecast(
        &self,
        lat: f64,
        lon: f64,
        api_key: &SecretString,
    ) -> Result<Forecast, Error> {
        let url = endpoint(&self.endpoints().openweather, "forecast")?;
        let builder = self.http().get(url).query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_owned()),
            ("appid", api_key.expose_secret().to_owned()),
        ]);
        self.send_json(Service::OpenWeather, builder).await
    }
}
