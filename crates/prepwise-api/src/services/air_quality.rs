// Google Air Quality `currentConditions:lookup`.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ServicesClient, endpoint};
use crate::error::{Error, Service};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AqiIndex {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub aqi: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub dominant_pollutant: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQuality {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub indexes: Vec<AqiIndex>,
    /// Population group → advice text.
    #[serde(default)]
    pub health_recommendations: BTreeMap<String, String>,
}

impl AirQuality {
    /// The universal AQI entry, if the response carries one.
    pub fn universal(&self) -> Option<&AqiIndex> {
        self.indexes
            .iter()
            .find(|i| i.code == "uaqi")
            .or_else(|| self.indexes.first())
    }
}

impl ServicesClient {
    /// Current air quality at a point, with health recommendations.
    pub async fn air_quality(
        &self,
        api_key: &SecretString,
        lat: f64,
        lon: f64,
        region_code: &str,
    ) -> Result<AirQuality, Error> {
        let mut url = endpoint(&self.endpoints().air_quality, "currentConditions:lookup")?;
        url.query_pairs_mut()
            .append_pair("key", api_key.expose_secret());
        let body = json!({
            "universalAqi": true,
            "location": { "latitude": lat, "longitude": lon },
            "extraComputations": ["HEALTH_RECOMMENDATIONS"],
            "languageCode": "en",
            "regionCode": region_code,
        });
        self.send_json(Service::AirQuality, self.http().post(url).json(&body))
            .await
    }
}
