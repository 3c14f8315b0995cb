// Alert endpoints: list, geo-filtered list, detail, create, acknowledge.

use crate::backend::client::BackendClient;
use crate::backend::models::{AlertListQuery, AlertLocationQuery, AlertRecord, NewAlertRequest};
use crate::error::Error;

impl BackendClient {
    /// List alerts: `GET /alerts?active=&limit=`.
    pub async fn list_alerts(&self, active: bool, limit: u32) -> Result<Vec<AlertRecord>, Error> {
        let query = AlertListQuery { active, limit };
        Ok(self.get("alerts", &query).await?.unwrap_or_default())
    }

    /// Alerts within `radius_km` of a point: `GET /alerts/location`.
    pub async fn alerts_near(
        &self,
        lat: f64,
        lng: f64,
        radius_km: u32,
    ) -> Result<Vec<AlertRecord>, Error> {
        let query = AlertLocationQuery {
            lat,
            lng,
            radius: radius_km,
        };
        Ok(self
            .get("alerts/location", &query)
            .await?
            .unwrap_or_default())
    }

    /// Full detail for one alert: `GET /alerts/:id`.
    pub async fn get_alert(&self, id: &str) -> Result<AlertRecord, Error> {
        let path = format!("alerts/{id}");
        self.get(&path, &())
            .await?
            .ok_or(Error::EmptyResponse { path })
    }

    /// Create an alert and return the server's echo: `POST /alerts`.
    ///
    /// Only privileged roles may call this; others get [`Error::Forbidden`].
    pub async fn create_alert(&self, request: &NewAlertRequest) -> Result<AlertRecord, Error> {
        self.post("alerts", request)
            .await?
            .ok_or_else(|| Error::EmptyResponse {
                path: "/alerts".into(),
            })
    }

    /// Acknowledge an alert: `POST /alerts/:id/acknowledge`.
    pub async fn acknowledge_alert(&self, id: &str) -> Result<(), Error> {
        let path = format!("alerts/{id}/acknowledge");
        let _: Option<serde_json::Value> = self.post(&path, &serde_json::json!({})).await?;
        Ok(())
    }
}
