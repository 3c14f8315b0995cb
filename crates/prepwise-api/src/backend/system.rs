// Read-only dashboard endpoints.

use crate::backend::client::BackendClient;
use crate::backend::models::{AdminStatsRecord, SystemStatusRecord};
use crate::error::Error;

impl BackendClient {
    /// `GET /system/status`.
    pub async fn system_status(&self) -> Result<SystemStatusRecord, Error> {
        self.get("system/status", &())
            .await?
            .ok_or_else(|| Error::EmptyResponse {
                path: "/system/status".into(),
            })
    }

    /// `GET /dashboard/admin-stats`.
    pub async fn admin_stats(&self) -> Result<AdminStatsRecord, Error> {
        self.get("dashboard/admin-stats", &())
            .await?
            .ok_or_else(|| Error::EmptyResponse {
                path: "/dashboard/admin-stats".into(),
            })
    }
}
