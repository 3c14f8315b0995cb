// Contact endpoints: CRUD over `/contacts`.

use crate::backend::client::BackendClient;
use crate::backend::models::{ContactPayload, ContactQuery, ContactRecord};
use crate::error::Error;

impl BackendClient {
    /// List contacts, optionally filtered server-side by text and type.
    pub async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<ContactRecord>, Error> {
        Ok(self.get("contacts", query).await?.unwrap_or_default())
    }

    pub async fn create_contact(&self, payload: &ContactPayload) -> Result<ContactRecord, Error> {
        self.post("contacts", payload)
            .await?
            .ok_or_else(|| Error::EmptyResponse {
                path: "/contacts".into(),
            })
    }

    pub async fn update_contact(
        &self,
        id: &str,
        payload: &ContactPayload,
    ) -> Result<ContactRecord, Error> {
        let path = format!("contacts/{id}");
        self.put(&path, payload)
            .await?
            .ok_or(Error::EmptyResponse { path })
    }

    pub async fn delete_contact(&self, id: &str) -> Result<(), Error> {
        let path = format!("contacts/{id}");
        let _: Option<serde_json::Value> = self.delete(&path).await?;
        Ok(())
    }
}
