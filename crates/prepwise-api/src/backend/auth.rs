// Backend authentication
//
// Email/password login returning a bearer token and the user profile.
// The token is attached to the client on success so subsequent calls
// are authorized without the caller threading it through.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::backend::client::BackendClient;
use crate::backend::models::{LoginRecord, LoginRequest};
use crate::error::Error;

impl BackendClient {
    /// Authenticate with email and password.
    ///
    /// Any non-success status is reported as [`Error::Authentication`]
    /// carrying the backend's message.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginRecord, Error> {
        debug!(email, "logging in");

        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };

        let record: LoginRecord = match self.post("auth/login", &body).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return Err(Error::EmptyResponse {
                    path: "/auth/login".into(),
                });
            }
            Err(Error::Api { message, .. } | Error::Forbidden { message }) => {
                return Err(Error::Authentication { message });
            }
            Err(e) => return Err(e),
        };

        if let Some(ref token) = record.token {
            if !token.is_empty() {
                self.set_token(SecretString::from(token.clone()));
            }
        }

        debug!("login successful");
        Ok(record)
    }
}
