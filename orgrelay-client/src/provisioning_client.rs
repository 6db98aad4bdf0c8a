/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Interactions with the database provisioning REST API.

use crate::ProvisionError;
use reqwest::Client;
use reqwest::ClientBuilder;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderValue;
use std::time::Duration;

/// Client for creating per-organization databases using the provisioning
/// REST API.
///
/// The API credential is bound at construction and presented as a bearer
/// token in every request.
pub struct ProvisioningClient {
    databases_url: String,
    // Client uses an Arc internally, so it doesn't need Arc<> wrapping here
    client: Client,
    authorization: HeaderValue,
    has_credential: bool,
}

impl ProvisioningClient {
    /// Return a new instance.
    ///
    /// `api_base_url` is the scheme and host of the API, like
    /// `https://api.turso.com`. `timeout` bounds each request from connect
    /// until the response body has been received.
    pub fn new(
        api_base_url: &str,
        api_key: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ProvisionError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| {
                ProvisionError::Configuration(format!("API key is not a valid header value: {e}"))
            })?;
        authorization.set_sensitive(true);
        log::debug!("user_agent: {user_agent}. timeout: {timeout:?}");
        let client = ClientBuilder::new()
            .user_agent(user_agent)
            .referer(false)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProvisionError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            databases_url: format!("{}/databases", api_base_url.trim_end_matches('/')),
            client,
            authorization,
            has_credential: !api_key.trim().is_empty(),
        })
    }

    /// Return `true` if a non-empty API key was provided.
    pub fn has_credential(&self) -> bool {
        self.has_credential
    }

    /// Request creation of a database for the organization.
    ///
    /// Only `201 Created` is considered a success. No retries are attempted.
    pub async fn create_database(&self, organization_id: &str) -> Result<(), ProvisionError> {
        let url = &self.databases_url;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Requesting database for organization '{organization_id}' from '{url}'.");
        }
        let response = self
            .client
            .post(url)
            .query(&[("org_id", organization_id)])
            .header(AUTHORIZATION, self.authorization.clone())
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                log::info!("Failed request to '{url}': {e:?}");
                if e.is_timeout() {
                    ProvisionError::Transport(format!("timed out: {e}"))
                } else {
                    ProvisionError::Transport(e.to_string())
                }
            })?;
        match response.status() {
            StatusCode::CREATED => {
                log::debug!("Database created for organization '{organization_id}'.");
                Ok(())
            }
            status_code => {
                log::info!("Failed request to '{url}': status_code {status_code}.");
                Err(ProvisionError::UnexpectedStatus(status_code.as_u16()))
            }
        }
    }
}
