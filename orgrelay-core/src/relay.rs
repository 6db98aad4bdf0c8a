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

//! Relay of organization lifecycle webhooks to database provisioning.
//!
//! Every webhook is handled on its own: there is no shared mutable state, no
//! retry and no deduplication of redelivered events.

mod inbound_event;
mod relay_error;

pub use self::inbound_event::*;
pub use self::relay_error::*;

use crate::conf::AppConfig;
use async_trait::async_trait;
use orgrelay_client::ProvisionError;
use orgrelay_client::ProvisioningClient;
use std::sync::Arc;

/// Creates databases for organizations.
#[async_trait]
pub trait DatabaseProvisioner: Send + Sync {
    /// Create a database for the organization.
    async fn create_database(&self, organization_id: &str) -> Result<(), ProvisionError>;

    /// Return `true` if the provisioner has a credential to present.
    fn has_credential(&self) -> bool;
}

#[async_trait]
impl DatabaseProvisioner for ProvisioningClient {
    async fn create_database(&self, organization_id: &str) -> Result<(), ProvisionError> {
        ProvisioningClient::create_database(self, organization_id).await
    }

    fn has_credential(&self) -> bool {
        ProvisioningClient::has_credential(self)
    }
}

/// Result of a successfully handled webhook.
#[derive(Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A database was created for the organization.
    Provisioned {
        /// Organization identifier.
        organization_id: String,
    },
    /// The event type does not trigger provisioning.
    Skipped {
        /// The ignored event type.
        event_type: String,
    },
}

/// Turns `organization.created` events into database provisioning requests.
pub struct WebhookRelay {
    provisioner: Arc<dyn DatabaseProvisioner>,
}

impl WebhookRelay {
    /// Return a new instance that provisions using `provisioner`.
    pub fn new(provisioner: Arc<dyn DatabaseProvisioner>) -> Arc<Self> {
        Arc::new(Self { provisioner })
    }

    /// Return a new instance backed by a [ProvisioningClient] set up from the
    /// application configuration.
    pub fn with_config(app_config: &AppConfig) -> Result<Arc<Self>, RelayError> {
        let provisioning = &app_config.provisioning;
        let client = ProvisioningClient::new(
            provisioning.base_url(),
            provisioning.api_key(),
            provisioning.timeout(),
            &app_config.user_agent(),
        )
        .map_err(|e| RelayErrorKind::Configuration.error_with_msg(e.to_string()))?;
        if !client.has_credential() {
            log::warn!("No provisioning API key is configured. Database creation will fail.");
        }
        Ok(Self::new(Arc::new(client)))
    }

    /// Parse a raw webhook body.
    pub fn parse_event(raw_body: &[u8]) -> Result<InboundEvent, RelayError> {
        InboundEvent::from_json_bytes(raw_body)
    }

    /// Parse a raw webhook body and act on the event.
    pub async fn handle(&self, raw_body: &[u8]) -> Result<RelayOutcome, RelayError> {
        let event = Self::parse_event(raw_body)?;
        self.handle_event(event).await
    }

    /// Act on a parsed event.
    ///
    /// Only [EventType::OrganizationCreated] results in an outbound request.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<RelayOutcome, RelayError> {
        match event.event_type() {
            EventType::OrganizationCreated => {
                // Not validated. An empty identifier is passed on as is.
                let organization_id = event.organization_id();
                self.provisioner
                    .create_database(organization_id)
                    .await
                    .map_err(|e| {
                        log::info!(
                            "Failed to create database for organization '{organization_id}': {e}"
                        );
                        RelayErrorKind::ProvisioningFailure.error_with_msg(e.to_string())
                    })?;
                log::info!("Created database for organization '{organization_id}'.");
                Ok(RelayOutcome::Provisioned {
                    organization_id: organization_id.to_owned(),
                })
            }
            EventType::Other(event_type) => {
                log::debug!("Ignoring event of type '{event_type}'.");
                Ok(RelayOutcome::Skipped {
                    event_type: event_type.to_owned(),
                })
            }
        }
    }

    /// The relay is started once constructed.
    pub fn is_health_started(&self) -> bool {
        true
    }

    /// The relay is ready when it has a credential for the provisioning API.
    pub fn is_health_ready(&self) -> bool {
        self.provisioner.has_credential()
    }

    /// The relay holds no state that can become unhealthy.
    pub fn is_health_live(&self) -> bool {
        true
    }
}
