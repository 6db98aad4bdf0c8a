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

//! Parsing of configuration for the database provisioning API client.

use config::ConfigBuilder;
use config::ConfigError;
use config::builder::BuilderState;
use serde::Deserialize;
use std::time::Duration;

use super::AppConfigDefaults;

/// Configuration of the database provisioning API client.
#[derive(Deserialize)]
pub struct ProvisioningConfig {
    /// Scheme and host of the provisioning API.
    baseurl: String,
    /// Bearer credential for the provisioning API.
    apikey: String,
    /// Upper bound for a single provisioning request in seconds.
    timeoutsecs: u64,
}

impl std::fmt::Debug for ProvisioningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningConfig")
            .field("baseurl", &self.baseurl)
            .field(
                "apikey",
                &if self.apikey.is_empty() {
                    "*unset*"
                } else {
                    "*redacted*"
                },
            )
            .field("timeoutsecs", &self.timeoutsecs)
            .finish()
    }
}

impl AppConfigDefaults for ProvisioningConfig {
    /// Provide defaults for this part of the configuration
    fn set_defaults<T: BuilderState>(
        config_builder: ConfigBuilder<T>,
        prefix: &str,
    ) -> Result<ConfigBuilder<T>, ConfigError> {
        config_builder
            .set_default(prefix.to_string() + "." + "baseurl", "https://api.turso.com")?
            .set_default(prefix.to_string() + "." + "apikey", "")?
            .set_default(prefix.to_string() + "." + "timeoutsecs", "10")
    }
}

impl ProvisioningConfig {
    /// Scheme and host of the provisioning API. Defaults to
    /// `https://api.turso.com`.
    pub fn base_url(&self) -> &str {
        &self.baseurl
    }

    /// Bearer credential for the provisioning API. Empty when not configured.
    pub fn api_key(&self) -> &str {
        &self.apikey
    }

    /// Upper bound for a single provisioning request. Defaults to 10 seconds
    /// and is never less than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeoutsecs.max(1))
    }
}
