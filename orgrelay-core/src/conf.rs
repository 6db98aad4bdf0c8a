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

//! Parsing of application configuration.

mod api_config;
mod provisioning_config;

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::builder::BuilderState;
use serde::Deserialize;
use std::collections::HashMap;

pub use self::api_config::ApiConfig;
pub use self::provisioning_config::ProvisioningConfig;

/// Package version reported by Cargo at build time.
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plain environment variable for the listening port. Takes precedence over
/// any other source.
const ENV_PORT: &str = "PORT";
/// Plain environment variable for the provisioning API credential. Takes
/// precedence over any other source.
const ENV_API_KEY: &str = "TURSO_API_KEY";

/// Static trait for tracking implementations.
trait AppConfigDefaults {
    fn set_defaults<T: BuilderState>(
        config_builder: ConfigBuilder<T>,
        prefix: &str,
    ) -> Result<ConfigBuilder<T>, ConfigError>;
}

/**
Application configration root.

The application name defaults to the Rust package name, but can be overridden
with the environment variable `APP_NAME`.

Configuration will be loaded from

1. the file `{application name}.json` in the current working directory.
2. environment variable overrides in the form
   `{APPLICATION_NAME}_MODULE_CONFIGKEYWITHOUTSPACES`
3. the environment variables `PORT` and `TURSO_API_KEY` when non-empty.
 */
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Configuration of the exposed REST API.
    pub api: ApiConfig,
    /// Configuration of the database provisioning API client.
    pub provisioning: ProvisioningConfig,

    /// Lower case application name. Ignored when loading configuration.
    #[serde(skip_deserializing)]
    app_name: String,
}

impl AppConfig {
    /// Creates a new instance pre-populated with defaults, an optional
    /// configurations file and overrides from the process environment.
    ///
    /// Use `env!("CARGO_PKG_NAME")` as `cargo_pkg_name`.
    pub fn new(cargo_pkg_name: &str) -> Result<Self, ConfigError> {
        let env_vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self::with_env_vars(cargo_pkg_name, env_vars)
    }

    /// Creates a new instance like [Self::new], but with the environment
    /// variables provided by the caller.
    pub fn with_env_vars(
        cargo_pkg_name: &str,
        env_vars: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let app_name = Self::read_app_name_lowercase(cargo_pkg_name, &env_vars);
        let config_env_prefix = app_name.to_uppercase();
        let mut config_builder = Config::builder();
        config_builder = ApiConfig::set_defaults(config_builder, "api")?;
        config_builder = ProvisioningConfig::set_defaults(config_builder, "provisioning")?;
        if let Ok(current_dir) = std::env::current_dir() {
            let conf_file = current_dir.join(app_name.to_owned() + ".json");
            log::debug!(
                "Will load '{}' configuration if present.",
                conf_file.display()
            );
            config_builder = config_builder.add_source(File::from(conf_file).required(false));
        }
        let config = config_builder
            .add_source(
                Environment::with_prefix(&config_env_prefix)
                    .separator("_")
                    .source(Some(env_vars.clone())),
            )
            .set_override_option("api.port", Self::non_empty_env(&env_vars, ENV_PORT))?
            .set_override_option(
                "provisioning.apikey",
                Self::non_empty_env(&env_vars, ENV_API_KEY),
            )?
            .build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.app_name = app_name;
        log::info!("Running with configuration: {app_config:?}");
        Ok(app_config)
    }

    /// The application name defaults to the Rust package name, but can be
    /// overridden with the environment variable `APP_NAME`.
    fn read_app_name_lowercase(cargo_pkg_name: &str, env_vars: &HashMap<String, String>) -> String {
        Self::non_empty_env(env_vars, "APP_NAME")
            .map(|value| value.to_lowercase())
            .unwrap_or_else(|| {
                log::debug!(
                    "Environment variable APP_NAME is not set -> Default app name '{cargo_pkg_name}' will be used."
                );
                cargo_pkg_name.to_lowercase()
            })
    }

    /// Return the trimmed value of an environment variable unless it is
    /// missing or blank.
    fn non_empty_env(env_vars: &HashMap<String, String>, key: &str) -> Option<String> {
        env_vars
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Lower case application name.
    pub fn app_name_lowercase(&self) -> &str {
        &self.app_name
    }

    /// SemVer application version derived fromt the Rust package version.
    pub fn app_version(&self) -> &'static str {
        CARGO_PKG_VERSION
    }

    /// Value for the `User-Agent` header of outbound requests.
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.app_name, self.app_version())
    }
}
