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

//! CLI for manual database provisioning.

use orgrelay_client::ProvisioningClient;
use std::process::ExitCode;
use std::time::Duration;

/// Environment variable holding the provisioning API credential.
const API_KEY_ENV: &str = "TURSO_API_KEY";

/// Basic CLI that can be extended later.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logger() {
        println!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    let mut args = std::env::args();
    let cli_name = args.next().unwrap_or_default();
    if let Some(api_base_url) = args.next()
        && let Some("provision") = args.next().as_deref()
        && let Some(organization_id) = args.next()
    {
        return provision(&api_base_url, &organization_id).await;
    }
    println!(
        "{cli_name} - Organization database provisioning CLI

Usage:
    {API_KEY_ENV}=[api_key] {cli_name} [base_url] provision [organization_id]

Example
    {API_KEY_ENV}=secret {cli_name} https://api.turso.com provision org_2abc
    "
    );
    ExitCode::FAILURE
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    env_logger::builder()
        // Set default log level
        .filter_level(log::LevelFilter::Info)
        .write_style(env_logger::fmt::WriteStyle::Auto)
        .target(env_logger::fmt::Target::Stdout)
        .is_test(false)
        .parse_env(
            env_logger::Env::new()
                .filter("LOG_LEVEL")
                .write_style("LOG_STYLE"),
        )
        .try_init()
}

async fn provision(api_base_url: &str, organization_id: &str) -> ExitCode {
    let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
    if api_key.is_empty() {
        log::warn!("Environment variable {API_KEY_ENV} is not set.");
    }
    let user_agent = format!("orgrelay-cli/{}", env!("CARGO_PKG_VERSION"));
    let client = match ProvisioningClient::new(
        api_base_url,
        &api_key,
        Duration::from_secs(30),
        &user_agent,
    ) {
        Ok(client) => client,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    match client.create_database(organization_id).await {
        Ok(()) => {
            log::info!("Database created for organization '{organization_id}'.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::warn!("Failed to create database: {e}");
            ExitCode::FAILURE
        }
    }
}
