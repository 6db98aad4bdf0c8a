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

//! Provisioning API errors.

use std::error::Error;
use std::fmt;

/// Failure to provision a database.
#[derive(Debug)]
pub enum ProvisionError {
    /// The client could not be set up from the provided configuration.
    Configuration(String),
    /// Network or transport failure, including timeouts.
    Transport(String),
    /// The provisioning API responded with something else than
    /// `201 Created`.
    UnexpectedStatus(u16),
}

impl ProvisionError {
    /// Return `true` if the provisioning API was never reached or did not
    /// respond in time.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration {msg}"),
            Self::Transport(msg) => write!(f, "Transport {msg}"),
            Self::UnexpectedStatus(status_code) => {
                write!(f, "UnexpectedStatus status_code {status_code}")
            }
        }
    }
}

impl Error for ProvisionError {}
