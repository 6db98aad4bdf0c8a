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

//! Relay errors.

use std::error::Error;
use std::fmt;

/// Cause of error.
#[derive(Debug)]
pub enum RelayErrorKind {
    /// The webhook body could not be read or parsed into an event.
    MalformedEvent,
    /// The database provisioning request failed.
    ProvisioningFailure,
    /// The relay could not be set up from the configuration.
    Configuration,
}

impl RelayErrorKind {
    /// Create a new instance with an error message.
    pub fn error_with_msg<S: AsRef<str>>(self, msg: S) -> RelayError {
        RelayError {
            kind: self,
            msg: Some(msg.as_ref().to_string()),
        }
    }
}

impl fmt::Display for RelayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/** Relay error.

Create a new instance via [RelayErrorKind].
*/
#[derive(Debug)]
pub struct RelayError {
    kind: RelayErrorKind,
    msg: Option<String>,
}

impl RelayError {
    /// Return the type of error.
    pub fn kind(&self) -> &RelayErrorKind {
        &self.kind
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(msg) = &self.msg {
            write!(f, "{} {}", self.kind, msg)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl AsRef<RelayError> for RelayError {
    fn as_ref(&self) -> &RelayError {
        self
    }
}

impl Error for RelayError {}
