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

//! Inbound webhook event envelope.

use super::RelayError;
use super::RelayErrorKind;
use serde::Deserialize;

/// Event type that triggers database provisioning.
pub const ORGANIZATION_CREATED: &str = "organization.created";

/// Classification of the event type discriminator.
#[derive(Debug, PartialEq, Eq)]
pub enum EventType<'a> {
    /// An organization was created.
    OrganizationCreated,
    /// Any other (or missing) event type.
    Other(&'a str),
}

/// Event specific data.
#[derive(Debug, Default, Deserialize)]
struct InboundEventData {
    organization_id: Option<String>,
}

/** Parsed webhook payload.

Wire format:

```json
{ "event_type": "organization.created", "data": { "organization_id": "org_123" } }
```

Unknown fields are ignored and missing or `null` fields are treated as empty.
A `null` document is treated like `{}`.
*/
#[derive(Debug, Default, Deserialize)]
pub struct InboundEvent {
    event_type: Option<String>,
    data: Option<InboundEventData>,
}

impl InboundEvent {
    /// Return a new instance.
    pub fn new(event_type: &str, organization_id: &str) -> Self {
        Self {
            event_type: Some(event_type.to_owned()),
            data: Some(InboundEventData {
                organization_id: Some(organization_id.to_owned()),
            }),
        }
    }

    /// Parse a JSON document.
    ///
    /// A top-level `null` is an event where every field is empty.
    pub fn from_json_bytes(raw_body: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice::<Option<Self>>(raw_body)
            .map(Option::unwrap_or_default)
            .map_err(|e| {
                RelayErrorKind::MalformedEvent.error_with_msg(format!("Invalid JSON: {e}"))
            })
    }

    /// The raw event type discriminator.
    pub fn event_type_str(&self) -> &str {
        self.event_type.as_deref().unwrap_or_default()
    }

    /// Classified event type.
    pub fn event_type(&self) -> EventType<'_> {
        match self.event_type_str() {
            ORGANIZATION_CREATED => EventType::OrganizationCreated,
            other => EventType::Other(other),
        }
    }

    /// Organization the event concerns. Empty when absent.
    pub fn organization_id(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|data| data.organization_id.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_organization_created() {
        let event = InboundEvent::from_json_bytes(
            br#"{"event_type":"organization.created","data":{"organization_id":"org_123"}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type(), EventType::OrganizationCreated);
        assert_eq!(event.organization_id(), "org_123");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let event = InboundEvent::from_json_bytes(
            br#"{"object":"event","event_type":"user.created","data":{"id":"user_1","organization_id":"org_9"},"timestamp":1}"#,
        )
        .unwrap();
        assert_eq!(event.event_type(), EventType::Other("user.created"));
        assert_eq!(event.organization_id(), "org_9");
    }

    #[test]
    fn missing_fields_are_empty() {
        let event = InboundEvent::from_json_bytes(b"{}").unwrap();
        assert_eq!(event.event_type(), EventType::Other(""));
        assert_eq!(event.organization_id(), "");
        let event = InboundEvent::from_json_bytes(br#"{"event_type":null,"data":null}"#).unwrap();
        assert_eq!(event.event_type_str(), "");
        assert_eq!(event.organization_id(), "");
    }

    #[test]
    fn null_document_is_empty_event() {
        let event = InboundEvent::from_json_bytes(b"null").unwrap();
        assert_eq!(event.event_type(), EventType::Other(""));
        assert_eq!(event.organization_id(), "");
    }

    #[test]
    fn event_type_match_is_exact() {
        let event = InboundEvent::new("Organization.Created", "org_1");
        assert_eq!(event.event_type(), EventType::Other("Organization.Created"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        for raw_body in [&b"{not json"[..], b"", b"[]", b"\"organization.created\""] {
            let err = InboundEvent::from_json_bytes(raw_body).unwrap_err();
            assert!(matches!(err.kind(), RelayErrorKind::MalformedEvent));
        }
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let err = InboundEvent::from_json_bytes(br#"{"event_type":42}"#).unwrap_err();
        assert!(matches!(err.kind(), RelayErrorKind::MalformedEvent));
    }
}
