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

//! API resource for receiving organization lifecycle webhooks.

use crate::rest_api::AppState;
use crate::rest_api::common::ApiErrorMapper;
use actix_web::Error;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::error;
use actix_web::post;
use actix_web::web;
use actix_web::web::Data;
use actix_web::web::Payload;
use futures::StreamExt;
use orgrelay_core::util::LogScopeDuration;

/// Webhook envelopes are small. Anything larger is rejected.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Receive an organization lifecycle event.
///
/// An `organization.created` event results in creation of a database for the
/// organization. Other event types are accepted and ignored.
#[utoipa::path(
    tag = "webhook",
    request_body(
        content = String,
        description = r#"Event envelope: `{"event_type": "organization.created", "data": {"organization_id": "org_123"}}`"#,
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Ok. The event was handled or ignored."),
        (status = 400, description = "Bad Request. Unreadable body or invalid JSON."),
        (status = 500, description = "Internal server error. Database creation failed."),
    ),
)]
#[post("/webhook")]
pub async fn receive_webhook(
    app_state: Data<AppState>,
    payload: Payload,
    http_request: HttpRequest,
) -> Result<HttpResponse, Error> {
    let _log_scope =
        LogScopeDuration::new(log::Level::Trace, module_path!(), "receive_webhook", 0);
    let content_length_estimate = assert_declared_content_length(&http_request, MAX_BODY_SIZE)?;
    let raw_body = read_full_body(content_length_estimate, payload).await?;
    let outcome = app_state
        .relay
        .handle(&raw_body)
        .await
        .map_err(ApiErrorMapper::from_relay_error)?;
    log::trace!("Webhook outcome: {outcome:?}");
    Ok(HttpResponse::Ok().finish())
}

/// Assert that the declared content-length header (if present) is within the
/// max_size limit.
///
/// An unparsable header only affects the initial buffer size. The size check
/// while reading the body is what enforces the limit.
fn assert_declared_content_length(
    http_request: &HttpRequest,
    max_size: usize,
) -> Result<usize, Error> {
    let content_length_estimate = http_request
        .headers()
        .get("content-length")
        .and_then(|header_value| header_value.to_str().ok())
        .and_then(|header_value_str| header_value_str.parse::<usize>().ok())
        .unwrap_or(1024);
    if content_length_estimate > max_size {
        Err(error::ErrorBadRequest("Unable to read request body"))?
    } else {
        Ok(content_length_estimate)
    }
}

async fn read_full_body(
    content_length_estimate: usize,
    mut payload: Payload,
) -> Result<web::Bytes, Error> {
    let mut body = web::BytesMut::with_capacity(content_length_estimate);
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            log::info!("Failed to read webhook body: {e}");
            error::ErrorBadRequest("Unable to read request body")
        })?;
        // limit max size of in-memory payload
        if (body.len() + chunk.len()) > MAX_BODY_SIZE {
            Err(error::ErrorBadRequest("Unable to read request body"))?;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

#[cfg(test)]
mod tests {
    use crate::rest_api::shared_app_data;
    use crate::rest_api::configure_services;
    use actix_web::App;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use orgrelay_core::AppConfig;
    use orgrelay_core::WebhookRelay;
    use std::sync::Arc;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::any;
    use wiremock::matchers::header;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::matchers::query_param;

    const ORG_CREATED: &str =
        r#"{"event_type":"organization.created","data":{"organization_id":"org_123"}}"#;

    fn init_logger() {
        let _ = env_logger::Builder::new()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    }

    /// Relay configured the same way as at startup, but against `base_url`.
    fn relay_for(base_url: &str) -> Arc<WebhookRelay> {
        init_logger();
        let env_vars = [
            ("TURSO_API_KEY", "test-token"),
            ("ORGRELAY_PROVISIONING_BASEURL", base_url),
            ("ORGRELAY_PROVISIONING_TIMEOUTSECS", "5"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
        let app_config = AppConfig::with_env_vars("orgrelay", env_vars).unwrap();
        WebhookRelay::with_config(&app_config).unwrap()
    }

    /// POST `body` to the webhook resource and return status and response
    /// body.
    async fn post_webhook(relay: &Arc<WebhookRelay>, body: &str) -> (StatusCode, String) {
        let (app_data, app_health) = shared_app_data(relay);
        let app = test::init_service(
            App::new()
                .app_data(app_data)
                .app_data(app_health)
                .configure(configure_services),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/webhook")
            .insert_header(("content-type", "application/json"))
            .set_payload(body.to_owned())
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).to_string())
    }

    /// Mock provisioning API that expects exactly `expected_calls` requests.
    async fn provisioning_api(status: u16, expected_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[actix_web::test]
    async fn other_event_types_are_acknowledged_without_provisioning() {
        let mock_server = provisioning_api(201, 0).await;
        let relay = relay_for(&mock_server.uri());
        for body in [
            r#"{"event_type":"organization.updated","data":{"organization_id":"org_123"}}"#,
            r#"{"event_type":"user.created","data":{"id":"user_1"}}"#,
            r#"{"data":{"organization_id":"org_123"}}"#,
            "{}",
        ] {
            let (status, response_body) = post_webhook(&relay, body).await;
            assert_eq!(status, StatusCode::OK);
            assert!(response_body.is_empty());
        }
    }

    #[actix_web::test]
    async fn invalid_json_is_bad_request() {
        let mock_server = provisioning_api(201, 0).await;
        let relay = relay_for(&mock_server.uri());
        let (status, _) = post_webhook(&relay, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn empty_body_is_bad_request() {
        let mock_server = provisioning_api(201, 0).await;
        let relay = relay_for(&mock_server.uri());
        let (status, _) = post_webhook(&relay, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn organization_created_provisions_database() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/databases"))
            .and(query_param("org_id", "org_123"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;
        let relay = relay_for(&mock_server.uri());
        let (status, response_body) = post_webhook(&relay, ORG_CREATED).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response_body.is_empty());
    }

    #[actix_web::test]
    async fn provisioning_error_is_internal_server_error() {
        let mock_server = provisioning_api(500, 1).await;
        let relay = relay_for(&mock_server.uri());
        let (status, response_body) = post_webhook(&relay, ORG_CREATED).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response_body.contains("500"));
    }

    #[actix_web::test]
    async fn unreachable_provisioning_api_is_internal_server_error() {
        // Nothing listens on the discard port.
        let relay = relay_for("http://127.0.0.1:9");
        let (status, _) = post_webhook(&relay, ORG_CREATED).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn missing_organization_id_is_still_provisioned() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/databases"))
            .and(query_param("org_id", ""))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;
        let relay = relay_for(&mock_server.uri());
        let (status, _) =
            post_webhook(&relay, r#"{"event_type":"organization.created","data":{}}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_organization_id_rejected_upstream_is_internal_server_error() {
        let mock_server = provisioning_api(400, 1).await;
        let relay = relay_for(&mock_server.uri());
        let (status, _) = post_webhook(
            &relay,
            r#"{"event_type":"organization.created","data":{"organization_id":""}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn null_body_is_acknowledged() {
        let mock_server = provisioning_api(201, 0).await;
        let relay = relay_for(&mock_server.uri());
        let (status, _) = post_webhook(&relay, "null").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn oversized_body_is_bad_request() {
        let mock_server = provisioning_api(201, 0).await;
        let relay = relay_for(&mock_server.uri());
        let padding = "x".repeat(super::MAX_BODY_SIZE);
        let body = format!(
            r#"{{"event_type":"organization.created","data":{{"organization_id":"org_123"}},"padding":"{padding}"}}"#
        );
        let (status, _) = post_webhook(&relay, &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn webhook_only_accepts_post() {
        let relay = relay_for("http://127.0.0.1:9");
        let (app_data, app_health) = shared_app_data(&relay);
        let app = test::init_service(
            App::new()
                .app_data(app_data)
                .app_data(app_health)
                .configure(configure_services),
        )
        .await;
        let req = test::TestRequest::get().uri("/webhook").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(!resp.status().is_success());
    }
}
