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

//! REST API server and resources.

mod http_resources {
    //! API resources

    pub mod webhook_resource;
}
mod common {
    //! Common REST API resources and utils.

    mod api_error_mapper;

    pub use api_error_mapper::*;
}

use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::get;
use actix_web::http::header::ContentType;
use actix_web::web;
use orgrelay_core::conf::AppConfig;
use orgrelay_core::relay::WebhookRelay;
use std::sync::Arc;
use tyst_api_rest_health::AppHealth;
use tyst_api_rest_health::health_resources;
use utoipa::OpenApi;

/// Shared state between requests.
#[derive(Clone)]
struct AppState {
    relay: Arc<WebhookRelay>,
}

/// Health of the relay.
pub struct WebhookRelayHealth {
    relay: Arc<WebhookRelay>,
}
impl WebhookRelayHealth {
    fn with_app(relay: &Arc<WebhookRelay>) -> Arc<dyn AppHealth> {
        Arc::new(Self {
            relay: Arc::clone(relay),
        })
    }
}
impl AppHealth for WebhookRelayHealth {
    fn is_health_started(&self) -> bool {
        self.relay.is_health_started()
    }
    fn is_health_ready(&self) -> bool {
        self.relay.is_health_ready()
    }
    fn is_health_live(&self) -> bool {
        self.relay.is_health_live()
    }
}

/// Shared application data for the relay.
fn shared_app_data(
    relay: &Arc<WebhookRelay>,
) -> (web::Data<AppState>, web::Data<Arc<dyn AppHealth>>) {
    let app_state = AppState {
        relay: Arc::clone(relay),
    };
    (
        web::Data::<AppState>::new(app_state),
        web::Data::<Arc<dyn AppHealth>>::new(WebhookRelayHealth::with_app(relay)),
    )
}

/// Register all resources.
fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.service(web::redirect("/openapi", "/openapi.json"))
        .service(get_openapi)
        .service(http_resources::webhook_resource::receive_webhook)
        .service(health_resources::health)
        .service(health_resources::health_live)
        .service(health_resources::health_ready)
        .service(health_resources::health_started);
}

/// Run HTTP server.
///
/// Fails if the configured address and port cannot be bound.
pub async fn run_http_server(
    app_config: &Arc<AppConfig>,
    relay: &Arc<WebhookRelay>,
) -> Result<(), Box<dyn core::error::Error>> {
    let bind_address = app_config.api.bind_address().to_owned();
    let bind_port = app_config.api.bind_port();
    let (app_data, app_health) = shared_app_data(relay);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .app_data(app_health.clone())
            .configure(configure_services)
    })
    .bind_auto_h2c((bind_address.as_str(), bind_port))
    .map_err(|e| {
        log::error!("Failed to bind {bind_address}:{bind_port}: {e}");
        e
    })?;
    log::info!(
        "Listening on http://{bind_address}:{bind_port}/webhook. API described by http://{bind_address}:{bind_port}/openapi.json."
    );
    server
        .disable_signals()
        .shutdown_timeout(5) // Default 30
        .run()
        .await?;
    Ok(())
}

/// Serve Open API documentation.
#[get("/openapi.json")]
async fn get_openapi() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(openapi_as_string())
}

/// Get the OpenAPI definition as a pretty JSON String.
pub fn openapi_as_string() -> String {
    #[derive(OpenApi)]
    #[openapi(
        // Use Cargo.toml as source for the "info" section
        paths(
            http_resources::webhook_resource::receive_webhook,
            health_resources::health,
            health_resources::health_live,
            health_resources::health_ready,
            health_resources::health_started,
        )
    )]
    struct ApiDoc;
    ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|e| log::warn!("Failed to serialize OpenAPI description: {e}"))
        .unwrap_or_default()
}
