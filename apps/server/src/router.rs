use axum::Router;
use axum::extract::DefaultBodyLimit;
use ladle::kernel::prelude::ApiState;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(modifiers(&SecurityAddon))]
struct ApiDoc;

/// Registers the bearer scheme the authenticated routes reference.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

pub fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();
    let media_root = state.media.media_root().to_path_buf();
    let static_root = state.media.static_root().to_path_buf();
    let upload_cap = state.config.media.upload_max_bytes;

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(ladle::server::router::system_router())
        .merge(ladle::server::router::api_router())
        .layer(DefaultBodyLimit::max(upload_cap))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    // Merge all routes, then attach the media/static file services
    Router::new()
        .merge(openapi_routes)
        .merge(scalar_routes)
        .nest_service("/media", ServeDir::new(media_root))
        .nest_service("/static", ServeDir::new(static_root))
}
