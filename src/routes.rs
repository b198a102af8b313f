use crate::{
    auth::{require_auth, resolve_actor},
    handlers, AppState,
};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePath,
    trace::TraceLayer,
};

/// Builds the full application router: the JSON API under `/api` and the
/// `/health` probe. CORS is applied by the caller.
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/events/create", post(handlers::create_event))
        .route("/events/{id}/delete", delete(handlers::delete_event))
        .route("/events/{id}/approve", patch(handlers::approve_event))
        .route("/saved-events", get(handlers::list_saved_events))
        .route(
            "/saved-events/{id}/toggle",
            post(handlers::toggle_saved_event),
        )
        .route_layer(middleware::from_fn(require_auth));

    // resolve_actor must wrap require_auth, so it is layered after the merge
    let api_routes = Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/token/refresh", post(handlers::refresh_token))
        .route("/events", get(handlers::list_events))
        .route("/events/{id}", get(handlers::get_event))
        .merge(protected_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_actor));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health))
        .layer(middleware::from_fn(add_security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Strips a trailing slash before routing, so `/api/events/` and
/// `/api/events` reach the same handler. Route matching happens inside the
/// `Router`, so this has to wrap it rather than be one of its layers.
pub fn normalize_paths(router: Router) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router)
}

/// `None` allows any origin.
pub fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    Ok(match allowed_origin {
        Some(origin) => layer.allow_origin(origin.parse::<HeaderValue>()?),
        None => layer.allow_origin(Any),
    })
}

async fn add_security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    response
}
