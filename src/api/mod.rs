// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderName,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{
        CreateDatabaseRequest, CreateDatabaseResponse, DatabaseListResponse,
        DeleteDatabaseResponse, NonceResponse, QueryRequest, QueryResponse, VerifyRequest,
        VerifyResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod databases;
pub mod health;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let routes = Router::new()
        .route("/auth/nonce", get(auth::get_nonce))
        .route("/auth/verify", post(auth::verify))
        .route(
            "/db",
            get(databases::list_databases).post(databases::create_database),
        )
        .route("/db/{name}", delete(databases::delete_database))
        .route("/db/{name}/query", post(databases::run_query))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::get_nonce,
        auth::verify,
        databases::list_databases,
        databases::create_database,
        databases::delete_database,
        databases::run_query,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            NonceResponse,
            VerifyRequest,
            VerifyResponse,
            DatabaseListResponse,
            CreateDatabaseRequest,
            CreateDatabaseResponse,
            DeleteDatabaseResponse,
            QueryRequest,
            QueryResponse,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Wallet signature sign-in"),
        (name = "Databases", description = "Per-address database management and queries"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
