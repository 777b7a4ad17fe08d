// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tenant database endpoints. Every route requires a session token and acts
//! only on databases owned by the token's address.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::{ApiError, ErrorBody},
    models::{
        CreateDatabaseRequest, CreateDatabaseResponse, DatabaseListResponse,
        DeleteDatabaseResponse, QueryRequest, QueryResponse,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/db",
    tag = "Databases",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = DatabaseListResponse),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn list_databases(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<DatabaseListResponse>, ApiError> {
    let databases = state.databases.list_databases(&user.address).await?;
    Ok(Json(DatabaseListResponse { databases }))
}

#[utoipa::path(
    post,
    path = "/db",
    tag = "Databases",
    security(("bearer_auth" = [])),
    request_body = CreateDatabaseRequest,
    responses(
        (status = 201, body = CreateDatabaseResponse),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 500, description = "Duplicate name or engine error", body = ErrorBody)
    )
)]
pub async fn create_database(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateDatabaseRequest>,
) -> Result<(StatusCode, Json<CreateDatabaseResponse>), ApiError> {
    let name = request.name.unwrap_or_default();
    let created = state.databases.create_database(&user.address, &name).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateDatabaseResponse {
            name: created.to_string(),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/db/{name}",
    tag = "Databases",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Logical database name")),
    responses(
        (status = 200, body = DeleteDatabaseResponse),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn delete_database(
    Auth(user): Auth,
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteDatabaseResponse>, ApiError> {
    let dropped = state.databases.drop_database(&user.address, &name).await?;
    Ok(Json(DeleteDatabaseResponse {
        deleted: dropped.to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/db/{name}/query",
    tag = "Databases",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Logical database name")),
    request_body = QueryRequest,
    responses(
        (status = 200, body = QueryResponse),
        (status = 400, description = "Invalid name or empty SQL", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 500, description = "Engine error, message passed through", body = ErrorBody)
    )
)]
pub async fn run_query(
    Auth(user): Auth,
    Path(name): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let sql = request.sql.unwrap_or_default();
    let outcome = state.queries.execute(&user.address, &name, &sql).await?;
    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::db::testutil::FakeEngine;
    use crate::identity::Identity;
    use serde_json::json;

    const ALICE: &str = "0x00000000000000000000000000000000000000aa";
    const BOB: &str = "0x00000000000000000000000000000000000000bb";

    fn user(address: &str) -> Auth {
        Auth(AuthenticatedUser {
            address: Identity::parse(address).unwrap(),
            expires_at: i64::MAX,
        })
    }

    async fn create(state: &AppState, address: &str, name: &str) -> Result<String, ApiError> {
        let (status, Json(created)) = create_database(
            user(address),
            State(state.clone()),
            Json(CreateDatabaseRequest {
                name: Some(name.to_string()),
            }),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        Ok(created.name)
    }

    async fn list(state: &AppState, address: &str) -> Vec<String> {
        let Json(response) = list_databases(user(address), State(state.clone()))
            .await
            .expect("list succeeds");
        response.databases
    }

    #[tokio::test]
    async fn create_and_list() {
        let (state, _engine) = FakeEngine::app_state();

        assert_eq!(create(&state, ALICE, "sales").await.unwrap(), "sales");

        assert_eq!(list(&state, ALICE).await, vec!["sales"]);
        assert!(list(&state, BOB).await.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_or_missing_name() {
        let (state, _engine) = FakeEngine::app_state();

        let err = create(&state, ALICE, "bad-name").await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "invalid_name");

        let err = create_database(
            user(ALICE),
            State(state),
            Json(CreateDatabaseRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_create_is_server_error_with_code() {
        let (state, _engine) = FakeEngine::app_state();
        create(&state, ALICE, "sales").await.unwrap();

        let err = create(&state, ALICE, "sales").await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "duplicate_name");
    }

    #[tokio::test]
    async fn same_name_for_different_owners_is_allowed() {
        let (state, _engine) = FakeEngine::app_state();

        create(&state, ALICE, "sales").await.unwrap();
        create(&state, BOB, "sales").await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_database() {
        let (state, _engine) = FakeEngine::app_state();
        create(&state, ALICE, "sales").await.unwrap();

        let Json(response) = delete_database(
            user(ALICE),
            Path("sales".to_string()),
            State(state.clone()),
        )
        .await
        .unwrap();

        assert_eq!(response.deleted, "sales");
        assert!(list(&state, ALICE).await.is_empty());
    }

    #[tokio::test]
    async fn delete_rejects_invalid_name() {
        let (state, _engine) = FakeEngine::app_state();

        let err = delete_database(user(ALICE), Path("1abc".to_string()), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn query_returns_rows_fields_count_command() {
        let (state, _engine) = FakeEngine::app_state();
        create(&state, ALICE, "sales").await.unwrap();

        let Json(response) = run_query(
            user(ALICE),
            Path("sales".to_string()),
            State(state),
            Json(QueryRequest {
                sql: Some("SELECT 1 AS x".into()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"rows": [{"x": 1}], "fields": ["x"], "rowCount": 1, "command": "SELECT"})
        );
    }

    #[tokio::test]
    async fn query_requires_sql() {
        let (state, _engine) = FakeEngine::app_state();

        let err = run_query(
            user(ALICE),
            Path("sales".to_string()),
            State(state),
            Json(QueryRequest::default()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "empty_query");
    }

    #[tokio::test]
    async fn query_engine_error_is_passed_through() {
        let (state, _engine) = FakeEngine::app_state();
        create(&state, ALICE, "sales").await.unwrap();

        let err = run_query(
            user(ALICE),
            Path("sales".to_string()),
            State(state),
            Json(QueryRequest {
                sql: Some("FAIL".into()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "query_failed");
        assert!(err.message.contains("syntax error"));
    }

    #[tokio::test]
    async fn query_cannot_reach_another_tenants_database() {
        let (state, _engine) = FakeEngine::app_state();
        create(&state, ALICE, "sales").await.unwrap();

        let err = run_query(
            user(BOB),
            Path("sales".to_string()),
            State(state),
            Json(QueryRequest {
                sql: Some("SELECT 1 AS x".into()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, "query_failed");
        assert!(err.message.contains("does not exist"));
    }
}
