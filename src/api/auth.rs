// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::ApiError,
    identity::ValidationError,
    models::{NonceQuery, NonceResponse, VerifyRequest, VerifyResponse},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/auth/nonce",
    params(NonceQuery),
    tag = "Auth",
    responses(
        (status = 200, body = NonceResponse),
        (status = 400, description = "Invalid address", body = crate::error::ErrorBody)
    )
)]
pub async fn get_nonce(
    State(state): State<AppState>,
    Query(params): Query<NonceQuery>,
) -> Result<Json<NonceResponse>, ApiError> {
    let address = params.address.ok_or(ValidationError::InvalidIdentity)?;
    let message = state.challenges.issue_challenge(&address)?;
    Ok(Json(NonceResponse { message }))
}

#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    tag = "Auth",
    responses(
        (status = 200, body = VerifyResponse),
        (status = 400, description = "Missing address or signature", body = crate::error::ErrorBody),
        (status = 401, description = "Expired, mismatched or invalid signature", body = crate::error::ErrorBody)
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let present = |field: Option<String>| field.filter(|v| !v.trim().is_empty());
    let (Some(address), Some(signature)) = (present(request.address), present(request.signature))
    else {
        return Err(ApiError::bad_request(
            "missing_fields",
            "address and signature are required",
        ));
    };

    let identity = state.challenges.redeem(&address, &signature)?;
    let token = state.tokens.issue(&identity)?;

    Ok(Json(VerifyResponse {
        token,
        address: identity.to_string(),
    }))
}
