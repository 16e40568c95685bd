use crate::Identity;
use crate::extract::CurrentUser;
use crate::models::{RegisterUser, TokenRequest, TokenResponse, UpdateProfile, UserOut};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ladle_domain::constants::USER_TAG;
use ladle_kernel::prelude::{ApiError, ApiState, ErrorResponse};

#[utoipa::path(
    post,
    path = "/api/user",
    request_body = RegisterUser,
    responses(
        (status = CREATED, description = "User created", body = UserOut),
        (status = BAD_REQUEST, description = "Invalid email, short password, or taken email", body = ErrorResponse),
    ),
    tag = USER_TAG,
)]
pub(crate) async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let identity = state.try_get_slice::<Identity>()?;
    let user = identity.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/user/token",
    request_body = TokenRequest,
    responses(
        (status = OK, description = "Token issued", body = TokenResponse),
        (status = BAD_REQUEST, description = "Credentials rejected", body = ErrorResponse),
    ),
    tag = USER_TAG,
)]
pub(crate) async fn token(
    State(state): State<ApiState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = state.try_get_slice::<Identity>()?;
    let token = identity.login(&payload.email, &payload.password).await?;
    Ok(Json(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = OK, description = "Authenticated user profile", body = UserOut),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = USER_TAG,
)]
pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Json<UserOut> {
    Json(user.into())
}

#[utoipa::path(
    patch,
    path = "/api/user/me",
    request_body = UpdateProfile,
    responses(
        (status = OK, description = "Updated user profile", body = UserOut),
        (status = BAD_REQUEST, description = "Invalid profile update", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = USER_TAG,
)]
pub(crate) async fn update_me(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfile>,
) -> Result<Json<UserOut>, ApiError> {
    let identity = state.try_get_slice::<Identity>()?;
    let updated = identity.update_profile(&user, payload).await?;
    Ok(Json(updated.into()))
}
