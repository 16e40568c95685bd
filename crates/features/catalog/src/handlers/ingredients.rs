use super::AttributeListQuery;
use crate::Catalog;
use crate::models::{AttributeRecord, CreateAttribute};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use ladle_domain::constants::RECIPE_TAG;
use ladle_identity::CurrentUser;
use ladle_kernel::prelude::{ApiError, ApiState, ErrorResponse};

#[utoipa::path(
    get,
    path = "/api/recipe/ingredients",
    params(AttributeListQuery),
    responses(
        (status = OK, description = "Ingredients of the authenticated user, name-descending", body = [AttributeRecord]),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn list_ingredients(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AttributeListQuery>,
) -> Result<Json<Vec<AttributeRecord>>, ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    let ingredients = catalog.list_ingredients(&user.id, query.assigned_only).await?;
    Ok(Json(ingredients))
}

#[utoipa::path(
    post,
    path = "/api/recipe/ingredients",
    request_body = CreateAttribute,
    responses(
        (status = CREATED, description = "Ingredient created", body = AttributeRecord),
        (status = BAD_REQUEST, description = "Blank name", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn create_ingredient(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateAttribute>,
) -> Result<(StatusCode, Json<AttributeRecord>), ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    let ingredient = catalog.create_ingredient(&user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}
