use super::{RecipeListQuery, parse_id_list};
use crate::Catalog;
use crate::models::{RecipeDetail, RecipeImageOut, RecipeInput, RecipePatch, RecipeSummary};
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use ladle_domain::constants::RECIPE_TAG;
use ladle_identity::CurrentUser;
use ladle_kernel::prelude::{ApiError, ApiState, ErrorResponse};

#[utoipa::path(
    get,
    path = "/api/recipe/recipes",
    params(RecipeListQuery),
    responses(
        (status = OK, description = "Recipes of the authenticated user, newest first", body = [RecipeSummary]),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn list_recipes(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeSummary>>, ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    let tag_ids = parse_id_list(query.tags.as_deref());
    let ingredient_ids = parse_id_list(query.ingredients.as_deref());
    let recipes = catalog.list_recipes(&user.id, &tag_ids, &ingredient_ids).await?;
    Ok(Json(recipes))
}

#[utoipa::path(
    post,
    path = "/api/recipe/recipes",
    request_body = RecipeInput,
    responses(
        (status = CREATED, description = "Recipe created", body = RecipeDetail),
        (status = BAD_REQUEST, description = "Invalid fields or foreign attribute ids", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn create_recipe(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<RecipeInput>,
) -> Result<(StatusCode, Json<RecipeDetail>), ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    let recipe = catalog.create_recipe(&user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[utoipa::path(
    get,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = OK, description = "Recipe detail with embedded attributes", body = RecipeDetail),
        (status = NOT_FOUND, description = "Absent or owned by another user", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn get_recipe(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    let recipe = catalog.get_recipe(&user.id, &id).await?;
    Ok(Json(recipe))
}

#[utoipa::path(
    put,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipeInput,
    responses(
        (status = OK, description = "Recipe fully replaced", body = RecipeDetail),
        (status = BAD_REQUEST, description = "Invalid fields or foreign attribute ids", body = ErrorResponse),
        (status = NOT_FOUND, description = "Absent or owned by another user", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn replace_recipe(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RecipeInput>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    let recipe = catalog.replace_recipe(&user.id, &id, payload).await?;
    Ok(Json(recipe))
}

#[utoipa::path(
    patch,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipePatch,
    responses(
        (status = OK, description = "Recipe partially updated", body = RecipeDetail),
        (status = BAD_REQUEST, description = "Invalid fields or foreign attribute ids", body = ErrorResponse),
        (status = NOT_FOUND, description = "Absent or owned by another user", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn patch_recipe(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RecipePatch>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    let recipe = catalog.patch_recipe(&user.id, &id, payload).await?;
    Ok(Json(recipe))
}

#[utoipa::path(
    delete,
    path = "/api/recipe/recipes/{id}",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = NO_CONTENT, description = "Recipe deleted"),
        (status = NOT_FOUND, description = "Absent or owned by another user", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn delete_recipe(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;
    catalog.delete_recipe(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/recipe/recipes/{id}/image",
    params(("id" = String, Path, description = "Recipe id")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Image stored and attached", body = RecipeImageOut),
        (status = BAD_REQUEST, description = "Missing `image` field or undecodable payload", body = ErrorResponse),
        (status = NOT_FOUND, description = "Absent or owned by another user", body = ErrorResponse),
        (status = PAYLOAD_TOO_LARGE, description = "Upload exceeds the configured cap", body = ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = RECIPE_TAG,
)]
pub(crate) async fn upload_recipe_image(
    State(state): State<ApiState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<RecipeImageOut>, ApiError> {
    let catalog = state.try_get_slice::<Catalog>()?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() == Some("image") {
            image = Some(field.bytes().await.map_err(map_multipart_error)?);
            break;
        }
    }

    let Some(data) = image else {
        return Err(ApiError::validation("Multipart field 'image' is required"));
    };

    let stored = catalog.upload_recipe_image(&user.id, &id, &data).await?;
    Ok(Json(stored))
}

fn map_multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { message: "Uploaded file exceeds the size limit".into() }
    } else {
        ApiError::validation(e.to_string())
    }
}
