use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// A user-owned recipe attribute (tag or ingredient). Wire shape and storage
/// shape coincide: `{id, name}`.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
pub struct AttributeRecord {
    pub id: String,
    pub name: String,
}

/// Listing projection of a recipe; attributes appear as id lists.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub time_minutes: i64,
    pub price: f64,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Detail projection of a recipe; attributes are embedded objects.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: String,
    pub title: String,
    pub time_minutes: i64,
    pub price: f64,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<AttributeRecord>,
    pub ingredients: Vec<AttributeRecord>,
}

/// Payload for creating a tag or an ingredient.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateAttribute {
    pub name: String,
}

/// Full recipe payload, used by create and by full replace.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecipeInput {
    pub title: String,
    pub time_minutes: i64,
    pub price: f64,
    #[serde(default)]
    pub link: Option<String>,
    /// Ids of tags owned by the caller.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of ingredients owned by the caller.
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// Partial recipe payload; absent fields stay untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<f64>,
    /// `Some(None)` is not expressible in JSON here; a patch may replace the
    /// link but not clear it. A full update (`PUT`) can.
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// Response of the image upload endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeImageOut {
    pub id: String,
    /// Media-relative path, served under `/media/`.
    pub image: String,
}
