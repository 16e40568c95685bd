//! Catalog feature slice: user-owned recipes with their tags and ingredients,
//! filtered listings, and recipe image uploads.

mod error;
mod handlers;
mod models;
mod repository;

pub use error::{CatalogError, CatalogErrorExt};
pub use models::{
    AttributeRecord, CreateAttribute, RecipeDetail, RecipeImageOut, RecipeInput, RecipePatch,
    RecipeSummary,
};
pub use repository::{AttributeRepository, RecipeRepository};

use ladle_database::Database;
use ladle_domain::registry::{FeatureSlice, InitializedSlice};
use ladle_kernel::prelude::ApiState;
use ladle_media::MediaStore;
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Media namespace recipe images are stored under.
const RECIPE_IMAGE_NAMESPACE: &str = "recipes";
/// Upper bound of the price column (5 digits, 2 decimals).
const MAX_PRICE: f64 = 999.99;

/// Catalog feature state.
#[derive(Debug)]
pub struct CatalogInner {
    tags: AttributeRepository,
    ingredients: AttributeRepository,
    recipes: RecipeRepository,
    media: MediaStore,
}

/// Thread-safe handle to the catalog slice.
#[derive(Debug, Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

impl Deref for Catalog {
    type Target = CatalogInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Catalog {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Catalog {
    fn new(inner: CatalogInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Lists the owner's tags, name-descending.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    pub async fn list_tags(
        &self,
        owner: &str,
        assigned_only: bool,
    ) -> Result<Vec<AttributeRecord>, CatalogError> {
        self.inner.tags.list(owner, assigned_only).await
    }

    /// Creates a tag for the owner.
    ///
    /// # Errors
    /// [`CatalogError::Validation`] on a blank name.
    pub async fn create_tag(
        &self,
        owner: &str,
        payload: CreateAttribute,
    ) -> Result<AttributeRecord, CatalogError> {
        let name = validate_attribute_name(&payload.name)?;
        self.inner.tags.create(owner, name).await
    }

    /// Lists the owner's ingredients, name-descending.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    pub async fn list_ingredients(
        &self,
        owner: &str,
        assigned_only: bool,
    ) -> Result<Vec<AttributeRecord>, CatalogError> {
        self.inner.ingredients.list(owner, assigned_only).await
    }

    /// Creates an ingredient for the owner.
    ///
    /// # Errors
    /// [`CatalogError::Validation`] on a blank name.
    pub async fn create_ingredient(
        &self,
        owner: &str,
        payload: CreateAttribute,
    ) -> Result<AttributeRecord, CatalogError> {
        let name = validate_attribute_name(&payload.name)?;
        self.inner.ingredients.create(owner, name).await
    }

    /// Lists the owner's recipes, newest first, intersected with the optional
    /// tag/ingredient id filters.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    pub async fn list_recipes(
        &self,
        owner: &str,
        tag_ids: &[String],
        ingredient_ids: &[String],
    ) -> Result<Vec<RecipeSummary>, CatalogError> {
        self.inner.recipes.list(owner, tag_ids, ingredient_ids).await
    }

    /// Creates a recipe and returns its detail projection.
    ///
    /// # Errors
    /// [`CatalogError::Validation`] on bad fields or attribute ids the owner
    /// does not hold.
    pub async fn create_recipe(
        &self,
        owner: &str,
        mut input: RecipeInput,
    ) -> Result<RecipeDetail, CatalogError> {
        self.validate_recipe_input(owner, &mut input).await?;
        let id = self.inner.recipes.create(owner, &input).await?;
        self.get_recipe(owner, &id).await
    }

    /// Fetches one recipe with embedded attribute objects.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] when absent or owned by someone else.
    pub async fn get_recipe(&self, owner: &str, id: &str) -> Result<RecipeDetail, CatalogError> {
        let Some(summary) = self.inner.recipes.find(owner, id).await? else {
            return Err(recipe_not_found());
        };

        let tags = self.inner.tags.fetch_by_ids(owner, &summary.tags).await?;
        let ingredients = self.inner.ingredients.fetch_by_ids(owner, &summary.ingredients).await?;

        Ok(RecipeDetail {
            id: summary.id,
            title: summary.title,
            time_minutes: summary.time_minutes,
            price: summary.price,
            link: summary.link,
            image: summary.image,
            tags,
            ingredients,
        })
    }

    /// Replaces every field of an owned recipe.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for foreign or absent ids;
    /// [`CatalogError::Validation`] on bad fields.
    pub async fn replace_recipe(
        &self,
        owner: &str,
        id: &str,
        mut input: RecipeInput,
    ) -> Result<RecipeDetail, CatalogError> {
        if self.inner.recipes.find(owner, id).await?.is_none() {
            return Err(recipe_not_found());
        }
        self.validate_recipe_input(owner, &mut input).await?;
        self.inner.recipes.replace(owner, id, &input).await?;
        self.get_recipe(owner, id).await
    }

    /// Applies a partial update by merging over the stored recipe.
    ///
    /// # Errors
    /// Same as [`Catalog::replace_recipe`].
    pub async fn patch_recipe(
        &self,
        owner: &str,
        id: &str,
        patch: RecipePatch,
    ) -> Result<RecipeDetail, CatalogError> {
        let Some(current) = self.inner.recipes.find(owner, id).await? else {
            return Err(recipe_not_found());
        };

        let merged = RecipeInput {
            title: patch.title.unwrap_or(current.title),
            time_minutes: patch.time_minutes.unwrap_or(current.time_minutes),
            price: patch.price.unwrap_or(current.price),
            link: patch.link.or(current.link),
            tags: patch.tags.unwrap_or(current.tags),
            ingredients: patch.ingredients.unwrap_or(current.ingredients),
        };

        self.replace_recipe(owner, id, merged).await
    }

    /// Deletes an owned recipe and its stored image, if any.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for foreign or absent ids.
    pub async fn delete_recipe(&self, owner: &str, id: &str) -> Result<(), CatalogError> {
        let Some(current) = self.inner.recipes.find(owner, id).await? else {
            return Err(recipe_not_found());
        };

        self.inner.recipes.delete(owner, id).await?;
        if let Some(image) = current.image {
            self.inner.media.remove(&image).await?;
        }
        Ok(())
    }

    /// Validates, stores, and attaches an uploaded image; the previous file is
    /// removed after the new path is persisted.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for foreign or absent ids;
    /// [`CatalogError::Validation`] when the payload is not a decodable image.
    pub async fn upload_recipe_image(
        &self,
        owner: &str,
        id: &str,
        data: &[u8],
    ) -> Result<RecipeImageOut, CatalogError> {
        let Some(current) = self.inner.recipes.find(owner, id).await? else {
            return Err(recipe_not_found());
        };

        let stored = self.inner.media.store_image(RECIPE_IMAGE_NAMESPACE, data).await?;
        self.inner.recipes.set_image(owner, id, &stored.path).await?;

        if let Some(previous) = current.image {
            self.inner.media.remove(&previous).await?;
        }

        Ok(RecipeImageOut { id: id.to_owned(), image: stored.path })
    }

    async fn validate_recipe_input(
        &self,
        owner: &str,
        input: &mut RecipeInput,
    ) -> Result<(), CatalogError> {
        input.title = input.title.trim().to_owned();
        if input.title.is_empty() {
            return Err(validation("Title must not be blank"));
        }
        if input.time_minutes < 0 {
            return Err(validation("Preparation time must not be negative"));
        }
        if !(0.0..=MAX_PRICE).contains(&input.price) {
            return Err(validation("Price must be between 0 and 999.99"));
        }
        input.price = round_price(input.price);

        dedup(&mut input.tags);
        dedup(&mut input.ingredients);

        let owned_tags = self.inner.tags.fetch_by_ids(owner, &input.tags).await?;
        if owned_tags.len() != input.tags.len() {
            return Err(validation("Tags reference ids that do not exist"));
        }
        let owned_ingredients =
            self.inner.ingredients.fetch_by_ids(owner, &input.ingredients).await?;
        if owned_ingredients.len() != input.ingredients.len() {
            return Err(validation("Ingredients reference ids that do not exist"));
        }

        Ok(())
    }
}

/// Initialize the catalog feature.
///
/// # Errors
/// Infallible today; kept fallible to match the slice init contract.
pub fn init(db: &Database, media: &MediaStore) -> Result<InitializedSlice, CatalogError> {
    let inner = CatalogInner {
        tags: AttributeRepository::tags(db.clone()),
        ingredients: AttributeRepository::ingredients(db.clone()),
        recipes: RecipeRepository::new(db.clone()),
        media: media.clone(),
    };

    tracing::info!("Catalog server slice initialized");

    Ok(InitializedSlice::new(Catalog::new(inner)))
}

/// Routes owned by this slice.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::tags::list_tags, handlers::tags::create_tag))
        .routes(routes!(
            handlers::ingredients::list_ingredients,
            handlers::ingredients::create_ingredient
        ))
        .routes(routes!(handlers::recipes::list_recipes, handlers::recipes::create_recipe))
        .routes(routes!(
            handlers::recipes::get_recipe,
            handlers::recipes::replace_recipe,
            handlers::recipes::patch_recipe,
            handlers::recipes::delete_recipe
        ))
        .routes(routes!(handlers::recipes::upload_recipe_image))
}

fn validate_attribute_name(name: &str) -> Result<&str, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(validation("Name must not be blank"));
    }
    Ok(name)
}

fn validation(message: &'static str) -> CatalogError {
    CatalogError::Validation { message: message.into(), context: None }
}

fn recipe_not_found() -> CatalogError {
    CatalogError::NotFound { message: "Recipe not found".into(), context: None }
}

/// Two-decimal money rounding, matching the column precision.
fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

fn dedup(ids: &mut Vec<String>) {
    let mut seen = std::collections::BTreeSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_rounding() {
        assert_eq!(round_price(5.006), 5.01);
        assert_eq!(round_price(5.0), 5.0);
        assert_eq!(round_price(999.989), 999.99);
    }

    #[test]
    fn attribute_name_rules() {
        assert_eq!(validate_attribute_name("  Vegan ").expect("valid"), "Vegan");
        assert!(validate_attribute_name("   ").is_err());
    }

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let mut ids = vec!["b".to_owned(), "a".to_owned(), "b".to_owned(), "a".to_owned()];
        dedup(&mut ids);
        assert_eq!(ids, vec!["b".to_owned(), "a".to_owned()]);
    }
}
