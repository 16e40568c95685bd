use crate::error::{CatalogError, CatalogErrorExt};
use crate::models::{AttributeRecord, RecipeInput, RecipeSummary};
use ladle_database::Database;
use ladle_kernel::safe_nanoid;
use tracing::{debug, instrument};

const RECIPE_FIELDS: &str = "record::id(id) AS id, title, time_minutes, price, link, image, \
     array::map(tags, |$t| record::id($t)) AS tags, \
     array::map(ingredients, |$i| record::id($i)) AS ingredients";

/// Persistence for one user-owned attribute table (`tag` or `ingredient`).
///
/// Tags and ingredients share every behavior except the table they live in
/// and the recipe field that references them, so one repository serves both.
#[derive(Debug, Clone)]
pub struct AttributeRepository {
    db: Database,
    table: &'static str,
    recipe_field: &'static str,
}

impl AttributeRepository {
    #[must_use]
    pub const fn tags(db: Database) -> Self {
        Self { db, table: "tag", recipe_field: "tags" }
    }

    #[must_use]
    pub const fn ingredients(db: Database) -> Self {
        Self { db, table: "ingredient", recipe_field: "ingredients" }
    }

    /// Lists the owner's attributes, name-descending. With `assigned_only`,
    /// attributes referenced by none of the owner's recipes are dropped.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    pub async fn list(
        &self,
        owner: &str,
        assigned_only: bool,
    ) -> Result<Vec<AttributeRecord>, CatalogError> {
        let mut query = String::from(
            "SELECT record::id(id) AS id, name FROM type::table($table) \
             WHERE owner = type::thing('user', $owner)",
        );
        if assigned_only {
            query.push_str(&format!(
                " AND id IN array::distinct(array::flatten((SELECT VALUE {} FROM recipe \
                 WHERE owner = type::thing('user', $owner))))",
                self.recipe_field
            ));
        }
        query.push_str(" ORDER BY name DESC");

        self.db
            .query(query)
            .bind(("table", self.table))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Listing attributes")?
            .take::<Vec<AttributeRecord>>(0)
            .context("Parsing attribute list")
    }

    /// Inserts a new attribute for the owner and returns it.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    #[instrument(skip(self), fields(table = self.table))]
    pub async fn create(&self, owner: &str, name: &str) -> Result<AttributeRecord, CatalogError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE ONLY type::thing($table, $id) \
                 SET name = $name, owner = type::thing('user', $owner)",
            )
            .bind(("table", self.table))
            .bind(("id", id.clone()))
            .bind(("name", name.to_owned()))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Creating attribute")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Persisting attribute")?;

        debug!(table = self.table, id = %id, "Attribute created");
        Ok(AttributeRecord { id, name: name.to_owned() })
    }

    /// Fetches the owner's attributes whose ids are in `ids`, name-descending.
    ///
    /// Returning fewer rows than ids means the caller referenced something
    /// that does not exist for them.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    pub async fn fetch_by_ids(
        &self,
        owner: &str,
        ids: &[String],
    ) -> Result<Vec<AttributeRecord>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.db
            .query(
                "SELECT record::id(id) AS id, name FROM type::table($table) \
                 WHERE owner = type::thing('user', $owner) AND record::id(id) IN $ids \
                 ORDER BY name DESC",
            )
            .bind(("table", self.table))
            .bind(("owner", owner.to_owned()))
            .bind(("ids", ids.to_vec()))
            .await
            .context("Fetching attributes by id")?
            .take::<Vec<AttributeRecord>>(0)
            .context("Parsing attributes by id")
    }
}

/// Persistence for the `recipe` table. Every query is owner-scoped; a recipe
/// of another user is indistinguishable from an absent one.
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    db: Database,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Lists the owner's recipes newest-first, optionally narrowed to those
    /// referencing any of the given tag ids and any of the given ingredient ids.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    pub async fn list(
        &self,
        owner: &str,
        tag_ids: &[String],
        ingredient_ids: &[String],
    ) -> Result<Vec<RecipeSummary>, CatalogError> {
        let mut query = format!(
            "SELECT {RECIPE_FIELDS} FROM recipe WHERE owner = type::thing('user', $owner)"
        );
        if !tag_ids.is_empty() {
            query.push_str(
                " AND array::len(array::intersect(\
                 array::map(tags, |$t| record::id($t)), $tag_ids)) > 0",
            );
        }
        if !ingredient_ids.is_empty() {
            query.push_str(
                " AND array::len(array::intersect(\
                 array::map(ingredients, |$i| record::id($i)), $ingredient_ids)) > 0",
            );
        }
        query.push_str(" ORDER BY created_at DESC");

        self.db
            .query(query)
            .bind(("owner", owner.to_owned()))
            .bind(("tag_ids", tag_ids.to_vec()))
            .bind(("ingredient_ids", ingredient_ids.to_vec()))
            .await
            .context("Listing recipes")?
            .take::<Vec<RecipeSummary>>(0)
            .context("Parsing recipe list")
    }

    /// Fetches one of the owner's recipes in summary shape.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    pub async fn find(
        &self,
        owner: &str,
        id: &str,
    ) -> Result<Option<RecipeSummary>, CatalogError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {RECIPE_FIELDS} FROM recipe \
                 WHERE id = type::thing('recipe', $id) \
                 AND owner = type::thing('user', $owner) LIMIT 1"
            ))
            .bind(("id", id.to_owned()))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Selecting recipe")?;

        let mut recipes =
            response.take::<Vec<RecipeSummary>>(0).context("Parsing recipe")?;
        Ok(recipes.pop())
    }

    /// Inserts a new recipe; attribute ids must already be verified as owned.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, owner: &str, input: &RecipeInput) -> Result<String, CatalogError> {
        let id = safe_nanoid!();
        self.db
            .query(
                "CREATE ONLY type::thing('recipe', $id) SET \
                 title = $title, time_minutes = $time_minutes, price = $price, link = $link, \
                 tags = array::map($tags, |$t| type::thing('tag', $t)), \
                 ingredients = array::map($ingredients, |$i| type::thing('ingredient', $i)), \
                 owner = type::thing('user', $owner)",
            )
            .bind(("id", id.clone()))
            .bind(("title", input.title.clone()))
            .bind(("time_minutes", input.time_minutes))
            .bind(("price", input.price))
            .bind(("link", input.link.clone()))
            .bind(("tags", input.tags.clone()))
            .bind(("ingredients", input.ingredients.clone()))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Creating recipe")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Persisting recipe")?;

        debug!(recipe = %id, "Recipe created");
        Ok(id)
    }

    /// Replaces every mutable field of an owned recipe.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    #[instrument(skip(self, input))]
    pub async fn replace(
        &self,
        owner: &str,
        id: &str,
        input: &RecipeInput,
    ) -> Result<(), CatalogError> {
        self.db
            .query(
                "UPDATE type::thing('recipe', $id) SET \
                 title = $title, time_minutes = $time_minutes, price = $price, link = $link, \
                 tags = array::map($tags, |$t| type::thing('tag', $t)), \
                 ingredients = array::map($ingredients, |$i| type::thing('ingredient', $i)) \
                 WHERE owner = type::thing('user', $owner)",
            )
            .bind(("id", id.to_owned()))
            .bind(("title", input.title.clone()))
            .bind(("time_minutes", input.time_minutes))
            .bind(("price", input.price))
            .bind(("link", input.link.clone()))
            .bind(("tags", input.tags.clone()))
            .bind(("ingredients", input.ingredients.clone()))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Updating recipe")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Applying recipe update")?;

        debug!(recipe = %id, "Recipe updated");
        Ok(())
    }

    /// Deletes an owned recipe. Absent ids are a no-op; existence is the
    /// service layer's concern.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    #[instrument(skip(self))]
    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), CatalogError> {
        self.db
            .query(
                "DELETE type::thing('recipe', $id) WHERE owner = type::thing('user', $owner)",
            )
            .bind(("id", id.to_owned()))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Deleting recipe")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Applying recipe deletion")?;

        debug!(recipe = %id, "Recipe deleted");
        Ok(())
    }

    /// Points an owned recipe at a new stored image path.
    ///
    /// # Errors
    /// [`CatalogError::Database`] on engine failures.
    #[instrument(skip(self))]
    pub async fn set_image(
        &self,
        owner: &str,
        id: &str,
        image: &str,
    ) -> Result<(), CatalogError> {
        self.db
            .query(
                "UPDATE type::thing('recipe', $id) SET image = $image \
                 WHERE owner = type::thing('user', $owner)",
            )
            .bind(("id", id.to_owned()))
            .bind(("image", image.to_owned()))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Setting recipe image")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Applying recipe image")?;

        debug!(recipe = %id, %image, "Recipe image set");
        Ok(())
    }
}
