use ladle_catalog::{
    Catalog, CatalogError, CreateAttribute, RecipeInput, RecipePatch, init,
};
use ladle_database::Database;
use ladle_media::MediaStore;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

const PIXEL_PNG: &[u8] = include_bytes!("../../../../infra/media/tests/fixtures/pixel.png");

async fn catalog_over_mem() -> (TempDir, MediaStore, Catalog) {
    let db = Database::builder()
        .url("mem://")
        .session("ladle", "catalog_tests")
        .init()
        .await
        .expect("mem database");

    let tmp = tempdir().expect("tempdir");
    let media = MediaStore::builder()
        .media_dir(tmp.path().join("media"))
        .static_dir(tmp.path().join("static"))
        .init()
        .await
        .expect("media store");

    let slice = init(&db, &media).expect("init should succeed");
    assert_eq!(slice.id, std::any::TypeId::of::<Catalog>());

    let catalog = slice
        .state
        .as_any()
        .downcast_ref::<Catalog>()
        .expect("slice state downcasts to Catalog")
        .clone();

    (tmp, media, catalog)
}

fn attribute(name: &str) -> CreateAttribute {
    CreateAttribute { name: name.to_owned() }
}

fn recipe(title: &str) -> RecipeInput {
    RecipeInput {
        title: title.to_owned(),
        time_minutes: 10,
        price: 5.0,
        link: None,
        tags: Vec::new(),
        ingredients: Vec::new(),
    }
}

#[tokio::test]
async fn tags_are_scoped_and_name_descending() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    catalog.create_tag("alice", attribute("Vegan")).await.expect("tag");
    catalog.create_tag("alice", attribute("Dessert")).await.expect("tag");
    catalog.create_tag("bob", attribute("Breakfast")).await.expect("tag");

    let tags = catalog.list_tags("alice", false).await.expect("list");
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Vegan", "Dessert"], "own tags only, name descending");

    let err = catalog.create_tag("alice", attribute("   ")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));
}

#[tokio::test]
async fn assigned_only_hides_unassigned_attributes() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let used = catalog.create_tag("alice", attribute("Used")).await.expect("tag");
    catalog.create_tag("alice", attribute("Unused")).await.expect("tag");

    let mut input = recipe("Lentil soup");
    input.tags = vec![used.id.clone()];
    catalog.create_recipe("alice", input).await.expect("recipe");

    let all = catalog.list_tags("alice", false).await.expect("list all");
    assert_eq!(all.len(), 2);

    let assigned = catalog.list_tags("alice", true).await.expect("list assigned");
    let names: Vec<_> = assigned.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Used"]);
}

#[tokio::test]
async fn ingredients_behave_like_tags() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    catalog.create_ingredient("alice", attribute("Salt")).await.expect("ingredient");
    catalog.create_ingredient("bob", attribute("Pepper")).await.expect("ingredient");

    let ingredients = catalog.list_ingredients("alice", false).await.expect("list");
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0].name, "Salt");
}

#[tokio::test]
async fn recipes_list_newest_first_and_stay_private() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let first = catalog.create_recipe("alice", recipe("First")).await.expect("recipe");
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = catalog.create_recipe("alice", recipe("Second")).await.expect("recipe");
    catalog.create_recipe("bob", recipe("Foreign")).await.expect("recipe");

    let recipes = catalog.list_recipes("alice", &[], &[]).await.expect("list");
    let ids: Vec<_> = recipes.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, [second.id.as_str(), first.id.as_str()], "newest first, owner-scoped");

    // Bob's recipe is invisible to Alice, even by id.
    let foreign = catalog.list_recipes("bob", &[], &[]).await.expect("bob list");
    let err = catalog.get_recipe("alice", &foreign[0].id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn recipe_filters_intersect_by_attribute_ids() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let vegan = catalog.create_tag("alice", attribute("Vegan")).await.expect("tag");
    let dessert = catalog.create_tag("alice", attribute("Dessert")).await.expect("tag");
    let lentils = catalog.create_ingredient("alice", attribute("Lentils")).await.expect("ing");

    let mut soup = recipe("Lentil soup");
    soup.tags = vec![vegan.id.clone()];
    soup.ingredients = vec![lentils.id.clone()];
    let soup = catalog.create_recipe("alice", soup).await.expect("soup");

    let mut cake = recipe("Cheesecake");
    cake.tags = vec![dessert.id.clone()];
    let cake = catalog.create_recipe("alice", cake).await.expect("cake");

    let plain = catalog.create_recipe("alice", recipe("Plain rice")).await.expect("plain");

    let by_tag =
        catalog.list_recipes("alice", &[vegan.id.clone()], &[]).await.expect("filter tag");
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, soup.id);

    let by_both = catalog
        .list_recipes("alice", &[vegan.id.clone(), dessert.id.clone()], &[])
        .await
        .expect("filter both tags");
    let mut ids: Vec<_> = by_both.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    let mut expected = vec![soup.id.clone(), cake.id.clone()];
    expected.sort();
    assert_eq!(ids, expected, "plain recipe {:?} filtered out", plain.id);

    let by_ingredient =
        catalog.list_recipes("alice", &[], &[lentils.id.clone()]).await.expect("filter ing");
    assert_eq!(by_ingredient.len(), 1);
    assert_eq!(by_ingredient[0].id, soup.id);
}

#[tokio::test]
async fn recipe_detail_embeds_attribute_objects() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let vegan = catalog.create_tag("alice", attribute("Vegan")).await.expect("tag");
    let lentils = catalog.create_ingredient("alice", attribute("Lentils")).await.expect("ing");

    let mut input = recipe("Lentil soup");
    input.tags = vec![vegan.id.clone()];
    input.ingredients = vec![lentils.id.clone()];
    input.link = Some("https://example.com/soup".to_owned());
    let created = catalog.create_recipe("alice", input).await.expect("create");

    let detail = catalog.get_recipe("alice", &created.id).await.expect("detail");
    assert_eq!(detail.title, "Lentil soup");
    assert_eq!(detail.link.as_deref(), Some("https://example.com/soup"));
    assert_eq!(detail.tags.len(), 1);
    assert_eq!(detail.tags[0].name, "Vegan");
    assert_eq!(detail.ingredients.len(), 1);
    assert_eq!(detail.ingredients[0].name, "Lentils");
}

#[tokio::test]
async fn foreign_attribute_ids_are_rejected() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let bobs_tag = catalog.create_tag("bob", attribute("Bobs")).await.expect("tag");

    let mut input = recipe("Sneaky");
    input.tags = vec![bobs_tag.id.clone()];
    let err = catalog.create_recipe("alice", input).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));

    let mut input = recipe("Ghost");
    input.ingredients = vec!["does-not-exist".to_owned()];
    let err = catalog.create_recipe("alice", input).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));
}

#[tokio::test]
async fn patch_merges_and_put_replaces() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let vegan = catalog.create_tag("alice", attribute("Vegan")).await.expect("tag");
    let mut input = recipe("Original");
    input.tags = vec![vegan.id.clone()];
    let created = catalog.create_recipe("alice", input).await.expect("create");

    let patched = catalog
        .patch_recipe(
            "alice",
            &created.id,
            RecipePatch { title: Some("Renamed".to_owned()), ..RecipePatch::default() },
        )
        .await
        .expect("patch");
    assert_eq!(patched.title, "Renamed");
    assert_eq!(patched.time_minutes, 10, "untouched fields survive a patch");
    assert_eq!(patched.tags.len(), 1, "untouched tags survive a patch");

    let replaced = catalog
        .replace_recipe(
            "alice",
            &created.id,
            RecipeInput {
                title: "Replaced".to_owned(),
                time_minutes: 25,
                price: 12.345,
                link: None,
                tags: Vec::new(),
                ingredients: Vec::new(),
            },
        )
        .await
        .expect("replace");
    assert_eq!(replaced.title, "Replaced");
    assert_eq!(replaced.price, 12.35, "price is rounded to two decimals");
    assert!(replaced.tags.is_empty(), "full replace clears attributes");

    let err = catalog
        .patch_recipe("alice", "missing-id", RecipePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn invalid_recipe_fields_are_rejected() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let err = catalog.create_recipe("alice", recipe("  ")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));

    let mut negative_time = recipe("Soup");
    negative_time.time_minutes = -1;
    let err = catalog.create_recipe("alice", negative_time).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));

    let mut pricey = recipe("Gold soup");
    pricey.price = 1000.0;
    let err = catalog.create_recipe("alice", pricey).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));
}

#[tokio::test]
async fn delete_removes_recipe() {
    let (_tmp, _media, catalog) = catalog_over_mem().await;

    let created = catalog.create_recipe("alice", recipe("Doomed")).await.expect("create");
    catalog.delete_recipe("alice", &created.id).await.expect("delete");

    let err = catalog.get_recipe("alice", &created.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    let err = catalog.delete_recipe("alice", &created.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn image_upload_attaches_and_replaces() {
    let (_tmp, media, catalog) = catalog_over_mem().await;

    let created = catalog.create_recipe("alice", recipe("Photogenic")).await.expect("create");

    let first = catalog
        .upload_recipe_image("alice", &created.id, PIXEL_PNG)
        .await
        .expect("first upload");
    assert!(first.image.starts_with("recipes/"));
    assert!(media.media_root().join(&first.image).is_file());

    let detail = catalog.get_recipe("alice", &created.id).await.expect("detail");
    assert_eq!(detail.image.as_deref(), Some(first.image.as_str()));

    let second = catalog
        .upload_recipe_image("alice", &created.id, PIXEL_PNG)
        .await
        .expect("second upload");
    assert_ne!(second.image, first.image);
    assert!(!media.media_root().join(&first.image).exists(), "old file is removed");
    assert!(media.media_root().join(&second.image).is_file());

    let err =
        catalog.upload_recipe_image("alice", &created.id, b"not an image").await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));

    // Deleting the recipe cleans the stored file up.
    catalog.delete_recipe("alice", &created.id).await.expect("delete");
    assert!(!media.media_root().join(&second.image).exists());
}
