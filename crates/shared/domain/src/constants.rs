//! OpenAPI tag names shared by the feature routers.

pub const SYSTEM_TAG: &str = "System";
pub const USER_TAG: &str = "User";
pub const RECIPE_TAG: &str = "Recipe";
