pub(crate) mod ingredients;
pub(crate) mod recipes;
pub(crate) mod tags;

use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters shared by the tag and ingredient listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct AttributeListQuery {
    /// When true, only attributes assigned to at least one recipe are returned.
    #[serde(default)]
    pub assigned_only: bool,
}

/// Query parameters of the recipe listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct RecipeListQuery {
    /// Comma-separated tag ids; a recipe matches when it references any of them.
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; a recipe matches when it references any of them.
    pub ingredients: Option<String>,
}

/// Splits a comma-separated id list, dropping empty segments.
pub(crate) fn parse_id_list(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |raw| {
        raw.split(',').map(str::trim).filter(|id| !id.is_empty()).map(str::to_owned).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_parsing() {
        assert!(parse_id_list(None).is_empty());
        assert!(parse_id_list(Some("")).is_empty());
        assert_eq!(parse_id_list(Some("a,b")), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(parse_id_list(Some(" a , ,b,")), vec!["a".to_owned(), "b".to_owned()]);
    }
}
