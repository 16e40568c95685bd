use ladle_kernel::server::error::ApiError;
use ladle_media::MediaError;
use std::borrow::Cow;

/// A specialized [`CatalogError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Rejected recipe or attribute input.
    #[error("Catalog validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The record does not exist for this owner.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("Catalog database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Failures while persisting or removing uploaded files.
    #[error("Catalog media error{}: {source}", format_context(.context))]
    Media {
        #[source]
        source: MediaError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<surrealdb::Error> for CatalogError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Database { source, context: None }
    }
}

impl From<MediaError> for CatalogError {
    fn from(e: MediaError) -> Self {
        match e {
            // A payload the media layer rejects is caller input, not a fault.
            MediaError::Validation { message, context } => Self::Validation { message, context },
            other => Self::Media { source: other, context: None },
        }
    }
}

/// Adds `.context(...)` to results that convert into [`CatalogError`].
pub trait CatalogErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CatalogError>;
}

impl<T> CatalogErrorExt<T> for Result<T, CatalogError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                CatalogError::Validation { context: c, .. }
                | CatalogError::NotFound { context: c, .. }
                | CatalogError::Database { context: c, .. }
                | CatalogError::Media { context: c, .. }
                | CatalogError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> CatalogErrorExt<T> for Result<T, surrealdb::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CatalogError> {
        self.map_err(|source| CatalogError::Database { source, context: Some(context.into()) })
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation { message, .. } => Self::validation(message),
            CatalogError::NotFound { message, .. } => Self::not_found(message),
            e @ (CatalogError::Database { .. }
            | CatalogError::Media { .. }
            | CatalogError::Internal { .. }) => Self::internal(e.to_string()),
        }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
