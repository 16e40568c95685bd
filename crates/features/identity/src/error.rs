use ladle_kernel::server::error::ApiError;
use std::borrow::Cow;

/// A specialized [`IdentityError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Configuration errors for identity/authentication.
    #[error("Identity config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Rejected registration or profile input.
    #[error("Identity validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Login failures: unknown email, wrong password, deactivated account.
    #[error("Invalid credentials{}", format_context(.context))]
    Credentials { context: Option<Cow<'static, str>> },

    /// Bearer token failures on authenticated endpoints.
    #[error("Identity auth error{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("Identity database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<surrealdb::Error> for IdentityError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Database { source, context: None }
    }
}

/// Adds `.context(...)` to results that convert into [`IdentityError`].
pub trait IdentityErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IdentityError>;
}

impl<T> IdentityErrorExt<T> for Result<T, IdentityError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                IdentityError::Config { context: c, .. }
                | IdentityError::Validation { context: c, .. }
                | IdentityError::Credentials { context: c }
                | IdentityError::Auth { context: c, .. }
                | IdentityError::Database { context: c, .. }
                | IdentityError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> IdentityErrorExt<T> for Result<T, surrealdb::Error> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IdentityError> {
        self.map_err(|source| IdentityError::Database { source, context: Some(context.into()) })
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Validation { message, .. } => Self::validation(message),
            // Bad login credentials report as 400, not 401; only
            // bearer-token failures are unauthorized.
            IdentityError::Credentials { .. } => {
                Self::validation("Unable to authenticate with the provided credentials")
            }
            IdentityError::Auth { message, .. } => Self::unauthorized(message),
            e @ (IdentityError::Config { .. }
            | IdentityError::Database { .. }
            | IdentityError::Internal { .. }) => Self::internal(e.to_string()),
        }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
