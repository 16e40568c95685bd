//! Identity feature slice: user accounts, password login, and bearer-token
//! authentication for the rest of the API.

mod error;
mod extract;
mod handlers;
mod models;
mod password;
mod repository;
mod tokens;

pub use error::{IdentityError, IdentityErrorExt};
pub use extract::CurrentUser;
pub use models::{RegisterUser, TokenRequest, TokenResponse, UpdateProfile, UserOut, UserRecord};
pub use repository::UserRepository;
pub use tokens::{Claims, TokenService};

use ladle_database::Database;
use ladle_domain::config::ApiConfig;
use ladle_domain::registry::{FeatureSlice, InitializedSlice};
use ladle_kernel::prelude::ApiState;
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Identity feature state.
#[derive(Debug)]
pub struct IdentityInner {
    users: UserRepository,
    tokens: TokenService,
    min_password_length: usize,
}

/// Thread-safe handle to the identity slice.
#[derive(Debug, Clone)]
pub struct Identity {
    inner: Arc<IdentityInner>,
}

impl Deref for Identity {
    type Target = IdentityInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Identity {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Identity {
    fn new(inner: IdentityInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Read access to the user repository (used by sibling slices and tests).
    #[must_use]
    pub fn users(&self) -> &UserRepository {
        &self.inner.users
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// [`IdentityError::Validation`] on malformed email, blank name, short
    /// password, or already-registered email.
    pub async fn register(&self, payload: RegisterUser) -> Result<UserRecord, IdentityError> {
        let email = normalize_email(&payload.email)?;

        if payload.name.trim().is_empty() {
            return Err(IdentityError::Validation {
                message: "Name must not be blank".into(),
                context: None,
            });
        }
        self.check_password_length(&payload.password)?;

        let hash = password::hash_password(&payload.password)?;
        self.inner.users.create(&email, payload.name.trim(), &hash).await
    }

    /// Exchanges credentials for a signed bearer token.
    ///
    /// # Errors
    /// [`IdentityError::Credentials`] on unknown email, wrong password, or a
    /// deactivated account; the caller cannot tell which.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let email = normalize_email(email)
            .map_err(|_| IdentityError::Credentials { context: None })?;

        let Some(user) = self.inner.users.find_by_email(&email).await? else {
            return Err(IdentityError::Credentials { context: None });
        };

        if !password::verify_password(password, &user.password_hash)? || !user.is_active {
            return Err(IdentityError::Credentials { context: None });
        }

        self.inner.tokens.issue(&user.id)
    }

    /// Resolves a bearer token to its active user.
    ///
    /// # Errors
    /// [`IdentityError::Auth`] when the token is invalid or the user is gone
    /// or deactivated.
    pub async fn authenticate(&self, token: &str) -> Result<UserRecord, IdentityError> {
        let claims = self.inner.tokens.verify(token).await?;

        let Some(user) = self.inner.users.find_by_id(&claims.sub).await? else {
            return Err(IdentityError::Auth {
                message: "User no longer exists".into(),
                context: None,
            });
        };

        if !user.is_active {
            return Err(IdentityError::Auth {
                message: "User account is disabled".into(),
                context: None,
            });
        }

        Ok(user)
    }

    /// Applies a partial profile update for an authenticated user.
    ///
    /// Email is immutable; a new password is re-validated and re-hashed.
    ///
    /// # Errors
    /// [`IdentityError::Validation`] on blank name or short password.
    pub async fn update_profile(
        &self,
        user: &UserRecord,
        payload: UpdateProfile,
    ) -> Result<UserRecord, IdentityError> {
        let name = match payload.name {
            Some(name) => {
                if name.trim().is_empty() {
                    return Err(IdentityError::Validation {
                        message: "Name must not be blank".into(),
                        context: None,
                    });
                }
                name.trim().to_owned()
            }
            None => user.name.clone(),
        };

        let password_hash = match payload.password {
            Some(password) => {
                self.check_password_length(&password)?;
                password::hash_password(&password)?
            }
            None => user.password_hash.clone(),
        };

        self.inner.users.update_profile(&user.id, &name, &password_hash).await?;

        Ok(UserRecord { name, password_hash, ..user.clone() })
    }

    fn check_password_length(&self, password: &str) -> Result<(), IdentityError> {
        if password.len() < self.inner.min_password_length {
            return Err(IdentityError::Validation {
                message: format!(
                    "Password must be at least {} characters long",
                    self.inner.min_password_length
                )
                .into(),
                context: None,
            });
        }
        Ok(())
    }
}

/// Initialize the identity feature.
///
/// # Errors
/// Returns an error if the token service rejects the JWT configuration.
pub fn init(config: &ApiConfig, db: &Database) -> Result<InitializedSlice, IdentityError> {
    let identity_cfg = &config.security.identity;

    let inner = IdentityInner {
        users: UserRepository::new(db.clone()),
        tokens: TokenService::new(identity_cfg)?,
        min_password_length: identity_cfg.min_password_length,
    };

    tracing::info!("Identity server slice initialized");

    Ok(InitializedSlice::new(Identity::new(inner)))
}

/// Routes owned by this slice.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::register))
        .routes(routes!(handlers::token))
        .routes(routes!(handlers::me, handlers::update_me))
}

/// Lowercases and sanity-checks a login email.
fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(IdentityError::Validation {
            message: "Enter a valid email address".into(),
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(
            normalize_email(" TestUser@Gmail.com ").expect("valid email"),
            "testuser@gmail.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("@gmail.com").is_err());
        assert!(normalize_email("user@").is_err());
        assert!(normalize_email("user@nodot").is_err());
        assert!(normalize_email("a b@gmail.com").is_err());
    }
}
