use crate::error::{IdentityError, IdentityErrorExt};
use crate::models::UserRecord;
use ladle_database::Database;
use ladle_kernel::safe_nanoid;
use tracing::{debug, instrument};

const USER_FIELDS: &str = "record::id(id) AS id, email, name, password_hash, is_active, is_staff";

/// Persistence for the `user` table. Passwords arrive here already hashed.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a new user and returns the stored row.
    ///
    /// # Errors
    /// [`IdentityError::Validation`] when the email is already registered;
    /// [`IdentityError::Database`] on engine failures.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserRecord, IdentityError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(duplicate_email());
        }

        let id = safe_nanoid!();
        let result = self
            .db
            .query(
                "CREATE ONLY type::thing('user', $id)
                 SET email = $email, name = $name, password_hash = $password_hash",
            )
            .bind(("id", id.clone()))
            .bind(("email", email.to_owned()))
            .bind(("name", name.to_owned()))
            .bind(("password_hash", password_hash.to_owned()))
            .await
            .context("Creating user")?
            .check()
            .map_err(surrealdb::Error::from);

        if let Err(e) = result {
            // The unique index is the backstop for racing registrations.
            if e.to_string().contains("user_email_unique") {
                return Err(duplicate_email());
            }
            return Err(e.into());
        }

        debug!(user = %id, "User created");
        Ok(UserRecord {
            id,
            email: email.to_owned(),
            name: name.to_owned(),
            password_hash: password_hash.to_owned(),
            is_active: true,
            is_staff: false,
        })
    }

    /// Looks a user up by login email.
    ///
    /// # Errors
    /// [`IdentityError::Database`] on engine failures.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, IdentityError> {
        let mut response = self
            .db
            .query(format!("SELECT {USER_FIELDS} FROM user WHERE email = $email LIMIT 1"))
            .bind(("email", email.to_owned()))
            .await
            .context("Selecting user by email")?;

        let mut users =
            response.take::<Vec<UserRecord>>(0).context("Parsing user by email")?;
        Ok(users.pop())
    }

    /// Looks a user up by record key.
    ///
    /// # Errors
    /// [`IdentityError::Database`] on engine failures.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, IdentityError> {
        let mut response = self
            .db
            .query(format!("SELECT {USER_FIELDS} FROM ONLY type::thing('user', $id)"))
            .bind(("id", id.to_owned()))
            .await
            .context("Selecting user by id")?;

        response.take::<Option<UserRecord>>(0).context("Parsing user by id")
    }

    /// Replaces the mutable profile fields of a user.
    ///
    /// Callers pass the full new values; merging partial updates happens in the
    /// service layer where validation lives.
    ///
    /// # Errors
    /// [`IdentityError::Database`] on engine failures.
    #[instrument(skip(self, password_hash))]
    pub async fn update_profile(
        &self,
        id: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<(), IdentityError> {
        self.db
            .query(
                "UPDATE ONLY type::thing('user', $id)
                 SET name = $name, password_hash = $password_hash",
            )
            .bind(("id", id.to_owned()))
            .bind(("name", name.to_owned()))
            .bind(("password_hash", password_hash.to_owned()))
            .await
            .context("Updating user profile")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Applying user profile update")?;

        debug!(user = %id, "User profile updated");
        Ok(())
    }
}

fn duplicate_email() -> IdentityError {
    IdentityError::Validation {
        message: "A user with this email already exists".into(),
        context: None,
    }
}
