//! # Database Infrastructure
//!
//! This crate provides a unified interface for initializing and managing [SurrealDB](https://surrealdb.com)
//! connections across the workspace.
//!
//! ## Key Features
//! - **Engine Agnostic**: Supports `mem://`, `ws://`, and `http://` via the `any` engine.
//! - **Resilient Connectivity**: Built-in retry loop that waits for the database to accept
//!   connections before anything else runs (migrations included).
//! - **Embedded Migrations**: Versioned, checksummed schema scripts applied on init.
//! - **Builder Pattern**: Fluent API for configuring connections and authentication.
//!
//! ## Example
//!
//! ```rust
//! use ladle_database::{Database, DatabaseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("ladle", "catalog")
//!         .init()
//!         .await?;
//!
//!     let _version = db.version().await?;
//!
//!     Ok(())
//! }
//! ```

mod error;
mod manifest;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
use migrations::MigrationRunner;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, trace, warn};

/// Default number of health-check attempts before giving up on the engine.
static DEFAULT_WAIT_RETRIES: u32 = 10;
/// Initial delay between health-check attempts; doubles per attempt up to [`MAX_WAIT_DELAY`].
static INITIAL_WAIT_DELAY: Duration = Duration::from_millis(500);
/// Upper bound for the backoff delay between health-check attempts.
static MAX_WAIT_DELAY: Duration = Duration::from_secs(5);

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// `SurrealDB` client wrapper that provides thread-safety and contextual error handling.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// The active namespace of this session.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    /// The active database of this session.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// A fluent builder for configuring and establishing a `SurrealDB` connection.
///
/// This builder ensures that fundamental parameters like the connection URL,
/// namespace, and database name are provided upfront.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
    wait_retries: u32,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self { url: None, ns: None, db: None, auth: None, wait_retries: DEFAULT_WAIT_RETRIES }
    }
}

impl DatabaseBuilder {
    /// Creates a new [`DatabaseBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the namespace and database name.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Add root credentials to the connection.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Overrides how many health-check attempts are made while waiting for the engine.
    pub const fn wait_retries(mut self, retries: u32) -> Self {
        self.wait_retries = if retries == 0 { 1 } else { retries };
        self
    }

    /// Consumes the builder and attempts to establish a connection to the database.
    ///
    /// This method executes the full connection lifecycle, including engine initialization,
    /// health check retries with exponential backoff, authentication, session activation,
    /// and schema migrations.
    ///
    /// # Process
    /// 1. **Validation**: Ensures URL, Namespace, and Database name are provided.
    /// 2. **Engine Initialization**: Connects to the underlying `SurrealDB` engine (Any).
    /// 3. **Wait for Database**: Performs health checks until the engine responds, retrying
    ///    with exponential backoff (starting at 500ms, capped at 5s) up to the configured
    ///    retry budget. Serving never starts against an unreachable database.
    /// 4. **Authentication**: If credentials were provided via [`auth`](Self::auth), signs
    ///    in as a Root user.
    /// 5. **Session Activation**: Sets the global namespace and database for the connection.
    /// 6. **Migrations**: Applies the embedded migration set; already-applied versions are
    ///    checksum-verified and skipped.
    ///
    /// # Returns
    /// * `Ok(Database)` - A thread-safe, cloned handle to the established session.
    /// * `Err(DatabaseError)` - Detailed error information if any step of the process fails.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if required parameters are missing.
    /// * [`DatabaseError::Connection`] if the engine fails to start or remains unhealthy.
    /// * [`DatabaseError::Auth`] if the provided credentials are rejected.
    /// * [`DatabaseError::Migration`] if a migration fails or its history checksum drifted.
    /// * [`DatabaseError::Surreal`] if the session activation (`use_ns`/`use_db`) fails.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self.url.ok_or(DatabaseError::Validation {
            message: "URL is required".into(),
            context: None,
        })?;
        let ns = self.ns.ok_or(DatabaseError::Validation {
            message: "Namespace is required".into(),
            context: None,
        })?;
        let db = self.db.ok_or(DatabaseError::Validation {
            message: "Database is required".into(),
            context: None,
        })?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        // 1. Wait for the database: connectivity & health check with retries
        let mut delay = INITIAL_WAIT_DELAY;
        for attempt in 1..=self.wait_retries {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == self.wait_retries {
                return Err(DatabaseError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Database not ready, retrying...");
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_WAIT_DELAY);
        }

        // 2. Authentication
        if let Some((u, p)) = self.auth {
            instance.signin(Root { username: u, password: p }).await.map_err(|e| {
                DatabaseError::Auth { message: e.to_string().into(), context: Some(url.into()) }
            })?;
        }

        // 3. Session Initialization
        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB connection established");

        // 4. Schema Migrations
        let database = Database { inner: Arc::new(DatabaseInner { instance, ns, db }) };
        database.migrate().await?;

        Ok(database)
    }
}

/// Outcome of a migration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Migrations executed by this pass.
    pub applied: usize,
    /// Migrations already present in the history (checksum-verified).
    pub skipped: usize,
}

impl Database {
    /// Applies the embedded migration set against this session.
    ///
    /// Called automatically by [`DatabaseBuilder::init`]; safe to call again, in
    /// which case every migration is checksum-verified and skipped.
    ///
    /// # Errors
    /// * [`DatabaseError::Migration`] on script failure or history checksum drift.
    /// * [`DatabaseError::Surreal`] on engine errors while reading the history.
    pub async fn migrate(&self) -> Result<MigrationSummary, DatabaseError> {
        info!("Applying database migrations...");
        let report = MigrationRunner::new(self.inner.instance.clone()).run().await?;

        let summary =
            MigrationSummary { applied: report.applied.len(), skipped: report.skipped.len() };
        for skipped in report.skipped {
            trace!(slice = skipped.slice, version = skipped.version, "Skipping migration");
        }
        for applied in report.applied {
            info!(slice = applied.slice, version = applied.version, "Applied migration");
        }
        info!(applied = summary.applied, skipped = summary.skipped, "Database migrations applied");

        Ok(summary)
    }
}
