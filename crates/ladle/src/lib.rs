//! Facade crate for `Ladle` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Call [`init`] to register feature slices; extend as new slices appear.
//! - Merge [`server::router::system_router`] and [`server::router::api_router`]
//!   into the application router.

use ladle_database::Database;
pub use ladle_domain as domain;
use ladle_domain::config::ApiConfig;
pub use ladle_kernel as kernel;
use ladle_media::MediaStore;

pub mod server {
    pub mod router {
        use ladle_kernel::prelude::ApiState;
        use utoipa_axum::router::OpenApiRouter;

        pub use ladle_kernel::server::router::system_router;

        /// All feature-slice routes, merged.
        pub fn api_router() -> OpenApiRouter<ApiState> {
            OpenApiRouter::new()
                .merge(crate::features::identity::router())
                .merge(crate::features::catalog::router())
        }
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use ladle_catalog as catalog;
    pub use ladle_identity as identity;

    /// Build-time enabled features.
    pub const ENABLED: &[&str] = &["identity", "catalog"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features for server mode.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    media: &MediaStore,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Identity
    slices.push(features::identity::init(config, database)?);

    // Catalog
    slices.push(features::catalog::init(database, media)?);

    Ok(slices)
}
