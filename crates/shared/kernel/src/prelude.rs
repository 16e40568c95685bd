//! Convenience re-exports for handler and router code.

pub use crate::safe_nanoid;
pub use crate::server::error::{ApiError, ErrorResponse};
pub use crate::server::state::ApiState;
pub use ladle_domain::config::ApiConfig;
