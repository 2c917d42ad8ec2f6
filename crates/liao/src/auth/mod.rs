//! Authentication module.
//!
//! Provides JWT issuance/validation middleware and the verification-code
//! store used by phone login and password reset.

mod claims;
mod codes;
mod error;
mod middleware;

pub use claims::Claims;
pub use codes::{CodeError, CodeStore, InMemoryCodeStore, generate_code};
pub use error::AuthError;
pub use middleware::{AuthState, CurrentUser, auth_middleware};
