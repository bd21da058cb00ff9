//! Auth gate: bearer tokens, password hashing and the axum extractors that
//! yield a caller identity.

mod extract;
mod jwt;
mod password;

pub use extract::{AuthUser, MaybeAuthUser};
pub use jwt::{Claims, JwtKeys};
pub use password::{hash_password, verify_password};
