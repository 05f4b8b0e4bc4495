//! Authentication: bcrypt credentials, HS256 bearer tokens and the
//! [`Principal`] handed to handlers.

pub mod middleware;
pub mod password;
pub mod principal;
pub mod token;

pub use middleware::require_auth;
pub use password::PasswordHasher;
pub use principal::{AdminPrincipal, Principal};
pub use token::{Claims, TokenIssuer, TOKEN_TTL_HOURS};
