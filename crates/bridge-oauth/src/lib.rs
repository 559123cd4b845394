//! OAuth 2.1 bearer-token validation: JWKS-cached RSA JWT verification and
//! claim extraction for the MCP bridge's access filter.

pub mod claims;
pub mod jwks;
pub mod jwt;
pub mod validator;

pub use claims::ClaimSet;
pub use jwks::{Jwk, JwkSet, JwksCache};
pub use validator::Validator;
