//! Auth module: login and registration use cases over the player repository.
//!
//! Password handling is a plain-text comparison and the token is a fixed
//! placeholder; neither is a security primitive.

pub mod domain;
pub mod errors;
pub mod service;

pub use errors::AuthError;
pub use service::AuthService;
