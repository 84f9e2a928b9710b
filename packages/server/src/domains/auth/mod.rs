//! Auth domain - one-time code sign-in
//!
//! Responsibilities:
//! - Issuing 6-digit codes and delivering them by email or SMS
//! - Atomically redeeming codes and resolving the contact's account
//! - Session/JWT token management

pub mod actions;
pub mod code;
pub mod errors;
pub mod jwt;
pub mod models;

pub use errors::AuthError;
pub use jwt::{Claims, JwtService};
