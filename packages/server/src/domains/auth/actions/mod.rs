//! Auth domain actions - called directly from the HTTP routes

mod issue_code;
mod verify_code;

pub use issue_code::{issue_code, issue_code_at, IssuedCode};
pub use verify_code::{verify_code, verify_code_at, VerifiedAccount};
