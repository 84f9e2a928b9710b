// Pub Companion - sign-in core
//
// One-time code issuance and verification, account resolution and
// session tokens, served over HTTP by the `server` binary.
//
// Domains live in domains/*; infrastructure (delivery, deps, jobs) in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
