//! Account domain - accounts bound to a verified contact, plus profile data

pub mod actions;
pub mod models;

pub use models::{Account, AccountSummary};
