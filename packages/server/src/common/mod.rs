// Common types and utilities shared across the application

pub mod contact;
pub mod id;

pub use contact::{Contact, ContactError, ContactKind};
pub use id::{AccountId, Id, VerificationCodeId};
