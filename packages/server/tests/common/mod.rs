// Common test utilities

pub mod harness;
pub mod http;

pub use harness::*;
pub use http::*;

use uuid::Uuid;

/// A unique, valid email so tests sharing the database never collide
pub fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4().simple())
}

/// A unique, valid UK mobile number in normalized form
pub fn unique_phone() -> String {
    let digits = Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("+44{:010}", digits)
}
