pub mod account;

pub use account::{Account, AccountSummary, ProfileChanges, PLACEHOLDER_DISPLAY_NAME};
