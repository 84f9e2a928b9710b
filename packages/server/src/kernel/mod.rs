//! Kernel module - server infrastructure and dependencies.

pub mod delivery;
pub mod deps;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use delivery::{build_delivery, LogDelivery, ProviderDelivery};
pub use deps::{AuthSettings, ServerDeps};
pub use test_dependencies::{MockCodeDelivery, TestDependencies};
pub use traits::*;
