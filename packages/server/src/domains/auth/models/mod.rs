pub mod verification_code;

pub use verification_code::{CodeStats, VerificationCode};
