//! Numeric one-time code generation and shape checks.

use rand::rngs::OsRng;
use rand::Rng;

pub const CODE_LENGTH: usize = 6;
const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Generate a uniformly random 6-digit code in `100000..=999999`.
pub fn generate_code() -> String {
    generate_code_with(&mut OsRng)
}

pub fn generate_code_with<R: Rng>(rng: &mut R) -> String {
    rng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// True when `code` is exactly six ASCII digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_codes_are_six_digits_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let code = generate_code_with(&mut rng);
            assert!(is_well_formed(&code), "{code} is not six digits");
            let value: u32 = code.parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value));
        }
    }

    #[test]
    fn test_os_rng_codes_are_well_formed() {
        for _ in 0..100 {
            assert!(is_well_formed(&generate_code()));
        }
    }

    #[test]
    fn test_codes_vary() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = generate_code_with(&mut rng);
        assert!((0..50).any(|_| generate_code_with(&mut rng) != first));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("482913"));
        assert!(is_well_formed("000000"));
        assert!(!is_well_formed("48291"));
        assert!(!is_well_formed("4829134"));
        assert!(!is_well_formed("48a913"));
        assert!(!is_well_formed(" 48291"));
        assert!(!is_well_formed("４８２９１３"));
    }
}
