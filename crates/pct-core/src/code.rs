//! Opaque token code generation.

use rand::Rng;
use uuid::Uuid;

const SUFFIX_DIGITS: usize = 8;

/// Generate a fresh token code: `<uuid v4>_<8 random decimal digits>`.
///
/// Both parts draw from the OS-seeded RNG.
///
/// # Panics
///
/// Panics if the operating system's random source is unavailable. A
/// predictable code is never produced in its place.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_DIGITS)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect();

    format!("{}_{}", Uuid::new_v4(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_shape() {
        let code = generate_code();
        let (uuid, digits) = code.split_once('_').unwrap();

        assert!(Uuid::parse_str(uuid).is_ok());
        assert_eq!(digits.len(), SUFFIX_DIGITS);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_many_codes_are_unique() {
        let codes: HashSet<String> = (0..50_000).map(|_| generate_code()).collect();
        assert_eq!(codes.len(), 50_000);
    }

    proptest! {
        #[test]
        fn no_collisions_for_any_batch_size(n in 1usize..2_000) {
            let codes: HashSet<String> = (0..n).map(|_| generate_code()).collect();
            prop_assert_eq!(codes.len(), n);
        }
    }
}
