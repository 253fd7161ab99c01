//! Pattern placeholders resolved per cycle.
//!
//! Supports placeholders:
//! - `{index}` - cycle number
//! - `{uuid}` - random UUID
//! - `{rand:N}` - random N-digit number
//!
//! All randomness is drawn from the RNG passed in, so a cycle resolves to the
//! same text whichever worker runs it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// RNG for `cycle` of a run seeded with `seed`.
pub fn cycle_rng(seed: u64, cycle: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(cycle.wrapping_mul(0x9E3779B97F4A7C15)))
}

/// Expand the placeholders in `pattern`.
pub fn resolve_pattern<R: Rng>(pattern: &str, rng: &mut R, index: u64) -> String {
    if !pattern.contains('{') {
        return pattern.to_string();
    }

    let mut result = pattern.replace("{index}", &index.to_string());

    while result.contains("{uuid}") {
        let uuid = uuid::Builder::from_random_bytes(rng.random()).into_uuid();
        result = result.replacen("{uuid}", &format_uuid(uuid), 1);
    }

    // Scan forward so an unparseable `{rand:x}` is left in place without
    // hiding later placeholders.
    let mut search_from = 0;
    while let Some(offset) = result[search_from..].find("{rand:") {
        let start = search_from + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let end = start + len;
        match result[start + 6..end].parse::<usize>() {
            Ok(digits) => {
                let random_num = random_digits(rng, digits);
                result = format!("{}{}{}", &result[..start], random_num, &result[end + 1..]);
                search_from = start + random_num.len();
            }
            Err(_) => search_from = end + 1,
        }
    }

    result
}

fn format_uuid(uuid: Uuid) -> String {
    uuid.hyphenated().to_string()
}

/// A random number with exactly `digits` digits.
fn random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    let mut result = String::with_capacity(digits);
    for position in 0..digits {
        // No leading zero
        let low = if position == 0 { 1 } else { 0 };
        let digit: u8 = rng.random_range(low..10);
        result.push(char::from(b'0' + digit));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_index() {
        let mut rng = cycle_rng(42, 0);
        assert_eq!(
            resolve_pattern("user_{index}@example.com", &mut rng, 123),
            "user_123@example.com"
        );
    }

    #[test]
    fn test_resolve_uuid() {
        let mut rng = cycle_rng(42, 0);
        let value = resolve_pattern("id-{uuid}-{uuid}", &mut rng, 0);

        assert!(value.starts_with("id-"));
        assert_eq!(value.len(), 3 + 36 + 1 + 36);
        let first = Uuid::parse_str(&value[3..39]).unwrap();
        let second = Uuid::parse_str(&value[40..]).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.get_version_num(), 4);
    }

    #[test]
    fn test_resolve_random_digits() {
        let mut rng = cycle_rng(42, 0);
        let value = resolve_pattern("code-{rand:6}", &mut rng, 0);

        assert!(value.starts_with("code-"));
        assert_eq!(value.len(), 5 + 6);
        assert!(value[5..].chars().all(|c| c.is_ascii_digit()));
        assert_ne!(&value[5..6], "0");
    }

    #[test]
    fn test_invalid_rand_is_kept() {
        let mut rng = cycle_rng(42, 0);
        let value = resolve_pattern("{rand:x}-{rand:2}-{rand:0}", &mut rng, 0);

        assert!(value.starts_with("{rand:x}-"));
        assert!(value.ends_with('-'));
        assert_eq!(value.len(), "{rand:x}-".len() + 2 + 1);
    }

    #[test]
    fn test_same_cycle_same_text() {
        let pattern = "{index}:{uuid}:{rand:8}";
        let a = resolve_pattern(pattern, &mut cycle_rng(7, 99), 99);
        let b = resolve_pattern(pattern, &mut cycle_rng(7, 99), 99);
        let c = resolve_pattern(pattern, &mut cycle_rng(7, 100), 100);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let mut rng = cycle_rng(1, 1);
        assert_eq!(resolve_pattern("plain [t] text", &mut rng, 5), "plain [t] text");
    }
}
