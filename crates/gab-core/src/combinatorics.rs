//! Dot-placement combination space of a local part.
//!
//! A local part of `n` letters has `n - 1` gaps. Ordinal `i` is read as a bitmask
//! over those gaps: bit `j` set means a dot follows letter `j`. Aliases are issued
//! in ascending mask order, so a stored offset is also the next ordinal to issue.

use num_bigint::BigUint;

/// Highest ordinal count the engine addresses (`2^53 - 1`).
///
/// Offsets stay exactly representable for any JSON reader of the ledger.
pub const PRACTICAL_CAP_CEILING: u64 = (1u64 << 53) - 1;

const SEPARATOR: char = '.';

/// Exact size of the combination space for `n` letters: `1` if `n <= 1`, else `2^(n-1)`.
///
/// For display only; pagination is bounded by [`practical_cap`].
pub fn theoretical_count(n: usize) -> BigUint {
    if n <= 1 {
        return BigUint::from(1u8);
    }
    BigUint::from(1u8) << (n - 1)
}

/// Number of combinations the engine can address by ordinal for `n` letters.
pub fn practical_cap(n: usize) -> u64 {
    if n <= 1 {
        return 1;
    }
    let bits = n - 1;
    if bits >= 53 {
        return PRACTICAL_CAP_CEILING;
    }
    1u64 << bits
}

/// Aliases for ordinals `[start, min(start + count, cap))`, in ascending order.
///
/// The returned iterator is consumed once.
pub fn enumerate(local_part: &str, domain: &str, start: u64, count: u64) -> Aliases {
    let letters: Vec<char> = local_part.chars().collect();
    let cap = practical_cap(letters.len());
    let end = start.saturating_add(count).min(cap);
    Aliases {
        letters,
        domain: domain.to_string(),
        next: start,
        end,
    }
}

/// Render the alias for one mask.
pub fn alias_for_mask(letters: &[char], domain: &str, mask: u64) -> String {
    let mut out = String::with_capacity(letters.len() * 2 + domain.len() + 1);
    let last = letters.len().saturating_sub(1);
    for (j, &c) in letters.iter().enumerate() {
        out.push(c);
        if j < last && j < 64 && (mask >> j) & 1 == 1 {
            out.push(SEPARATOR);
        }
    }
    out.push('@');
    out.push_str(domain);
    out
}

/// Iterator over a contiguous slice of the combination space.
#[derive(Debug)]
pub struct Aliases {
    letters: Vec<char>,
    domain: String,
    next: u64,
    end: u64,
}

impl Iterator for Aliases {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.end {
            return None;
        }
        let alias = alias_for_mask(&self.letters, &self.domain, self.next);
        self.next += 1;
        Some(alias)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.end.saturating_sub(self.next);
        let left = usize::try_from(left).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Aliases {}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn collect(local: &str, start: u64, count: u64) -> Vec<String> {
        enumerate(local, "gmail.com", start, count).collect()
    }

    #[test]
    fn theoretical_count_is_exact() {
        assert_eq!(theoretical_count(0), BigUint::from(1u8));
        assert_eq!(theoretical_count(1), BigUint::from(1u8));
        assert_eq!(theoretical_count(2), BigUint::from(2u8));
        assert_eq!(theoretical_count(10), BigUint::from(512u32));
        assert_eq!(theoretical_count(64), BigUint::from(1u64 << 63));
        assert_eq!(
            theoretical_count(65).to_string(),
            "18446744073709551616" // 2^64
        );
        assert_eq!(theoretical_count(300).bits(), 300);
    }

    #[test]
    fn practical_cap_clamps_to_ceiling() {
        assert_eq!(practical_cap(0), 1);
        assert_eq!(practical_cap(1), 1);
        assert_eq!(practical_cap(2), 2);
        assert_eq!(practical_cap(53), 1u64 << 52);
        assert_eq!(practical_cap(54), PRACTICAL_CAP_CEILING);
        assert_eq!(practical_cap(300), PRACTICAL_CAP_CEILING);
    }

    #[test]
    fn two_letters_in_mask_order() {
        assert_eq!(collect("ab", 0, 2), vec!["ab@gmail.com", "a.b@gmail.com"]);
    }

    #[test]
    fn bit_j_places_dot_after_letter_j() {
        // mask 0b10 -> dot after the second letter only.
        assert_eq!(collect("abc", 2, 1), vec!["ab.c@gmail.com"]);
        assert_eq!(
            collect("abc", 0, 4),
            vec![
                "abc@gmail.com",
                "a.bc@gmail.com",
                "ab.c@gmail.com",
                "a.b.c@gmail.com"
            ]
        );
    }

    #[test]
    fn single_letter_space_has_one_member() {
        assert_eq!(collect("a", 0, 5), vec!["a@gmail.com"]);
        assert!(collect("a", 1, 5).is_empty());
        assert!(collect("a", 0, 0).is_empty());
    }

    #[test]
    fn out_of_range_and_zero_count_are_empty() {
        assert!(collect("abc", 4, 3).is_empty());
        assert!(collect("abc", 0, 0).is_empty());
        assert_eq!(collect("abc", 3, 10).len(), 1);
    }

    #[test]
    fn disjoint_pages_cover_space_without_duplicates() {
        let local = "abcdef"; // cap 32
        let mut seen = HashSet::new();
        let mut offset = 0u64;
        for page in [5u64, 1, 7, 19, 100] {
            let batch = collect(local, offset, page);
            offset += batch.len() as u64;
            for alias in batch {
                assert!(seen.insert(alias.clone()), "duplicate {alias}");
            }
        }
        assert_eq!(offset, 32);
        assert_eq!(seen.len(), 32);
        for alias in &seen {
            let local_part = alias.strip_suffix("@gmail.com").unwrap();
            assert_eq!(local_part.replace('.', ""), local);
            assert!(!local_part.starts_with('.') && !local_part.ends_with('.'));
            assert!(!local_part.contains(".."));
        }
    }

    #[test]
    fn long_local_parts_do_not_overflow() {
        let local = "a".repeat(300);
        let mut it = enumerate(&local, "gmail.com", PRACTICAL_CAP_CEILING - 2, 10);
        assert_eq!(it.len(), 2);
        // Both masks have 52 bits set below bit 53; the extra dot is ".com".
        let first = it.next().unwrap();
        let second = it.next().unwrap();
        assert_eq!(first.matches('.').count(), 53);
        assert_eq!(second.matches('.').count(), 53);
        assert_ne!(first, second);
        assert!(it.next().is_none());
    }

    #[test]
    fn size_hint_matches_yield() {
        let it = enumerate("abcd", "gmail.com", 3, 3);
        assert_eq!(it.len(), 3);
        assert_eq!(it.count(), 3);
    }
}
