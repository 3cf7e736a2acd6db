//! Address syntax check and the provider's alias-equivalence rule.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::AliasError;

const TAG_SEPARATOR: char = '+';
const DOT: char = '.';

fn gmail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[^@\s]+@gmail\.com$").expect("valid regex"))
}

/// `true` for `something@gmail.com` (domain case-insensitive, no whitespace).
pub fn is_gmail_address(text: &str) -> bool {
    gmail_re().is_match(text)
}

/// Split an address at its `@` into `(raw_local, lowercased_domain)`.
pub fn split_address(address: &str) -> Option<(&str, String)> {
    let (local, domain) = address.trim().split_once('@')?;
    if domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some((local, domain.to_lowercase()))
}

/// Drop any `+tag` suffix, then every dot.
///
/// Case is preserved. The result may be empty for degenerate input (`"+x"`, `"."`).
pub fn normalize_local_part(raw: &str) -> String {
    let untagged = raw
        .split_once(TAG_SEPARATOR)
        .map_or(raw, |(head, _)| head);
    untagged.chars().filter(|&c| c != DOT).collect()
}

/// Canonical base address identifying one combination space.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseEmail {
    /// Local part without dots or tag.
    pub normalized: String,
    /// Lowercased domain.
    pub domain: String,
}

impl BaseEmail {
    /// Normalize a raw address.
    ///
    /// With `fold_local_case` the local part is lowercased as well, so addresses
    /// differing only in local-part case share one ledger entry.
    pub fn parse(address: &str, fold_local_case: bool) -> Result<Self, AliasError> {
        let (raw_local, domain) = split_address(address).ok_or(AliasError::InvalidAddress)?;
        let mut normalized = normalize_local_part(raw_local);
        if fold_local_case {
            normalized = normalized.to_lowercase();
        }
        if normalized.is_empty() {
            return Err(AliasError::EmptyLocalPart);
        }
        Ok(Self { normalized, domain })
    }

    /// Ledger key: `normalized@domain`.
    pub fn key(&self) -> String {
        format!("{}@{}", self.normalized, self.domain)
    }

    /// Number of letters in the normalized local part.
    pub fn letters(&self) -> usize {
        self.normalized.chars().count()
    }
}
