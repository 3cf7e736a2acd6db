use num_bigint::BigUint;
use tokio::sync::Mutex;

use crate::{
    combinatorics::{enumerate, practical_cap, theoretical_count},
    errors::AliasError,
    ledger::{Durability, ProgressLedger, Removal},
    normalize::BaseEmail,
};

/// Progress of one base address, as shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailSummary {
    pub base: BaseEmail,
    /// Exact size of the combination space (display only).
    pub theoretical_total: BigUint,
    /// Addressable combinations; the authority for `remaining`.
    pub cap: u64,
    /// Issued so far, clamped to `cap`.
    pub offset: u64,
    pub remaining: u64,
    /// Whether the ledger holds a record for this address.
    pub recorded: bool,
}

/// A freshly issued batch of aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedBatch {
    pub base: BaseEmail,
    pub theoretical_total: BigUint,
    pub aliases: Vec<String>,
    pub issued_before: u64,
    pub issued_after: u64,
    pub remaining: u64,
    pub durability: Durability,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset {
        base: BaseEmail,
        previous_offset: u64,
        durability: Durability,
    },
    NothingToReset {
        base: BaseEmail,
    },
}

/// Alias issuance over the progress ledger.
///
/// Every ledger read-modify-write happens under one lock, so concurrent requests
/// for the same address never receive overlapping slices.
pub struct AliasService {
    ledger: Mutex<ProgressLedger>,
    fold_local_case: bool,
}

impl AliasService {
    pub fn new(ledger: ProgressLedger, fold_local_case: bool) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            fold_local_case,
        }
    }

    pub fn resolve(&self, address: &str) -> Result<BaseEmail, AliasError> {
        BaseEmail::parse(address, self.fold_local_case)
    }

    /// Read-only progress report for an address.
    pub async fn status(&self, address: &str) -> Result<EmailSummary, AliasError> {
        let base = self.resolve(address)?;
        let ledger = self.ledger.lock().await;
        Ok(summarize(&ledger, base))
    }

    /// Issue the next `count` aliases for `address` and record the new offset.
    pub async fn generate(&self, address: &str, count: u64) -> Result<GeneratedBatch, AliasError> {
        let base = self.resolve(address)?;
        let mut ledger = self.ledger.lock().await;
        let summary = summarize(&ledger, base);

        if summary.remaining == 0 {
            tracing::info!(key = %summary.base.key(), "alias space exhausted");
            return Err(AliasError::SpaceExhausted);
        }
        if count > summary.remaining {
            return Err(AliasError::RequestTooLarge {
                requested: count,
                remaining: summary.remaining,
            });
        }

        let aliases: Vec<String> = enumerate(
            &summary.base.normalized,
            &summary.base.domain,
            summary.offset,
            count,
        )
        .collect();
        let issued_after = summary.offset + aliases.len() as u64;

        let durability = if aliases.is_empty() {
            Durability::Durable
        } else {
            ledger.upsert_offset(
                &summary.base.key(),
                &summary.base.normalized,
                &summary.base.domain,
                issued_after,
            )
        };

        tracing::info!(
            key = %summary.base.key(),
            before = summary.offset,
            after = issued_after,
            "issued aliases"
        );

        Ok(GeneratedBatch {
            remaining: summary.cap - issued_after,
            issued_before: summary.offset,
            issued_after,
            aliases,
            theoretical_total: summary.theoretical_total,
            base: summary.base,
            durability,
        })
    }

    /// Forget all progress for an address.
    pub async fn reset(&self, address: &str) -> Result<ResetOutcome, AliasError> {
        let base = self.resolve(address)?;
        let mut ledger = self.ledger.lock().await;
        match ledger.remove(&base.key()) {
            Removal::Removed { record, durability } => {
                tracing::info!(key = %base.key(), previous = record.offset, "alias progress reset");
                Ok(ResetOutcome::Reset {
                    base,
                    previous_offset: record.offset,
                    durability,
                })
            }
            Removal::Absent => Ok(ResetOutcome::NothingToReset { base }),
        }
    }
}

fn summarize(ledger: &ProgressLedger, base: BaseEmail) -> EmailSummary {
    let n = base.letters();
    let cap = practical_cap(n);
    let record = ledger.get(&base.key());
    // A cap that shrank between versions must not yield a negative remainder.
    let offset = record.map_or(0, |r| r.offset).min(cap);
    EmailSummary {
        recorded: record.is_some(),
        theoretical_total: theoretical_count(n),
        cap,
        offset,
        remaining: cap - offset,
        base,
    }
}
