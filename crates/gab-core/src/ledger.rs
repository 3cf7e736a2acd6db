//! Durable per-address issuance progress.
//!
//! The whole map lives in memory and is rewritten to a JSON file after every
//! mutation. Storage failures never propagate: they are logged and the in-memory
//! state stays authoritative until the process exits.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{utils::iso_timestamp_utc, Result};

/// Issued-offset for one base address.
///
/// Unknown fields are ignored on load; a missing `offset` reads as `0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub normalized: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Whether a mutation reached durable storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Durability {
    Durable,
    /// The write failed; the change holds only until restart.
    InMemoryOnly,
}

/// Result of [`ProgressLedger::remove`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Removal {
    Removed {
        record: ProgressRecord,
        durability: Durability,
    },
    Absent,
}

#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    records: BTreeMap<String, ProgressRecord>,
}

impl ProgressLedger {
    /// Load the persisted map, falling back to an empty one on any failure.
    pub fn load_or_init(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match read_records(&path) {
            Ok(Some(records)) => {
                tracing::info!(
                    path = %path.display(),
                    entries = records.len(),
                    "loaded alias progress"
                );
                records
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "no alias progress file yet; starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load alias progress; starting empty"
                );
                BTreeMap::new()
            }
        };
        Self { path, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ProgressRecord> {
        self.records.get(key)
    }

    /// Create or overwrite the record for `key`, then persist the full map.
    pub fn upsert_offset(
        &mut self,
        key: &str,
        normalized: &str,
        domain: &str,
        offset: u64,
    ) -> Durability {
        self.records.insert(
            key.to_string(),
            ProgressRecord {
                normalized: normalized.to_string(),
                domain: domain.to_string(),
                offset,
                updated_at: Some(iso_timestamp_utc()),
            },
        );
        self.persist()
    }

    /// Delete the record for `key` if present, persisting only on change.
    pub fn remove(&mut self, key: &str) -> Removal {
        let Some(record) = self.records.remove(key) else {
            return Removal::Absent;
        };
        let durability = self.persist();
        Removal::Removed { record, durability }
    }

    fn persist(&self) -> Durability {
        match write_records(&self.path, &self.records) {
            Ok(()) => Durability::Durable,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to save alias progress; keeping in-memory state"
                );
                Durability::InMemoryOnly
            }
        }
    }
}

fn read_records(path: &Path) -> Result<Option<BTreeMap<String, ProgressRecord>>> {
    if !path.exists() {
        return Ok(None);
    }
    let txt = fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(None);
    }
    let records = serde_json::from_str(&txt)?;
    Ok(Some(records))
}

/// Write to a sibling temp file, then rename over the target.
fn write_records(path: &Path, records: &BTreeMap<String, ProgressRecord>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let txt = serde_json::to_string_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, txt)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir()
            .join(format!("{prefix}-{pid}-{ts}"))
            .join("aliases_state.json")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn missing_file_starts_empty() {
        let path = tmp_path("gab-ledger-missing");
        let ledger = ProgressLedger::load_or_init(&path);
        assert!(ledger.is_empty());
        assert!(ledger.get("ab@gmail.com").is_none());
    }

    #[test]
    fn upsert_survives_reload() {
        let path = tmp_path("gab-ledger-roundtrip");
        let mut ledger = ProgressLedger::load_or_init(&path);
        let d = ledger.upsert_offset("john@gmail.com", "john", "gmail.com", 5);
        assert_eq!(d, Durability::Durable);

        let reloaded = ProgressLedger::load_or_init(&path);
        let rec = reloaded.get("john@gmail.com").unwrap();
        assert_eq!(rec.offset, 5);
        assert_eq!(rec.normalized, "john");
        assert_eq!(rec.domain, "gmail.com");
        assert!(!path.with_extension("json.tmp").exists());
        cleanup(&path);
    }

    #[test]
    fn remove_reports_absent_and_present() {
        let path = tmp_path("gab-ledger-remove");
        let mut ledger = ProgressLedger::load_or_init(&path);
        assert_eq!(ledger.remove("ab@gmail.com"), Removal::Absent);

        ledger.upsert_offset("ab@gmail.com", "ab", "gmail.com", 2);
        match ledger.remove("ab@gmail.com") {
            Removal::Removed { record, durability } => {
                assert_eq!(record.offset, 2);
                assert_eq!(durability, Durability::Durable);
            }
            Removal::Absent => panic!("record should have existed"),
        }

        let reloaded = ProgressLedger::load_or_init(&path);
        assert!(reloaded.get("ab@gmail.com").is_none());
        cleanup(&path);
    }

    #[test]
    fn corrupt_file_falls_back_to_empty() {
        let path = tmp_path("gab-ledger-corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let ledger = ProgressLedger::load_or_init(&path);
        assert!(ledger.is_empty());
        cleanup(&path);
    }

    #[test]
    fn tolerates_unknown_and_missing_fields() {
        let path = tmp_path("gab-ledger-compat");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{
              "ab@gmail.com": { "normalized": "ab", "domain": "gmail.com", "offset": 1, "note": "x" },
              "cd@gmail.com": { "normalized": "cd", "domain": "gmail.com" }
            }"#,
        )
        .unwrap();

        let ledger = ProgressLedger::load_or_init(&path);
        assert_eq!(ledger.get("ab@gmail.com").unwrap().offset, 1);
        assert_eq!(ledger.get("cd@gmail.com").unwrap().offset, 0);
        cleanup(&path);
    }

    #[test]
    fn unwritable_storage_degrades_to_memory() {
        let root = tmp_path("gab-ledger-unwritable");
        let dir = root.parent().unwrap().to_path_buf();
        fs::create_dir_all(&dir).unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.join("blocker");
        fs::write(&blocker, "x").unwrap();
        let path = blocker.join("aliases_state.json");

        let mut ledger = ProgressLedger::load_or_init(&path);
        let d = ledger.upsert_offset("ab@gmail.com", "ab", "gmail.com", 1);
        assert_eq!(d, Durability::InMemoryOnly);
        assert_eq!(ledger.get("ab@gmail.com").unwrap().offset, 1);
        let _ = fs::remove_dir_all(&dir);
    }
}
