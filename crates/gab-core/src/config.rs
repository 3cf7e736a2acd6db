use std::{env, fs, path::Path, path::PathBuf, time::Duration};

use crate::{errors::Error, messaging::throttled::ThrottleConfig, Result};

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,

    // Progress ledger
    pub alias_state_file: PathBuf,
    pub fold_local_part_case: bool,

    // Conversation
    pub max_aliases_per_request: u64,

    // Outbound pacing
    pub throttle: ThrottleConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = lookup("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| lookup("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let alias_state_file = lookup("ALIAS_STATE_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/aliases_state.json"));
        let fold_local_part_case = parse_bool(lookup("FOLD_LOCAL_PART_CASE")).unwrap_or(false);

        let max_aliases_per_request = match lookup("MAX_ALIASES_PER_REQUEST") {
            None => 1000,
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&n| n >= 1)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "MAX_ALIASES_PER_REQUEST must be a positive integer, got {v:?}"
                    ))
                })?,
        };

        let defaults = ThrottleConfig::default();
        let throttle = ThrottleConfig {
            global_min_interval: parse_u64(lookup("THROTTLE_GLOBAL_MS"))
                .map(Duration::from_millis)
                .unwrap_or(defaults.global_min_interval),
            per_chat_min_interval: parse_u64(lookup("THROTTLE_PER_CHAT_MS"))
                .map(Duration::from_millis)
                .unwrap_or(defaults.per_chat_min_interval),
        };

        Ok(Self {
            bot_token,
            alias_state_file,
            fold_local_part_case,
            max_aliases_per_request,
            throttle,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(v: Option<String>) -> Option<bool> {
    v.map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn cfg(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let c = cfg(&[("BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(c.bot_token, "123:abc");
        assert_eq!(c.alias_state_file, PathBuf::from("data/aliases_state.json"));
        assert!(!c.fold_local_part_case);
        assert_eq!(c.max_aliases_per_request, 1000);
        assert_eq!(c.throttle.per_chat_min_interval, Duration::from_millis(1050));
    }

    #[test]
    fn token_is_required_with_fallback_name() {
        assert!(matches!(cfg(&[]), Err(Error::Config(_))));
        assert!(matches!(cfg(&[("BOT_TOKEN", "  ")]), Err(Error::Config(_))));
        let c = cfg(&[("TELEGRAM_BOT_TOKEN", "t")]).unwrap();
        assert_eq!(c.bot_token, "t");
    }

    #[test]
    fn overrides_are_parsed() {
        let c = cfg(&[
            ("BOT_TOKEN", "t"),
            ("ALIAS_STATE_FILE", "/var/lib/gab/state.json"),
            ("FOLD_LOCAL_PART_CASE", "yes"),
            ("MAX_ALIASES_PER_REQUEST", "50"),
            ("THROTTLE_GLOBAL_MS", "0"),
            ("THROTTLE_PER_CHAT_MS", "200"),
        ])
        .unwrap();
        assert_eq!(c.alias_state_file, PathBuf::from("/var/lib/gab/state.json"));
        assert!(c.fold_local_part_case);
        assert_eq!(c.max_aliases_per_request, 50);
        assert_eq!(c.throttle.global_min_interval, Duration::from_millis(0));
        assert_eq!(c.throttle.per_chat_min_interval, Duration::from_millis(200));
    }

    #[test]
    fn rejects_non_positive_batch_limit() {
        let r = cfg(&[("BOT_TOKEN", "t"), ("MAX_ALIASES_PER_REQUEST", "0")]);
        assert!(matches!(r, Err(Error::Config(_))));
    }

    #[test]
    fn dotenv_lines_are_parsed() {
        let parsed = parse_dotenv(
            "# comment\nBOT_TOKEN=\"abc\"\nexport ALIAS_STATE_FILE='x.json'\n\nbroken line\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("BOT_TOKEN".to_string(), "abc".to_string()),
                ("ALIAS_STATE_FILE".to_string(), "x.json".to_string()),
            ]
        );
    }
}
