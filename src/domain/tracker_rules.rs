//! Known tracker and link-shortener rule set.
//!
//! Rules are supplied as JSON. The `"tracker"` key holds an array of string
//! rules; any other keys are ignored so rule files can carry extra sections.
//!
//! ```json
//! {
//!   "tracker": [
//!     "bit.ly",
//!     "t.co",
//!     "/^https?://(www\\.)?google\\.[a-z.]+/url\\?/"
//!   ]
//! }
//! ```
//!
//! A plain rule is a host and matches that host and every subdomain. A rule
//! wrapped in slashes is a regular expression matched against the whole URL.

use regex::Regex;
use serde_json::Value;
use std::path::Path;
use url::Url;

/// Rule set shipped with the crate, used when no custom file is configured.
const BUNDLED_RULES: &str = include_str!("../../rules/trackers.json");

const TRACKER_KEY: &str = "tracker";

/// Errors that can occur while loading a rule set.
#[derive(Debug, thiserror::Error)]
pub enum TrackerRulesError {
    #[error("Failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rules are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rules must be a JSON object")]
    NotAnObject,

    #[error("\"tracker\" must be an array of strings")]
    InvalidTrackerList,

    #[error("Empty rule at index {0}")]
    EmptyRule(usize),

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Compiled tracker rules.
#[derive(Debug, Clone, Default)]
pub struct TrackerRules {
    hosts: Vec<String>,
    patterns: Vec<Regex>,
}

impl TrackerRules {
    /// A rule set that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the rule set bundled with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled file itself is malformed.
    pub fn bundled() -> Result<Self, TrackerRulesError> {
        Self::from_json_str(BUNDLED_RULES)
    }

    /// Loads rules from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackerRulesError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TrackerRulesError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(&value)
    }

    /// Compiles rules from an already parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRulesError::NotAnObject`] if the root is not an object,
    /// [`TrackerRulesError::InvalidTrackerList`] if `"tracker"` is not an array
    /// of strings, and [`TrackerRulesError::InvalidPattern`] for a regex rule
    /// that does not compile.
    pub fn from_json(value: &Value) -> Result<Self, TrackerRulesError> {
        let object = value.as_object().ok_or(TrackerRulesError::NotAnObject)?;

        let Some(list) = object.get(TRACKER_KEY) else {
            return Ok(Self::empty());
        };

        let list = list
            .as_array()
            .ok_or(TrackerRulesError::InvalidTrackerList)?;

        let mut rules = Self::empty();

        for (index, entry) in list.iter().enumerate() {
            let rule = entry
                .as_str()
                .ok_or(TrackerRulesError::InvalidTrackerList)?
                .trim();

            if rule.is_empty() {
                return Err(TrackerRulesError::EmptyRule(index));
            }

            match rule
                .strip_prefix('/')
                .and_then(|r| r.strip_suffix('/'))
                .filter(|r| !r.is_empty())
            {
                Some(pattern) => {
                    let regex =
                        Regex::new(pattern).map_err(|source| TrackerRulesError::InvalidPattern {
                            pattern: pattern.to_string(),
                            source,
                        })?;
                    rules.patterns.push(regex);
                }
                None => rules.hosts.push(rule.trim_matches('.').to_ascii_lowercase()),
            }
        }

        Ok(rules)
    }

    /// Returns true if the URL matches any host or pattern rule.
    ///
    /// URLs that cannot be parsed are only checked against pattern rules.
    pub fn is_tracker(&self, url: &str) -> bool {
        if let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            && self.hosts.iter().any(|rule| host_matches(&host, rule))
        {
            return true;
        }

        self.patterns.iter().any(|re| re.is_match(url))
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.hosts.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Matches `host` against `rule` exactly or as a parent domain.
fn host_matches(host: &str, rule: &str) -> bool {
    host == rule
        || host
            .strip_suffix(rule)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(list: Value) -> TrackerRules {
        TrackerRules::from_json(&json!({ "tracker": list })).unwrap()
    }

    #[test]
    fn test_host_rule_matches_exact_host() {
        let rules = rules(json!(["bit.ly"]));
        assert!(rules.is_tracker("https://bit.ly/3abcDEF"));
        assert!(rules.is_tracker("http://BIT.LY/x"));
    }

    #[test]
    fn test_host_rule_matches_subdomain() {
        let rules = rules(json!(["lnkd.in"]));
        assert!(rules.is_tracker("https://www.lnkd.in/abc"));
        assert!(rules.is_tracker("https://a.b.lnkd.in/abc"));
    }

    #[test]
    fn test_host_rule_does_not_match_suffix_lookalike() {
        let rules = rules(json!(["t.co"]));
        assert!(!rules.is_tracker("https://reddit.co/abc"));
        assert!(!rules.is_tracker("https://t.com/abc"));
        assert!(rules.is_tracker("https://t.co/abc"));
    }

    #[test]
    fn test_pattern_rule_matches_full_url() {
        let rules = rules(json!(["/^https?://(www\\.)?google\\.[a-z.]+/url\\?/"]));
        assert!(rules.is_tracker("https://www.google.com/url?q=https://example.com"));
        assert!(!rules.is_tracker("https://www.google.com/search?q=rust"));
    }

    #[test]
    fn test_pattern_rule_applies_to_unparseable_url() {
        let rules = rules(json!(["bit.ly", "/^shortlink:/"]));
        assert!(rules.is_tracker("shortlink:abc"));
        assert!(!rules.is_tracker("not a url"));
    }

    #[test]
    fn test_missing_tracker_key_is_empty() {
        let rules = TrackerRules::from_json(&json!({ "other": ["bit.ly"] })).unwrap();
        assert!(rules.is_empty());
        assert!(!rules.is_tracker("https://bit.ly/x"));
    }

    #[test]
    fn test_non_object_root_is_error() {
        let result = TrackerRules::from_json(&json!(["bit.ly"]));
        assert!(matches!(result, Err(TrackerRulesError::NotAnObject)));
    }

    #[test]
    fn test_non_array_tracker_is_error() {
        let result = TrackerRules::from_json(&json!({ "tracker": "bit.ly" }));
        assert!(matches!(result, Err(TrackerRulesError::InvalidTrackerList)));
    }

    #[test]
    fn test_non_string_entry_is_error() {
        let result = TrackerRules::from_json(&json!({ "tracker": ["bit.ly", 42] }));
        assert!(matches!(result, Err(TrackerRulesError::InvalidTrackerList)));
    }

    #[test]
    fn test_empty_entry_is_error() {
        let result = TrackerRules::from_json(&json!({ "tracker": ["bit.ly", "  "] }));
        assert!(matches!(result, Err(TrackerRulesError::EmptyRule(1))));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let result = TrackerRules::from_json(&json!({ "tracker": ["/([a-z/"] }));
        assert!(matches!(
            result,
            Err(TrackerRulesError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let result = TrackerRules::from_json_str("{ not json");
        assert!(matches!(result, Err(TrackerRulesError::Json(_))));
    }

    #[test]
    fn test_bundled_rules_load() {
        let rules = TrackerRules::bundled().unwrap();
        assert!(!rules.is_empty());
        assert!(rules.is_tracker("https://bit.ly/abc"));
        assert!(rules.is_tracker("https://t.co/abc"));
        assert!(!rules.is_tracker("https://www.rust-lang.org/"));
    }

    #[test]
    fn test_len_counts_both_kinds() {
        let rules = rules(json!(["bit.ly", "t.co", "/^x:/"]));
        assert_eq!(rules.len(), 3);
    }
}
