//! # Risk Taxonomy Module
//!
//! Loads the curated ingredient risk table and builds the alias map used by the
//! ingredient matcher.
//!
//! ## Table format
//!
//! The source is a CSV file with the columns `Category`, `Risk Level`,
//! `Main Concern` and `Labels`. The `Labels` column holds a serialized list of
//! alias strings, either as a Python-style list literal (`['e211', "sodium benzoate"]`)
//! or as a JSON array.
//!
//! ## Duplicate aliases
//!
//! Alias keys are unique. When two rows share an alias, the later row wins and the
//! reassignment is logged. This is the documented policy of the loader, not an
//! error: a shared alias is a data-quality issue for the taxonomy maintainers.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::DataError;

/// Category shown for ingredients that match no alias
pub const UNKNOWN_CATEGORY: &str = "—";
/// Concern shown for ingredients that match no alias
pub const UNKNOWN_CONCERN: &str = "Not in risk list";

/// Severity classification of an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
    Unknown,
}

impl RiskLevel {
    /// All levels, most severe first
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::High,
        RiskLevel::Moderate,
        RiskLevel::Low,
        RiskLevel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Low => "Low",
            RiskLevel::Unknown => "Unknown",
        }
    }

    /// Rank used to order flagged ingredients; `Unknown` has no rank
    pub fn severity_rank(&self) -> Option<u8> {
        match self {
            RiskLevel::High => Some(0),
            RiskLevel::Moderate => Some(1),
            RiskLevel::Low => Some(2),
            RiskLevel::Unknown => None,
        }
    }

    /// Parse a risk level name from the taxonomy table
    ///
    /// Matching is case-insensitive and accepts `Medium` as a synonym for
    /// `Moderate`. Any other value maps to `Unknown`.
    pub fn parse_lenient(raw: &str) -> RiskLevel {
        match raw.trim().to_lowercase().as_str() {
            "high" => RiskLevel::High,
            "moderate" | "medium" => RiskLevel::Moderate,
            "low" => RiskLevel::Low,
            "unknown" => RiskLevel::Unknown,
            other => {
                warn!("Unrecognized risk level '{}', treating as Unknown", other);
                RiskLevel::Unknown
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk classification attached to one or more aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    pub category: String,
    pub risk_level: RiskLevel,
    pub concern: String,
}

impl RiskEntry {
    pub fn new(category: &str, risk_level: RiskLevel, concern: &str) -> Self {
        Self {
            category: category.to_string(),
            risk_level,
            concern: concern.to_string(),
        }
    }

    /// Sentinel entry for tokens that match no alias
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_CATEGORY, RiskLevel::Unknown, UNKNOWN_CONCERN)
    }
}

/// One row of the risk taxonomy table, as read from CSV
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonomyRow {
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Risk Level", default)]
    pub risk_level: String,
    #[serde(rename = "Main Concern", default)]
    pub concern: String,
    /// Serialized alias list
    #[serde(rename = "Labels", default)]
    pub labels: String,
}

/// Case-folded alias to risk entry mapping
///
/// Built once per process and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    entries: HashMap<String, RiskEntry>,
    /// Alias keys ordered by length descending, then alphabetically
    by_length: Vec<String>,
    category_count: usize,
}

impl AliasMap {
    /// Build the alias map from taxonomy rows
    ///
    /// Aliases are trimmed and lower-cased; empty aliases are discarded. A row whose
    /// alias list cannot be parsed is kept with no aliases.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = TaxonomyRow>,
    {
        let mut entries: HashMap<String, RiskEntry> = HashMap::new();
        let mut category_count = 0;

        for row in rows {
            category_count += 1;
            let entry = RiskEntry::new(
                row.category.trim(),
                RiskLevel::parse_lenient(&row.risk_level),
                row.concern.trim(),
            );

            let labels = match parse_alias_list(&row.labels) {
                Some(labels) => labels,
                None => {
                    warn!(
                        "Could not parse alias list for category '{}': '{}'",
                        entry.category, row.labels
                    );
                    Vec::new()
                }
            };

            for label in labels {
                let alias = label.trim().to_lowercase();
                if alias.is_empty() {
                    continue;
                }
                if let Some(previous) = entries.insert(alias.clone(), entry.clone()) {
                    if previous != entry {
                        debug!(
                            "Alias '{}' reassigned from '{}' to '{}' (last row wins)",
                            alias, previous.category, entry.category
                        );
                    }
                }
            }
        }

        let mut by_length: Vec<String> = entries.keys().cloned().collect();
        by_length.sort_by(|a, b| {
            Reverse(a.chars().count())
                .cmp(&Reverse(b.chars().count()))
                .then_with(|| a.cmp(b))
        });

        info!(
            "Built alias map with {} aliases from {} taxonomy rows",
            entries.len(),
            category_count
        );

        Self {
            entries,
            by_length,
            category_count,
        }
    }

    /// Load the taxonomy from CSV data
    ///
    /// Rows that cannot be decoded are skipped. Only an unreadable header or an
    /// I/O failure aborts the load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        csv_reader.headers()?;

        let mut rows = Vec::new();
        for (index, record) in csv_reader.deserialize::<TaxonomyRow>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => warn!("Skipping taxonomy row {}: {}", index + 1, err),
            }
        }

        Ok(Self::from_rows(rows))
    }

    /// Load the taxonomy from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        info!("Loading risk taxonomy from {}", path.display());
        let file = File::open(path)
            .map_err(|e| DataError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    /// Exact alias lookup; the alias is trimmed and lower-cased first
    pub fn get(&self, alias: &str) -> Option<&RiskEntry> {
        self.entries.get(&alias.trim().to_lowercase())
    }

    /// Find the longest alias contained in `token`
    ///
    /// Ties between aliases of equal length resolve to the alphabetically first one.
    pub fn longest_contained(&self, token: &str) -> Option<(&str, &RiskEntry)> {
        self.by_length
            .iter()
            .find(|alias| token.contains(alias.as_str()))
            .and_then(|alias| {
                self.entries
                    .get(alias)
                    .map(|entry| (alias.as_str(), entry))
            })
    }

    /// Number of distinct aliases
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of taxonomy rows read, including rows without usable aliases
    pub fn category_count(&self) -> usize {
        self.category_count
    }

    /// Aliases ordered by length descending
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.by_length.iter().map(String::as_str)
    }
}

/// Parse a serialized alias list
///
/// Accepts a JSON array of strings or a Python-style list literal of quoted
/// strings. An empty cell is an empty list. Returns `None` when the value is
/// malformed or holds a non-string item.
///
/// # Examples
///
/// ```rust
/// use bite_right::risk_taxonomy::parse_alias_list;
///
/// assert_eq!(
///     parse_alias_list("['sodium benzoate', \"E211\"]"),
///     Some(vec!["sodium benzoate".to_string(), "E211".to_string()])
/// );
/// assert_eq!(parse_alias_list("sodium benzoate"), None);
/// ```
pub fn parse_alias_list(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }

    if let Ok(labels) = serde_json::from_str::<Vec<String>>(raw) {
        return Some(labels);
    }

    parse_list_literal(raw)
}

/// Parse `[ 'a', "b", ]` with backslash escapes inside quotes
fn parse_list_literal(raw: &str) -> Option<Vec<String>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut labels = Vec::new();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let quote = match chars.next() {
            None => break,
            Some(c @ ('\'' | '"')) => c,
            Some(_) => return None,
        };

        let mut label = String::new();
        loop {
            match chars.next()? {
                '\\' => label.push(unescape(chars.next()?)),
                c if c == quote => break,
                c => label.push(c),
            }
        }
        labels.push(label);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(labels)
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, risk: &str, concern: &str, labels: &str) -> TaxonomyRow {
        TaxonomyRow {
            category: category.to_string(),
            risk_level: risk.to_string(),
            concern: concern.to_string(),
            labels: labels.to_string(),
        }
    }

    #[test]
    fn test_parse_python_list_literal() {
        assert_eq!(
            parse_alias_list("['sodium benzoate', 'e211']"),
            Some(vec!["sodium benzoate".to_string(), "e211".to_string()])
        );
        assert_eq!(
            parse_alias_list("[\"baker's yeast\", 'it\\'s',]"),
            Some(vec!["baker's yeast".to_string(), "it's".to_string()])
        );
        assert_eq!(parse_alias_list("[]"), Some(vec![]));
        assert_eq!(parse_alias_list("  [ ]  "), Some(vec![]));
    }

    #[test]
    fn test_parse_json_array() {
        assert_eq!(
            parse_alias_list(r#"["aspartame", "e951"]"#),
            Some(vec!["aspartame".to_string(), "e951".to_string()])
        );
    }

    #[test]
    fn test_parse_empty_cell_is_empty_list() {
        assert_eq!(parse_alias_list(""), Some(vec![]));
    }

    #[test]
    fn test_parse_malformed_lists() {
        assert_eq!(parse_alias_list("aspartame"), None);
        assert_eq!(parse_alias_list("['unterminated"), None);
        assert_eq!(parse_alias_list("['a' 'b']"), None);
        assert_eq!(parse_alias_list("[1, 'a']"), None);
        assert_eq!(parse_alias_list("['a'"), None);
    }

    #[test]
    fn test_risk_level_parsing() {
        assert_eq!(RiskLevel::parse_lenient("High"), RiskLevel::High);
        assert_eq!(RiskLevel::parse_lenient(" moderate "), RiskLevel::Moderate);
        assert_eq!(RiskLevel::parse_lenient("Medium"), RiskLevel::Moderate);
        assert_eq!(RiskLevel::parse_lenient("LOW"), RiskLevel::Low);
        assert_eq!(RiskLevel::parse_lenient("severe"), RiskLevel::Unknown);
        assert_eq!(RiskLevel::parse_lenient(""), RiskLevel::Unknown);
    }

    #[test]
    fn test_aliases_are_trimmed_and_lowercased() {
        let map = AliasMap::from_rows(vec![row(
            "Preservative",
            "High",
            "linked to X",
            "['  Sodium Benzoate ', 'E211', '   ']",
        )]);

        assert_eq!(map.len(), 2);
        assert!(map.get("sodium benzoate").is_some());
        assert!(map.get("SODIUM BENZOATE  ").is_some());
        assert!(map.get("e211").is_some());
        assert_eq!(map.get("e211").unwrap().risk_level, RiskLevel::High);
    }

    #[test]
    fn test_duplicate_alias_last_row_wins() {
        let map = AliasMap::from_rows(vec![
            row("Sweetener", "Moderate", "first", "['sucralose']"),
            row("Additive", "Low", "second", "['Sucralose']"),
        ]);

        assert_eq!(map.len(), 1);
        let entry = map.get("sucralose").unwrap();
        assert_eq!(entry.category, "Additive");
        assert_eq!(entry.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_row_with_malformed_aliases_is_kept_without_aliases() {
        let map = AliasMap::from_rows(vec![
            row("Colour", "High", "c", "not a list"),
            row("Sweetener", "Low", "s", "['stevia']"),
        ]);

        assert_eq!(map.category_count(), 2);
        assert_eq!(map.len(), 1);
        assert!(map.get("not a list").is_none());
    }

    #[test]
    fn test_longest_contained_prefers_longest_alias() {
        let map = AliasMap::from_rows(vec![
            row("Allergen", "Low", "soy", "['soy']"),
            row("Emulsifier", "Moderate", "lecithin", "['soy lecithin']"),
        ]);

        let (alias, entry) = map.longest_contained("soy lecithin extract").unwrap();
        assert_eq!(alias, "soy lecithin");
        assert_eq!(entry.category, "Emulsifier");
    }

    #[test]
    fn test_longest_contained_tie_is_alphabetical() {
        let map = AliasMap::from_rows(vec![
            row("B", "Low", "b", "['beta']"),
            row("A", "High", "a", "['alfa']"),
        ]);

        let (alias, _) = map.longest_contained("alfa and beta").unwrap();
        assert_eq!(alias, "alfa");
    }

    #[test]
    fn test_from_reader_skips_bad_rows() {
        let data = "Category,Risk Level,Main Concern,Labels\n\
                    Preservative,High,linked to X,\"['sodium benzoate']\"\n\
                    Broken,Low\n\
                    Sweetener,Moderate,gut health,\"['sucralose', 'e955']\"\n";

        let map = AliasMap::from_reader(data.as_bytes()).unwrap();
        assert_eq!(map.category_count(), 2);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("e955").unwrap().category, "Sweetener");
    }

    #[test]
    fn test_unknown_sentinel() {
        let entry = RiskEntry::unknown();
        assert_eq!(entry.category, "—");
        assert_eq!(entry.risk_level, RiskLevel::Unknown);
        assert_eq!(entry.concern, "Not in risk list");
    }
}
