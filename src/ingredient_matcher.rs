//! # Ingredient Matcher Module
//!
//! Splits a product's ingredients text into tokens and resolves each token to a
//! risk entry from the alias map.
//!
//! ## Resolution order
//!
//! 1. Exact lookup of the normalized token
//! 2. The longest alias contained in the normalized token
//! 3. The `Unknown` sentinel entry
//!
//! The matcher holds only a shared read-only alias map, so one instance can serve
//! any number of products, from any number of threads.

use std::cmp::Ordering;
use std::sync::Arc;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::normalizer::normalize_token;
use crate::risk_taxonomy::{AliasMap, RiskEntry, RiskLevel};

/// Which delimiter characters separate ingredient tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TokenizerMode {
    /// Split on `;` and `,`
    #[default]
    Standard,
    /// Split on `;`, `,`, `(` and `)`
    SplitParentheses,
}

impl TokenizerMode {
    fn is_delimiter(&self, c: char) -> bool {
        match self {
            TokenizerMode::Standard => matches!(c, ';' | ','),
            TokenizerMode::SplitParentheses => matches!(c, ';' | ',' | '(' | ')'),
        }
    }
}

/// An ingredient token with its resolved risk classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedIngredient {
    /// The token as it appeared in the ingredients text, trimmed
    pub display_text: String,
    pub category: String,
    pub risk_level: RiskLevel,
    pub concern: String,
}

/// Number of matched ingredients per risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskSummary {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub unknown: usize,
}

impl RiskSummary {
    /// Count matched ingredients by risk level; absent levels count as zero
    pub fn from_matches(matches: &[MatchedIngredient]) -> Self {
        let mut summary = Self::default();
        for item in matches {
            match item.risk_level {
                RiskLevel::High => summary.high += 1,
                RiskLevel::Moderate => summary.moderate += 1,
                RiskLevel::Low => summary.low += 1,
                RiskLevel::Unknown => summary.unknown += 1,
            }
        }
        summary
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::Low => self.low,
            RiskLevel::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.moderate + self.low + self.unknown
    }
}

/// Matched ingredients with a known risk level, most severe first
///
/// Within a level, ingredients are ordered alphabetically by display text,
/// ignoring case.
pub fn flagged_by_severity(matches: &[MatchedIngredient]) -> Vec<MatchedIngredient> {
    let mut flagged: Vec<MatchedIngredient> = matches
        .iter()
        .filter(|item| item.risk_level.severity_rank().is_some())
        .cloned()
        .collect();

    flagged.sort_by(compare_severity);
    flagged
}

fn compare_severity(a: &MatchedIngredient, b: &MatchedIngredient) -> Ordering {
    a.risk_level
        .severity_rank()
        .cmp(&b.risk_level.severity_rank())
        .then_with(|| {
            a.display_text
                .to_lowercase()
                .cmp(&b.display_text.to_lowercase())
        })
        .then_with(|| a.display_text.cmp(&b.display_text))
}

/// Split ingredients text into trimmed, non-empty raw tokens, in order
///
/// # Examples
///
/// ```rust
/// use bite_right::ingredient_matcher::{split_ingredients, TokenizerMode};
///
/// let tokens = split_ingredients("Water, Sugar;; Salt ,", TokenizerMode::Standard);
/// assert_eq!(tokens, vec!["Water", "Sugar", "Salt"]);
/// ```
pub fn split_ingredients(text: &str, mode: TokenizerMode) -> Vec<&str> {
    text.split(|c: char| mode.is_delimiter(c))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Resolves ingredient tokens against a shared alias map
#[derive(Debug, Clone)]
pub struct IngredientMatcher {
    aliases: Arc<AliasMap>,
    mode: TokenizerMode,
}

impl IngredientMatcher {
    /// Create a matcher that splits on `;` and `,`
    pub fn new(aliases: Arc<AliasMap>) -> Self {
        Self::with_mode(aliases, TokenizerMode::Standard)
    }

    pub fn with_mode(aliases: Arc<AliasMap>, mode: TokenizerMode) -> Self {
        Self { aliases, mode }
    }

    pub fn mode(&self) -> TokenizerMode {
        self.mode
    }

    /// Resolve a normalized token to a risk entry
    ///
    /// Falls back to [`RiskEntry::unknown`] when no alias matches.
    pub fn resolve(&self, normalized: &str) -> RiskEntry {
        if let Some(entry) = self.aliases.get(normalized) {
            trace!("Exact alias match for '{}'", normalized);
            return entry.clone();
        }

        if let Some((alias, entry)) = self.aliases.longest_contained(normalized) {
            debug!("Token '{}' matched alias '{}'", normalized, alias);
            return entry.clone();
        }

        trace!("No alias matched '{}'", normalized);
        RiskEntry::unknown()
    }

    /// Match every ingredient in the text
    ///
    /// Returns one [`MatchedIngredient`] per non-empty token, in input order. Absent
    /// or blank text yields an empty list.
    pub fn match_ingredients(&self, ingredients_text: Option<&str>) -> Vec<MatchedIngredient> {
        let text = ingredients_text.unwrap_or("").trim();
        let matches: Vec<MatchedIngredient> = split_ingredients(text, self.mode)
            .into_iter()
            .map(|raw| {
                let entry = self.resolve(&normalize_token(raw));
                MatchedIngredient {
                    display_text: raw.to_string(),
                    category: entry.category,
                    risk_level: entry.risk_level,
                    concern: entry.concern,
                }
            })
            .collect();

        info!(
            "Matched {} ingredient tokens ({} with a known risk level)",
            matches.len(),
            matches
                .iter()
                .filter(|m| m.risk_level != RiskLevel::Unknown)
                .count()
        );
        matches
    }
}
