//! # Product Assessment Module
//!
//! Ties the pieces together: a [`KnowledgeBase`] is loaded once per process and
//! shared read-only, and [`KnowledgeBase::assess`] turns a product record into the
//! matched ingredients, risk summary and nutrient tiles the presentation layer
//! renders.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use bite_right::assessment::KnowledgeBase;
//! use bite_right::daily_values::DailyValueTable;
//! use bite_right::ingredient_matcher::TokenizerMode;
//! use bite_right::product::ProductRecord;
//! use bite_right::risk_taxonomy::{AliasMap, TaxonomyRow};
//!
//! let aliases = AliasMap::from_rows(vec![TaxonomyRow {
//!     category: "Preservative".into(),
//!     risk_level: "High".into(),
//!     concern: "linked to X".into(),
//!     labels: "['sodium benzoate']".into(),
//! }]);
//! let kb = Arc::new(KnowledgeBase::from_parts(aliases, DailyValueTable::default(), TokenizerMode::Standard));
//!
//! let product = ProductRecord {
//!     ingredients_text: Some("Water, Sodium Benzoate, Salt".into()),
//!     ..Default::default()
//! };
//! let assessment = kb.assess(product, None);
//! assert_eq!(assessment.summary.high, 1);
//! assert_eq!(assessment.summary.unknown, 2);
//! ```

use std::fmt;
use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::config::AppConfig;
use crate::daily_values::DailyValueTable;
use crate::errors::DataError;
use crate::ingredient_matcher::{
    flagged_by_severity, IngredientMatcher, MatchedIngredient, RiskSummary, TokenizerMode,
};
use crate::nutrition::{DailyValueCalculator, NutrientTile, MACRO_NUTRIENTS, MICRO_NUTRIENTS};
use crate::product::{Gtin, ProductRecord};
use crate::risk_taxonomy::{AliasMap, RiskLevel};

/// Reference data loaded once and shared by every assessment
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    matcher: IngredientMatcher,
    calculator: DailyValueCalculator,
}

impl KnowledgeBase {
    /// Load both reference tables from the configured paths
    pub fn load(config: &AppConfig) -> Result<Self, DataError> {
        let aliases = AliasMap::from_path(&config.risk_table_path)?;
        let daily_values = DailyValueTable::from_path(&config.daily_intake_path)?;
        Ok(Self::from_parts(aliases, daily_values, config.tokenizer_mode()))
    }

    pub fn from_parts(
        aliases: AliasMap,
        daily_values: DailyValueTable,
        mode: TokenizerMode,
    ) -> Self {
        info!(
            "Knowledge base ready: {} aliases, {} daily values",
            aliases.len(),
            daily_values.len()
        );
        Self {
            matcher: IngredientMatcher::with_mode(Arc::new(aliases), mode),
            calculator: DailyValueCalculator::new(Arc::new(daily_values)),
        }
    }

    pub fn matcher(&self) -> &IngredientMatcher {
        &self.matcher
    }

    pub fn calculator(&self) -> &DailyValueCalculator {
        &self.calculator
    }

    /// Assess a product record
    pub fn assess(&self, product: ProductRecord, gtin: Option<Gtin>) -> ProductAssessment {
        let ingredients = self
            .matcher
            .match_ingredients(product.ingredients_text.as_deref());
        let summary = RiskSummary::from_matches(&ingredients);
        let flagged = flagged_by_severity(&ingredients);
        let macros = self.calculator.tiles(&product.nutriments, MACRO_NUTRIENTS);
        let micros = self.calculator.tiles(&product.nutriments, MICRO_NUTRIENTS);

        info!(
            "Assessed product {}: {} ingredients, {} flagged, {} macro and {} micro tiles",
            gtin.as_ref().map(Gtin::as_str).unwrap_or("-"),
            ingredients.len(),
            flagged.len(),
            macros.len(),
            micros.len()
        );

        ProductAssessment {
            gtin,
            product,
            ingredients,
            summary,
            flagged,
            macros,
            micros,
        }
    }
}

/// Everything the presentation layer needs for one product
#[derive(Debug, Clone, Serialize)]
pub struct ProductAssessment {
    pub gtin: Option<Gtin>,
    pub product: ProductRecord,
    /// One entry per ingredient token, in label order
    pub ingredients: Vec<MatchedIngredient>,
    pub summary: RiskSummary,
    /// Ingredients with a known risk level, most severe first
    pub flagged: Vec<MatchedIngredient>,
    pub macros: Vec<NutrientTile>,
    pub micros: Vec<NutrientTile>,
}

impl fmt::Display for ProductAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .product
            .display_name()
            .unwrap_or_else(|| "Unnamed product".to_string());
        match &self.gtin {
            Some(gtin) => writeln!(f, "{name} [{gtin}]")?,
            None => writeln!(f, "{name}")?,
        }
        writeln!(
            f,
            "Serving size: {}",
            self.product.serving_size.as_deref().unwrap_or("-")
        )?;

        writeln!(f, "\nIngredients:")?;
        if self.ingredients.is_empty() {
            writeln!(f, "  (no ingredients listed)")?;
        }
        for item in &self.ingredients {
            writeln!(
                f,
                "  [{}] {} - {} ({})",
                item.risk_level, item.display_text, item.category, item.concern
            )?;
        }

        writeln!(f, "\nRisk summary:")?;
        for level in [RiskLevel::High, RiskLevel::Moderate, RiskLevel::Low] {
            writeln!(f, "  {} risk: {}", level, self.summary.count(level))?;
        }

        if !self.flagged.is_empty() {
            writeln!(f, "\nFlagged ingredients:")?;
            for item in &self.flagged {
                writeln!(f, "  [{}] {}", item.risk_level, item.display_text)?;
            }
        }

        writeln!(f, "\nMacros (per serving):")?;
        write_tiles(f, &self.macros, "No macro data")?;
        writeln!(f, "\nMicros (per serving):")?;
        write_tiles(f, &self.micros, "No micro data")
    }
}

fn write_tiles(f: &mut fmt::Formatter<'_>, tiles: &[NutrientTile], empty: &str) -> fmt::Result {
    if tiles.is_empty() {
        return writeln!(f, "  {empty}");
    }
    for tile in tiles {
        writeln!(f, "  {tile}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily_values::IntakeRow;
    use crate::risk_taxonomy::TaxonomyRow;
    use serde_json::json;

    fn create_knowledge_base(mode: TokenizerMode) -> KnowledgeBase {
        let aliases = AliasMap::from_rows(vec![
            TaxonomyRow {
                category: "Preservative".to_string(),
                risk_level: "High".to_string(),
                concern: "linked to X".to_string(),
                labels: "['sodium benzoate']".to_string(),
            },
            TaxonomyRow {
                category: "Sweetener".to_string(),
                risk_level: "Moderate".to_string(),
                concern: "blood sugar".to_string(),
                labels: "['sugar']".to_string(),
            },
        ]);
        let daily_values = DailyValueTable::from_rows(vec![IntakeRow {
            nutrient: "free sugars".to_string(),
            intake: "50g".to_string(),
        }]);
        KnowledgeBase::from_parts(aliases, daily_values, mode)
    }

    #[test]
    fn test_assess_product() {
        let kb = create_knowledge_base(TokenizerMode::Standard);
        let product = ProductRecord {
            product_name: Some("Orange Soda".to_string()),
            ingredients_text: Some("Water, Sodium Benzoate, Salt, Sugar".to_string()),
            nutriments: json!({ "sugars_serving": 30, "sugars_unit": "g" })
                .as_object()
                .cloned()
                .unwrap(),
            ..Default::default()
        };

        let gtin = Gtin::parse("4006381333931").ok();
        let assessment = kb.assess(product, gtin);

        assert_eq!(assessment.ingredients.len(), 4);
        assert_eq!(assessment.summary.high, 1);
        assert_eq!(assessment.summary.moderate, 1);
        assert_eq!(assessment.summary.unknown, 2);
        assert_eq!(assessment.flagged[0].display_text, "Sodium Benzoate");
        assert_eq!(assessment.flagged[1].display_text, "Sugar");
        assert_eq!(assessment.macros.len(), 1);
        assert_eq!(assessment.macros[0].percent_dv, Some(60));
        assert!(assessment.micros.is_empty());

        let text = assessment.to_string();
        assert!(text.starts_with("Orange Soda [4006381333931]"));
        assert!(text.contains("High risk: 1"));
        assert!(text.contains("Sugars: 30 g (60% DV)"));
        assert!(text.contains("No micro data"));
    }

    #[test]
    fn test_assess_product_without_ingredients() {
        let kb = create_knowledge_base(TokenizerMode::Standard);
        let assessment = kb.assess(ProductRecord::default(), None);

        assert!(assessment.ingredients.is_empty());
        assert_eq!(assessment.summary, RiskSummary::default());
        assert!(assessment.to_string().contains("(no ingredients listed)"));
    }

    #[test]
    fn test_assessment_serializes_to_json() {
        let kb = create_knowledge_base(TokenizerMode::SplitParentheses);
        let product = ProductRecord {
            ingredients_text: Some("Syrup (sugar, water)".to_string()),
            ..Default::default()
        };
        let assessment = kb.assess(product, None);
        assert_eq!(assessment.ingredients.len(), 3);

        let value = serde_json::to_value(&assessment).unwrap();
        assert_eq!(value["summary"]["moderate"], 1);
        assert_eq!(value["ingredients"][1]["risk_level"], "Moderate");
        assert_eq!(value["gtin"], serde_json::Value::Null);
    }
}
