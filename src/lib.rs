//! # Bite Right
//!
//! Assesses a packaged food product from its barcode record: matches the
//! ingredient list against a curated risk taxonomy and expresses per-serving
//! nutrient amounts as percentages of the recommended daily intake.

pub mod assessment;
pub mod config;
pub mod daily_values;
pub mod errors;
pub mod ingredient_matcher;
pub mod normalizer;
pub mod nutrition;
pub mod product;
pub mod risk_taxonomy;
pub mod units;
