//! # Nutrition Module
//!
//! Extracts per-serving nutrient amounts from a product's nutriments mapping and
//! annotates them with the percentage of the recommended daily value they cover.
//!
//! ## Nutriments layout
//!
//! Amounts per serving are stored under `<nutrient>_serving`, with the unit under
//! `<nutrient>_unit`. A missing amount means "not reported" and is carried as
//! `None`, never as zero.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::daily_values::{DailyValueEntry, DailyValueTable};
use crate::units::try_convert;

/// Whether a nutrient is shown with the macros or the micros
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutrientKind {
    Macro,
    Micro,
}

/// Display and daily-value metadata for one nutrient key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NutrientSpec {
    /// Nutriments key (e.g. "saturated-fat")
    pub key: &'static str,
    pub label: &'static str,
    /// Unit assumed when the record does not report one
    pub default_unit: &'static str,
    /// Nutrient name in the daily intake table
    pub dv_name: Option<&'static str>,
    pub kind: NutrientKind,
}

const fn macro_nutrient(
    key: &'static str,
    label: &'static str,
    default_unit: &'static str,
    dv_name: Option<&'static str>,
) -> NutrientSpec {
    NutrientSpec {
        key,
        label,
        default_unit,
        dv_name,
        kind: NutrientKind::Macro,
    }
}

const fn micro_nutrient(
    key: &'static str,
    label: &'static str,
    default_unit: &'static str,
    dv_name: &'static str,
) -> NutrientSpec {
    NutrientSpec {
        key,
        label,
        default_unit,
        dv_name: Some(dv_name),
        kind: NutrientKind::Micro,
    }
}

/// Macro nutrients, in display order
pub const MACRO_NUTRIENTS: &[NutrientSpec] = &[
    macro_nutrient("energy-kcal", "Energy", "kcal", Some("calories")),
    macro_nutrient("carbohydrates", "Carbs", "g", Some("total carbohydrate")),
    macro_nutrient("sugars", "Sugars", "g", Some("free sugars")),
    macro_nutrient("added-sugars", "Added sugars", "g", Some("added sugars")),
    macro_nutrient("proteins", "Protein", "g", Some("protein")),
    macro_nutrient("fat", "Fat", "g", Some("total fat")),
    macro_nutrient("saturated-fat", "Sat. Fat", "g", Some("saturated fat")),
    macro_nutrient("fiber", "Fiber", "g", Some("dietary fiber")),
    macro_nutrient("sodium", "Sodium", "g", Some("sodium")),
];

/// Micro nutrients, in display order
pub const MICRO_NUTRIENTS: &[NutrientSpec] = &[
    micro_nutrient("potassium", "Potassium", "mg", "potassium"),
    micro_nutrient("magnesium", "Magnesium", "mg", "magnesium"),
    micro_nutrient("calcium", "Calcium", "mg", "calcium"),
    micro_nutrient("phosphorus", "Phosphorus", "mg", "phosphorus"),
    micro_nutrient("iron", "Iron", "mg", "iron"),
    micro_nutrient("zinc", "Zinc", "mg", "zinc"),
    micro_nutrient("iodine", "Iodine", "µg", "iodine"),
    micro_nutrient("selenium", "Selenium", "µg", "selenium"),
    micro_nutrient("copper", "Copper", "mg", "copper"),
    micro_nutrient("manganese", "Manganese", "mg", "manganese"),
    micro_nutrient("vitamin-a", "Vitamin A", "µg", "vitamin a"),
    micro_nutrient("vitamin-d", "Vitamin D", "µg", "vitamin d"),
    micro_nutrient("vitamin-e", "Vitamin E", "mg", "vitamin e"),
    micro_nutrient("vitamin-k", "Vitamin K", "µg", "vitamin k"),
    micro_nutrient("vitamin-c", "Vitamin C", "mg", "vitamin c"),
    micro_nutrient("vitamin-b1", "Vitamin B1 (Thiamin)", "mg", "thiamin"),
    micro_nutrient("vitamin-b2", "Vitamin B2 (Riboflavin)", "mg", "riboflavin"),
    micro_nutrient("vitamin-b3", "Vitamin B3 (Niacin)", "mg", "niacin"),
    micro_nutrient("vitamin-b6", "Vitamin B6", "mg", "vitamin b6"),
    micro_nutrient("vitamin-b12", "Vitamin B12", "µg", "vitamin b12"),
    micro_nutrient("folates", "Folate", "µg", "folate"),
    micro_nutrient("choline", "Choline", "mg", "choline"),
];

/// Find the catalog entry for a nutriments key
pub fn nutrient_spec(key: &str) -> Option<&'static NutrientSpec> {
    MACRO_NUTRIENTS
        .iter()
        .chain(MICRO_NUTRIENTS.iter())
        .find(|spec| spec.key == key)
}

/// Daily intake table name for a nutriments key, if it has one
pub fn daily_value_name(key: &str) -> Option<&'static str> {
    nutrient_spec(key).and_then(|spec| spec.dv_name)
}

/// A reported nutrient amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientSample {
    pub key: String,
    /// `None` when the product does not report this nutrient
    pub value: Option<f64>,
    pub unit: String,
}

/// Read the per-serving amount of a nutrient
///
/// Numeric strings are accepted. The unit falls back to `default_unit` when
/// `<key>_unit` is missing or blank.
pub fn serving_sample(
    nutriments: &Map<String, Value>,
    key: &str,
    default_unit: &str,
) -> NutrientSample {
    let value = nutriments
        .get(&format!("{key}_serving"))
        .and_then(numeric_value);

    let unit = nutriments
        .get(&format!("{key}_unit"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .unwrap_or(default_unit)
        .to_string();

    trace!("Serving sample for '{}': {:?} {}", key, value, unit);
    NutrientSample {
        key: key.to_string(),
        value,
        unit,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of the daily value covered by an amount
///
/// Returns `None` when the amount or the daily value entry is absent, when the
/// units are not convertible, or when the daily value is not a positive number.
///
/// # Examples
///
/// ```rust
/// use bite_right::daily_values::DailyValueEntry;
/// use bite_right::nutrition::percent_daily_value;
///
/// let fat = DailyValueEntry { nutrient_key: "total fat".into(), amount: 25.0, unit: "g".into() };
/// assert_eq!(percent_daily_value(Some(12.0), "g", Some(&fat)), Some(48.0));
/// assert_eq!(percent_daily_value(None, "g", Some(&fat)), None);
/// ```
pub fn percent_daily_value(
    value: Option<f64>,
    unit: &str,
    entry: Option<&DailyValueEntry>,
) -> Option<f64> {
    let value = value?;
    let entry = entry?;

    if !(entry.amount.is_finite() && entry.amount > 0.0) {
        debug!(
            "Daily value for '{}' is not positive: {}",
            entry.nutrient_key, entry.amount
        );
        return None;
    }

    let Some(converted) = try_convert(value, unit, &entry.unit) else {
        debug!(
            "Cannot express {} in {} for '{}'",
            unit, entry.unit, entry.nutrient_key
        );
        return None;
    };

    let percent = converted * 100.0 / entry.amount;
    percent.is_finite().then_some(percent)
}

/// Computes daily-value percentages against a shared intake table
#[derive(Debug, Clone)]
pub struct DailyValueCalculator {
    table: Arc<DailyValueTable>,
}

impl DailyValueCalculator {
    pub fn new(table: Arc<DailyValueTable>) -> Self {
        Self { table }
    }

    /// Daily value entry mapped to a nutriments key
    pub fn entry_for(&self, key: &str) -> Option<&DailyValueEntry> {
        daily_value_name(key).and_then(|name| self.table.get(name))
    }

    /// Percentage of the daily value covered by a sample
    ///
    /// Keys without a daily value mapping get no percentage.
    pub fn percent_for(&self, sample: &NutrientSample) -> Option<f64> {
        percent_daily_value(sample.value, &sample.unit, self.entry_for(&sample.key))
    }

    /// Build display tiles for the reported nutrients of a catalog
    ///
    /// Nutrients the product does not report are left out.
    pub fn tiles(
        &self,
        nutriments: &Map<String, Value>,
        catalog: &[NutrientSpec],
    ) -> Vec<NutrientTile> {
        catalog
            .iter()
            .filter_map(|spec| {
                let sample = serving_sample(nutriments, spec.key, spec.default_unit);
                let value = sample.value?;
                let percent_dv = self.percent_for(&sample).map(|pct| pct.round() as i64);
                Some(NutrientTile {
                    key: spec.key.to_string(),
                    label: spec.label.to_string(),
                    value: round_two_decimals(value),
                    unit: sample.unit,
                    percent_dv,
                    kind: spec.kind,
                })
            })
            .collect()
    }
}

/// Per-nutrient display tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientTile {
    pub key: String,
    pub label: String,
    /// Reported amount, rounded to two decimals
    pub value: f64,
    pub unit: String,
    /// Rounded percentage of the daily value
    pub percent_dv: Option<i64>,
    pub kind: NutrientKind,
}

impl fmt::Display for NutrientTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.label, self.value, self.unit)?;
        if let Some(percent) = self.percent_dv {
            write!(f, " ({percent}% DV)")?;
        }
        Ok(())
    }
}
