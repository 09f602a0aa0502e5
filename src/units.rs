//! # Unit Conversion Module
//!
//! Converts nutrient amounts between mass units. Energy (`kcal`) is its own
//! dimension: it converts only to itself.
//!
//! Two entry points are provided:
//!
//! - [`try_convert`] reports a non-convertible pair as `None`
//! - [`convert`] returns the value unchanged for a non-convertible pair
//!
//! Callers comparing amounts across dimensions must use [`try_convert`] or check
//! [`is_convertible`] first, since [`convert`] cannot signal the fallback.

use std::fmt;

use log::trace;

/// Unit a nutrient amount or daily value can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutrientUnit {
    Grams,
    Milligrams,
    Micrograms,
    Kilocalories,
}

impl NutrientUnit {
    /// Parse a unit symbol, case-insensitively
    ///
    /// Micrograms accept the micro sign (`µg`), the Greek mu (`μg`), `mcg` and `ug`.
    pub fn parse(raw: &str) -> Option<NutrientUnit> {
        match raw.trim().to_lowercase().as_str() {
            "g" => Some(NutrientUnit::Grams),
            "mg" => Some(NutrientUnit::Milligrams),
            "µg" | "μg" | "mcg" | "ug" => Some(NutrientUnit::Micrograms),
            "kcal" => Some(NutrientUnit::Kilocalories),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            NutrientUnit::Grams => "g",
            NutrientUnit::Milligrams => "mg",
            NutrientUnit::Micrograms => "µg",
            NutrientUnit::Kilocalories => "kcal",
        }
    }

    /// Size of one unit in micrograms, for mass units only
    fn micrograms(&self) -> Option<f64> {
        match self {
            NutrientUnit::Grams => Some(1_000_000.0),
            NutrientUnit::Milligrams => Some(1_000.0),
            NutrientUnit::Micrograms => Some(1.0),
            NutrientUnit::Kilocalories => None,
        }
    }
}

impl fmt::Display for NutrientUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Whether an amount in `from` can be expressed in `to`
pub fn is_convertible(from: &str, to: &str) -> bool {
    try_convert(1.0, from, to).is_some()
}

/// Convert `value` from one unit to another
///
/// Equal unit strings (ignoring case) always convert to the same value, even when
/// the unit is not recognized. Returns `None` for any other pair outside the
/// gram/milligram/microgram family.
///
/// # Examples
///
/// ```rust
/// use bite_right::units::try_convert;
///
/// assert_eq!(try_convert(1.5, "g", "mg"), Some(1500.0));
/// assert_eq!(try_convert(250.0, "mcg", "mg"), Some(0.25));
/// assert_eq!(try_convert(100.0, "kcal", "g"), None);
/// ```
pub fn try_convert(value: f64, from: &str, to: &str) -> Option<f64> {
    if from.trim().to_lowercase() == to.trim().to_lowercase() {
        return Some(value);
    }

    let from_unit = NutrientUnit::parse(from)?;
    let to_unit = NutrientUnit::parse(to)?;
    if from_unit == to_unit {
        return Some(value);
    }

    let converted = value * from_unit.micrograms()? / to_unit.micrograms()?;
    trace!("Converted {} {} -> {} {}", value, from_unit, converted, to_unit);
    Some(converted)
}

/// Convert `value`, returning it unchanged when the units are not convertible
pub fn convert(value: f64, from: &str, to: &str) -> f64 {
    try_convert(value, from, to).unwrap_or(value)
}
