//! # Product Record Module
//!
//! Product data handed over by the barcode lookup collaborator: the decoded
//! barcode identifier and the product record fields the assessment needs.
//!
//! Records are read from OpenFoodFacts v3 product responses. Fetching them is the
//! caller's job.

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DataError;

/// Source name recorded on records read from OpenFoodFacts
pub const OPEN_FOOD_FACTS: &str = "OpenFoodFacts";

/// Barcode symbology implied by a GTIN's length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GtinKind {
    Ean8,
    UpcA,
    Ean13,
    Gtin14,
}

/// Global Trade Item Number decoded from a barcode or entered by hand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gtin(String);

impl Gtin {
    /// Parse a GTIN: digits only, 8, 12, 13 or 14 of them, surrounding whitespace ignored
    ///
    /// The check digit is not enforced here; see [`Gtin::has_valid_check_digit`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bite_right::product::Gtin;
    ///
    /// let gtin = Gtin::parse(" 5449000000996 ").unwrap();
    /// assert_eq!(gtin.as_str(), "5449000000996");
    /// assert!(gtin.has_valid_check_digit());
    /// assert!(Gtin::parse("12-34").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, DataError> {
        let digits = raw.trim();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DataError::InvalidGtin(format!(
                "'{}' must contain only digits",
                raw
            )));
        }
        if !matches!(digits.len(), 8 | 12 | 13 | 14) {
            return Err(DataError::InvalidGtin(format!(
                "'{}' has {} digits, expected 8, 12, 13 or 14",
                digits,
                digits.len()
            )));
        }
        Ok(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> GtinKind {
        match self.0.len() {
            8 => GtinKind::Ean8,
            12 => GtinKind::UpcA,
            13 => GtinKind::Ean13,
            _ => GtinKind::Gtin14,
        }
    }

    /// Verify the GS1 mod-10 check digit
    pub fn has_valid_check_digit(&self) -> bool {
        let digits: Vec<u32> = self.0.chars().filter_map(|c| c.to_digit(10)).collect();
        let Some((check, body)) = digits.split_last() else {
            return false;
        };

        // Weights alternate 3, 1, ... starting from the digit next to the check digit
        let sum: u32 = body
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
            .sum();

        (10 - sum % 10) % 10 == *check
    }
}

impl fmt::Display for Gtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Gtin {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Gtin::parse(&value)
    }
}

impl From<Gtin> for String {
    fn from(gtin: Gtin) -> Self {
        gtin.0
    }
}

/// Product fields consumed by the assessment
///
/// Image URLs are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub source: String,
    pub product_name: Option<String>,
    /// First brand listed
    pub brand: Option<String>,
    pub ingredients_text: Option<String>,
    pub nutriments: Map<String, Value>,
    pub image_front_url: Option<String>,
    pub image_nutrition_url: Option<String>,
    pub serving_size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    product: Option<RawProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProduct {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    ingredients_text: Option<String>,
    #[serde(default)]
    nutriments: Option<Value>,
    #[serde(default)]
    image_front_url: Option<String>,
    #[serde(default)]
    image_nutrition_url: Option<String>,
    #[serde(default)]
    serving_size: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl ProductRecord {
    /// Read a record from an OpenFoodFacts v3 product response
    ///
    /// Returns `Ok(None)` when the response reports no product. Text fields are
    /// trimmed and blank values become `None`; the brand is the first entry of the
    /// comma-separated `brands` field.
    pub fn from_open_food_facts(json: &str) -> Result<Option<Self>, DataError> {
        let response: ProductResponse = serde_json::from_str(json)?;

        if response.status.as_deref() != Some("success") {
            debug!("Product response status is {:?}", response.status);
            return Ok(None);
        }

        let Some(raw) = response.product else {
            debug!("Product response has no product");
            return Ok(None);
        };

        let nutriments = match raw.nutriments {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                warn!("Ignoring nutriments that are not an object: {}", other);
                Map::new()
            }
        };

        let brand = non_empty(raw.brands)
            .and_then(|brands| non_empty(brands.split(',').next().map(str::to_string)));

        let record = Self {
            source: OPEN_FOOD_FACTS.to_string(),
            product_name: non_empty(raw.product_name),
            brand,
            ingredients_text: non_empty(raw.ingredients_text),
            nutriments,
            image_front_url: non_empty(raw.image_front_url),
            image_nutrition_url: non_empty(raw.image_nutrition_url),
            serving_size: non_empty(raw.serving_size),
        };

        if record.product_name.is_none() && record.ingredients_text.is_none() {
            debug!("Product record has neither a name nor an ingredients list");
        }

        Ok(Some(record))
    }

    /// Brand and product name joined for headings
    pub fn display_name(&self) -> Option<String> {
        match (self.brand.as_deref(), self.product_name.as_deref()) {
            (None, None) => None,
            (brand, name) => Some(
                [brand, name]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<&str>>()
                    .join(" "),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gtin_parsing() {
        assert_eq!(Gtin::parse("96385074").unwrap().kind(), GtinKind::Ean8);
        assert_eq!(Gtin::parse("036000291452").unwrap().kind(), GtinKind::UpcA);
        assert_eq!(Gtin::parse("4006381333931").unwrap().kind(), GtinKind::Ean13);
        assert_eq!(Gtin::parse("10012345678902").unwrap().kind(), GtinKind::Gtin14);

        assert!(Gtin::parse("").is_err());
        assert!(Gtin::parse("12345").is_err());
        assert!(Gtin::parse("40063813339a1").is_err());
        assert!(matches!(Gtin::parse("123"), Err(DataError::InvalidGtin(_))));
    }

    #[test]
    fn test_gtin_check_digit() {
        assert!(Gtin::parse("96385074").unwrap().has_valid_check_digit());
        assert!(Gtin::parse("036000291452").unwrap().has_valid_check_digit());
        assert!(Gtin::parse("4006381333931").unwrap().has_valid_check_digit());
        assert!(!Gtin::parse("4006381333932").unwrap().has_valid_check_digit());
    }

    #[test]
    fn test_gtin_serde_round_trip_validates() {
        let gtin: Gtin = serde_json::from_str("\"4006381333931\"").unwrap();
        assert_eq!(gtin.as_str(), "4006381333931");
        assert!(serde_json::from_str::<Gtin>("\"abc\"").is_err());
    }

    #[test]
    fn test_from_open_food_facts() {
        let json = r#"{
            "status": "success",
            "product": {
                "product_name": "  Orange Soda ",
                "brands": "Fizzco, Fizzco Group",
                "ingredients_text": "Water, Sugar, Sodium Benzoate",
                "nutriments": { "sugars_serving": 30, "sugars_unit": "g" },
                "image_front_url": "https://images.example/front.jpg",
                "image_nutrition_url": "",
                "serving_size": "330 ml"
            }
        }"#;

        let record = ProductRecord::from_open_food_facts(json).unwrap().unwrap();
        assert_eq!(record.source, "OpenFoodFacts");
        assert_eq!(record.product_name.as_deref(), Some("Orange Soda"));
        assert_eq!(record.brand.as_deref(), Some("Fizzco"));
        assert_eq!(record.image_nutrition_url, None);
        assert_eq!(record.serving_size.as_deref(), Some("330 ml"));
        assert_eq!(record.nutriments.len(), 2);
        assert_eq!(record.display_name().as_deref(), Some("Fizzco Orange Soda"));
    }

    #[test]
    fn test_failed_lookup_yields_none() {
        let json = r#"{ "status": "failure", "errors": [] }"#;
        assert_eq!(ProductRecord::from_open_food_facts(json).unwrap(), None);

        let json = r#"{ "status": "success", "product": null }"#;
        assert_eq!(ProductRecord::from_open_food_facts(json).unwrap(), None);
    }

    #[test]
    fn test_missing_fields_and_bad_nutriments() {
        let json = r#"{ "status": "success", "product": { "brands": " , ", "nutriments": "" } }"#;
        let record = ProductRecord::from_open_food_facts(json).unwrap().unwrap();
        assert_eq!(record.brand, None);
        assert_eq!(record.product_name, None);
        assert!(record.nutriments.is_empty());
        assert_eq!(record.display_name(), None);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            ProductRecord::from_open_food_facts("not json"),
            Err(DataError::Json(_))
        ));
    }
}
