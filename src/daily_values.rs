//! # Daily-Value Table Module
//!
//! Loads the recommended daily intake table. Each row names a nutrient and an
//! intake string such as `"25g"`, `"2300 mg"` or `"90mcg"`. Rows whose intake
//! cannot be parsed are logged and skipped; the loader keeps whatever parsed.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::DataError;

/// Intake strings: a decimal number, optional whitespace, then a unit made of letters
pub const INTAKE_PATTERN: &str = r"^\s*(\d*\.?\d+)\s*([A-Za-zµμ]+)\s*$";

lazy_static! {
    static ref INTAKE_REGEX: Regex =
        Regex::new(INTAKE_PATTERN).expect("Intake pattern should be valid");
}

/// Recommended daily amount for one nutrient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValueEntry {
    /// Lower-cased nutrient name (e.g. "total fat")
    pub nutrient_key: String,
    pub amount: f64,
    /// Unit symbol; `mcg` is stored as `µg`
    pub unit: String,
}

/// One row of the daily intake table, as read from CSV
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeRow {
    #[serde(alias = "Nutrient", default)]
    pub nutrient: String,
    #[serde(rename = "Intake", alias = "intake", default)]
    pub intake: String,
}

/// Parse an intake string into (amount, unit)
///
/// # Examples
///
/// ```rust
/// use bite_right::daily_values::parse_intake;
///
/// assert_eq!(parse_intake("25g"), Some((25.0, "g".to_string())));
/// assert_eq!(parse_intake(" 2300 mg "), Some((2300.0, "mg".to_string())));
/// assert_eq!(parse_intake("90mcg"), Some((90.0, "µg".to_string())));
/// assert_eq!(parse_intake("about 5 g"), None);
/// ```
pub fn parse_intake(raw: &str) -> Option<(f64, String)> {
    let captures = INTAKE_REGEX.captures(raw)?;
    let amount: f64 = captures[1].parse().ok()?;
    let unit = &captures[2];
    let unit = if unit.eq_ignore_ascii_case("mcg") {
        "µg".to_string()
    } else {
        unit.to_string()
    };
    Some((amount, unit))
}

/// Nutrient name to daily value mapping
///
/// Built once per process and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DailyValueTable {
    entries: HashMap<String, DailyValueEntry>,
}

impl DailyValueTable {
    /// Build the table from intake rows, skipping rows that do not parse
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = IntakeRow>,
    {
        let mut entries = HashMap::new();
        let mut skipped = 0;

        for row in rows {
            let key = row.nutrient.trim().to_lowercase();
            if key.is_empty() {
                skipped += 1;
                warn!("Skipping intake row without a nutrient name");
                continue;
            }

            match parse_intake(&row.intake) {
                Some((amount, unit)) => {
                    debug!("Daily value for '{}': {} {}", key, amount, unit);
                    entries.insert(
                        key.clone(),
                        DailyValueEntry {
                            nutrient_key: key,
                            amount,
                            unit,
                        },
                    );
                }
                None => {
                    skipped += 1;
                    warn!(
                        "Skipping intake row for '{}': cannot parse '{}'",
                        key, row.intake
                    );
                }
            }
        }

        info!(
            "Built daily value table with {} entries ({} rows skipped)",
            entries.len(),
            skipped
        );

        Self { entries }
    }

    /// Load the table from CSV data with `nutrient` and `Intake` columns
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        csv_reader.headers()?;

        let mut rows = Vec::new();
        for (index, record) in csv_reader.deserialize::<IntakeRow>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => warn!("Skipping intake row {}: {}", index + 1, err),
            }
        }

        Ok(Self::from_rows(rows))
    }

    /// Load the table from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        info!("Loading daily intake table from {}", path.display());
        let file = File::open(path)
            .map_err(|e| DataError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    /// Look up a nutrient by name, ignoring case and surrounding whitespace
    pub fn get(&self, nutrient: &str) -> Option<&DailyValueEntry> {
        self.entries.get(&nutrient.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(nutrient: &str, intake: &str) -> IntakeRow {
        IntakeRow {
            nutrient: nutrient.to_string(),
            intake: intake.to_string(),
        }
    }

    #[test]
    fn test_parse_intake_formats() {
        assert_eq!(parse_intake("78g"), Some((78.0, "g".to_string())));
        assert_eq!(parse_intake("0.9 mg"), Some((0.9, "mg".to_string())));
        assert_eq!(parse_intake(".5mg"), Some((0.5, "mg".to_string())));
        assert_eq!(parse_intake("2000kcal"), Some((2000.0, "kcal".to_string())));
        assert_eq!(parse_intake("20 µg"), Some((20.0, "µg".to_string())));
        assert_eq!(parse_intake("400 MCG"), Some((400.0, "µg".to_string())));
    }

    #[test]
    fn test_parse_intake_rejects_malformed() {
        assert_eq!(parse_intake(""), None);
        assert_eq!(parse_intake("25"), None);
        assert_eq!(parse_intake("g25"), None);
        assert_eq!(parse_intake("25 g per day"), None);
        assert_eq!(parse_intake("1,300mg"), None);
        assert_eq!(parse_intake("N/A"), None);
    }

    #[test]
    fn test_table_skips_unparsable_rows() {
        let table = DailyValueTable::from_rows(vec![
            row("Total Fat", "78g"),
            row("Sodium", "2300mg"),
            row("Vitamin D", "unknown"),
            row("", "10g"),
        ]);

        assert_eq!(table.len(), 2);
        assert!(table.get("vitamin d").is_none());
        let fat = table.get("TOTAL FAT").unwrap();
        assert_eq!(fat.nutrient_key, "total fat");
        assert_eq!(fat.amount, 78.0);
        assert_eq!(fat.unit, "g");
    }

    #[test]
    fn test_from_reader() {
        let data = "nutrient,Intake\nCalories,2000kcal\nFree Sugars,50 g\nFolate,400mcg\nIron,lots\n";
        let table = DailyValueTable::from_reader(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("calories").unwrap().unit, "kcal");
        assert_eq!(table.get("free sugars").unwrap().amount, 50.0);
        assert_eq!(table.get("folate").unwrap().unit, "µg");
    }
}
