//! Command-line arguments for the `bite-right` binary.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "bite-right",
    about = "Assess a packaged food product: ingredient risks and daily-value coverage",
    version
)]
pub struct Cli {
    /// OpenFoodFacts product response (JSON) to assess
    #[arg(long, value_name = "FILE")]
    pub product: PathBuf,

    /// Barcode (GTIN) the product was looked up with
    #[arg(long, value_name = "CODE")]
    pub gtin: Option<String>,

    /// Ingredient risk taxonomy CSV [default: $BITE_RIGHT_RISK_TABLE or data/harmful_ingredients_risk_list.csv]
    #[arg(long, value_name = "FILE")]
    pub risk_table: Option<PathBuf>,

    /// Daily intake CSV [default: $BITE_RIGHT_DAILY_INTAKE or data/daily_intake.csv]
    #[arg(long, value_name = "FILE")]
    pub daily_intake: Option<PathBuf>,

    /// Also split ingredients on parentheses
    #[arg(long)]
    pub split_parentheses: bool,

    /// Print the assessment as JSON
    #[arg(long)]
    pub json: bool,
}
