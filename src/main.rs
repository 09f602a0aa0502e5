use std::fs;

use anyhow::{Context, Result};
use bite_right::assessment::KnowledgeBase;
use bite_right::config::AppConfig;
use bite_right::product::{Gtin, ProductRecord};
use clap::Parser;
use log::{info, warn};

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    // Environment first, then command-line overrides
    let mut config = AppConfig::from_env();
    if let Some(path) = cli.risk_table {
        config.risk_table_path = path;
    }
    if let Some(path) = cli.daily_intake {
        config.daily_intake_path = path;
    }
    if cli.split_parentheses {
        config.split_on_parentheses = true;
    }

    info!("Starting Bite Right with {:?}", config);

    let knowledge_base =
        KnowledgeBase::load(&config).context("Failed to load reference tables")?;

    let gtin = match cli.gtin.as_deref() {
        Some(raw) => {
            let gtin = Gtin::parse(raw).context("Invalid barcode")?;
            if !gtin.has_valid_check_digit() {
                warn!("GTIN {} has an invalid check digit", gtin);
            }
            Some(gtin)
        }
        None => None,
    };

    let response = fs::read_to_string(&cli.product)
        .with_context(|| format!("Failed to read {}", cli.product.display()))?;
    let Some(product) = ProductRecord::from_open_food_facts(&response)
        .context("Failed to parse product response")?
    else {
        anyhow::bail!("No product found in {}", cli.product.display());
    };

    let assessment = knowledge_base.assess(product, gtin);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{assessment}");
    }

    Ok(())
}
