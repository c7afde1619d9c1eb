//! Taxonomy command - list or show the goal-category keywords that drive
//! scoring.

use clap::Args;

use crate::cli::OutputFormat;
use crate::matching::taxonomy::KeywordTaxonomy;

/// Arguments for the taxonomy command
#[derive(Args)]
pub struct TaxonomyArgs {
    /// Show only this category, with its full trigger list
    #[arg(long)]
    pub category: Option<String>,
}

/// Execute the taxonomy command
///
/// # Errors
///
/// Returns an error if the embedded taxonomy fails to load or the named
/// category does not exist.
pub fn run(args: &TaxonomyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let taxonomy = KeywordTaxonomy::load_embedded()?;

    if let Some(name) = &args.category {
        let category = taxonomy
            .categories()
            .iter()
            .find(|category| category.name == *name)
            .ok_or_else(|| anyhow::anyhow!("Unknown category: {name}"))?;

        match format {
            OutputFormat::Text => {
                println!("\n{} ({} triggers)", category.name, category.triggers.len());
                for trigger in &category.triggers {
                    println!("   {trigger}");
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(category)?);
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Text => {
            println!("\nGoal categories ({})", taxonomy.len());
            for category in taxonomy.categories() {
                println!(
                    "   {:<12} {} triggers",
                    category.name,
                    category.triggers.len()
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(taxonomy.categories())?);
        }
    }

    Ok(())
}
