//! Score command - compare two goal bios directly.
//!
//! Runs the compatibility scorer outside the server, useful for tuning the
//! taxonomy and for scripting.

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::OutputFormat;
use crate::matching::scoring::{score_bios, score_bios_with, CompatibilityScore, ScoringConfig};
use crate::matching::taxonomy::KeywordTaxonomy;

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// First goal bio
    #[arg(required = true)]
    pub bio_a: String,

    /// Second goal bio
    #[arg(required = true)]
    pub bio_b: String,

    /// Seed the RNG for reproducible output (also used for the neutral
    /// score when a bio is empty)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the random jitter applied to the final score
    #[arg(long)]
    pub no_jitter: bool,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if the embedded taxonomy fails to load.
pub fn run(args: &ScoreArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let taxonomy = KeywordTaxonomy::load_embedded()?;

    let mut config = ScoringConfig::default();
    if args.no_jitter {
        config.jitter = 0.0;
    }

    let score = match args.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            score_bios_with(&mut rng, &taxonomy, &config, &args.bio_a, &args.bio_b)
        }
        None if args.no_jitter => score_bios_with(
            &mut rand::thread_rng(),
            &taxonomy,
            &config,
            &args.bio_a,
            &args.bio_b,
        ),
        None => score_bios(&taxonomy, &args.bio_a, &args.bio_b),
    };

    if verbose {
        let a_categories = taxonomy.categories_in(&args.bio_a);
        let b_categories = taxonomy.categories_in(&args.bio_b);
        eprintln!("Bio A categories: {a_categories:?}");
        eprintln!("Bio B categories: {b_categories:?}");
    }

    match format {
        OutputFormat::Text => print_text(&score, &config),
        OutputFormat::Json => print_json(&score, &config)?,
    }

    Ok(())
}

fn print_text(score: &CompatibilityScore, config: &ScoringConfig) {
    println!("\nCompatibility: {}/100", score.value);

    if score.neutral {
        println!("   (neutral: at least one bio was empty)");
        return;
    }

    println!(
        "   Breakdown: {:.1} category x {:.0}% + {:.1} overlap x {:.0}%",
        score.category_score,
        config.category_weight * 100.0,
        score.word_overlap_score,
        config.overlap_weight * 100.0,
    );
}

fn print_json(score: &CompatibilityScore, config: &ScoringConfig) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "score": score.value,
        "neutral": score.neutral,
        "category_score": score.category_score,
        "word_overlap_score": score.word_overlap_score,
        "weights": {
            "category": config.category_weight,
            "word_overlap": config.overlap_weight,
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
