use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use spatialynk::cascade::Recommender;
use spatialynk::categories::{CategoryResolver, Vocabulary};
use spatialynk::config::AppConfig;
use spatialynk::db::Database;
use spatialynk::models::ResultEnvelope;

#[derive(Parser, Debug)]
#[command(name = "eval")]
#[command(about = "Run a prompt set against the recommender and check expectations")]
struct Cli {
    #[arg(long, default_value = "eval/prompts.jsonl")]
    file: String,
    #[arg(long, default_value_t = 5)]
    top_k: usize,
    #[arg(long, default_value_t = 7)]
    seed: u64,
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct EvalPrompt {
    id: String,
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    expect_level: Option<String>,
    #[serde(default)]
    expect_scope_label: Option<String>,
    #[serde(default)]
    expect_categories: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let db = Database::new(&config).await?;
    let catalog = db.load_catalog().await?;

    let vocabulary = Arc::new(Vocabulary::from_path(config.vocabulary_path.as_deref())?);
    let recommender = Recommender::new(Arc::new(catalog), vocabulary.clone());
    let resolver = CategoryResolver::new(&vocabulary);

    let prompts = load_prompts(&cli.file)?;
    if prompts.is_empty() {
        anyhow::bail!("no prompts found in {}", cli.file);
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut total = 0usize;
    let mut passed = 0usize;
    let mut fallbacks = 0usize;
    let mut empty = 0usize;
    let mut boring_leaks = 0usize;

    for prompt in prompts {
        total += 1;
        let requested = prompt.top_k.unwrap_or(cli.top_k);
        let top_k = NonZeroUsize::new(requested)
            .with_context(|| format!("prompt {} asks for top_k=0", prompt.id))?;

        let envelope = recommender.recommend(&prompt.query, top_k, &mut rng);

        let failures = check_expectations(&prompt, &envelope, top_k);
        if failures.is_empty() {
            passed += 1;
        }
        if envelope.widened_to.is_some() {
            fallbacks += 1;
        }
        if envelope.results.is_empty() {
            empty += 1;
        }
        if envelope.parsed.categories.is_empty()
            && envelope.results.iter().any(|poi| resolver.is_boring(&poi.category))
        {
            boring_leaks += 1;
        }

        if cli.verbose || !failures.is_empty() {
            println!("--- {} ---", prompt.id);
            println!("Q: {}", prompt.query);
            println!(
                "Level: {} ({})",
                envelope.level.as_str(),
                envelope.scope_label.as_deref().unwrap_or("-")
            );
            for (poi, reason) in envelope.results.iter().zip(&envelope.poi_explanations) {
                println!("  * {} [{}] {}", poi.name, poi.category, reason);
            }
            for failure in &failures {
                println!("  FAIL: {failure}");
            }
            println!();
        }
    }

    println!("Eval prompts: {}", total);
    println!("Expectation accuracy: {:.1}%", ratio(passed, total) * 100.0);
    println!("Fallback rate: {:.1}%", ratio(fallbacks, total) * 100.0);
    println!("Empty-result rate: {:.1}%", ratio(empty, total) * 100.0);
    println!("Boring leaks in broad queries: {}", boring_leaks);

    Ok(())
}

fn check_expectations(
    prompt: &EvalPrompt,
    envelope: &ResultEnvelope,
    top_k: NonZeroUsize,
) -> Vec<String> {
    let mut failures = Vec::new();

    if let Some(level) = &prompt.expect_level {
        if envelope.level.as_str() != level {
            failures.push(format!(
                "expected level {level}, got {}",
                envelope.level.as_str()
            ));
        }
    }

    if let Some(label) = &prompt.expect_scope_label {
        let matches = envelope
            .scope_label
            .as_deref()
            .is_some_and(|actual| actual.eq_ignore_ascii_case(label));
        if !matches {
            failures.push(format!(
                "expected scope {label}, got {}",
                envelope.scope_label.as_deref().unwrap_or("-")
            ));
        }
    }

    for category in &prompt.expect_categories {
        if !envelope.parsed.categories.contains(category) {
            failures.push(format!("missing category {category}"));
        }
    }

    if envelope.results.len() > top_k.get() {
        failures.push(format!(
            "{} results exceed top_k {}",
            envelope.results.len(),
            top_k
        ));
    }

    failures
}

fn load_prompts(path: &str) -> Result<Vec<EvalPrompt>> {
    let file = File::open(path).with_context(|| format!("failed opening {}", path))?;
    let reader = BufReader::new(file);
    let mut prompts = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parsed: EvalPrompt = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON at {} line {}", path, idx + 1))?;
        prompts.push(parsed);
    }

    Ok(prompts)
}

fn ratio(n: usize, d: usize) -> f32 {
    if d == 0 {
        return 0.0;
    }
    n as f32 / d as f32
}
