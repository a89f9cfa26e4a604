use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;
use tracing::{info, Instrument};

use rs_appcat::classifiers::{HybridClassifier, NaiveBayesClassifier, TrainingCorpus};
use rs_appcat::config::Config;
use rs_appcat::generic_types::AppEntry;
use rs_appcat::logging::{setup_logger, Logger};
use rs_appcat::options::{Command, Options};
use rs_appcat::pipeline::{classify_batch, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::parse();
    let config = match options.config.as_deref() {
        Some(path) => Config::from_file(path),
        None => Config::new(),
    }
    .context("Failed to load configuration")?;

    let level = options.log_level.as_deref().unwrap_or(&config.logging.level);
    setup_logger(level);
    info!("{} | command: {}", config, options.command);

    match options.command {
        Command::Classify { name, package } => Logger::with_span(|| {
            let classifier = HybridClassifier::from_config(&config.engine, config.external.as_ref());
            let result = classifier.classify(&name, &package);
            let line = serde_json::json!({
                "app_name": name,
                "package_id": package,
                "category": result.category,
                "confidence": result.confidence,
            });
            println!("{}", line);
        }),
        Command::Batch { input } => {
            run_batch(&config, input).instrument(tracing::info_span!("batch")).await?;
        }
        Command::Corpus => Logger::with_span(|| -> Result<()> {
            for (text, category) in TrainingCorpus::generate() {
                println!("{}", serde_json::to_string(&serde_json::json!({ "text": text, "category": category }))?);
            }
            Ok(())
        })?,
        Command::Train { out } => Logger::with_span(|| -> Result<()> {
            let mut nb = NaiveBayesClassifier::with_max_vocab_size(config.engine.max_vocab_size);
            nb.train(&TrainingCorpus::generate());
            nb.save_to_file(&out)
                .with_context(|| format!("Failed to save model to {}", out.display()))?;
            info!("Model saved to {}", out.display());
            Ok(())
        })?,
    }

    Ok(())
}

async fn run_batch(config: &Config, input: Option<std::path::PathBuf>) -> Result<()> {
    let text = match input {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    let apps: Vec<AppEntry> = text.lines().filter_map(AppEntry::from_line).collect();

    let classifier = Arc::new(HybridClassifier::from_config(&config.engine, config.external.as_ref()));
    // train before the progress bar starts
    let warm = classifier.clone();
    tokio::task::spawn_blocking(move || warm.warm_up()).await?;

    let progress = ProgressBar::new(apps.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")?.progress_chars("=> "),
    );
    let results = classify_batch(classifier, apps, config.batch.workers, Some(progress.clone())).await?;
    progress.finish_with_message("classified");

    let mut store = RecordStore::new();
    for (app, result) in &results {
        let line = serde_json::json!({
            "app_name": app.app_name,
            "package_id": app.package_id,
            "category": result.category,
            "confidence": result.confidence,
        });
        println!("{}", line);
        store.apply_classification(app, *result);
    }
    println!("{}", serde_json::to_string(&serde_json::json!({ "folders": store.folders() }))?);
    Ok(())
}
