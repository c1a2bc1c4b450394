//! CLI argument definitions and the translate handler

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::core::client::AzureTranslator;
use crate::core::config::TranslatorConfig;
use crate::core::models::LangCase;
use crate::processors::tsv::{TranslateOptions, TranslationSummary, TsvProcessor};

/// Arguments for translating one TSV file
#[derive(Args, Debug, Clone)]
pub struct TranslateArgs {
    /// Input TSV file with `source` and `translation`/`translated` columns
    #[arg(long = "in", value_name = "FILE")]
    pub input: PathBuf,

    /// Output TSV file (parent directories are created)
    #[arg(long = "out", value_name = "FILE")]
    pub output: PathBuf,

    /// Source language code
    #[arg(long, default_value = "en")]
    pub from_lang: String,

    /// Target language code
    #[arg(long, default_value = "uk")]
    pub to_lang: String,

    /// Maximum rows per request (overrides TRANSLATE_BATCH_SIZE)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Re-translate rows that already have target text
    #[arg(long)]
    pub overwrite: bool,

    /// Seconds to pause between batches (overrides TRANSLATE_SLEEP)
    #[arg(long, value_parser = parse_seconds)]
    pub sleep: Option<f64>,

    /// Maximum attempts per request while rate limited (overrides TRANSLATE_MAX_RETRIES)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Casing applied to language codes: lower, upper or preserve
    #[arg(long)]
    pub lang_case: Option<LangCase>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl TranslateArgs {
    /// Fold command-line overrides into `config`
    pub fn apply_overrides(&self, config: &mut TranslatorConfig) {
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(secs) = self.sleep {
            config.sleep_between_batches_ms = (secs * 1000.0).round() as u64;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(lang_case) = self.lang_case {
            config.lang_case = lang_case;
        }
    }

    /// Per-run options for the processor
    pub fn options(&self) -> TranslateOptions {
        TranslateOptions {
            from_lang: self.from_lang.clone(),
            to_lang: self.to_lang.clone(),
            overwrite: self.overwrite,
        }
    }
}

fn parse_seconds(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(format!("'{}' is not a non-negative number of seconds", raw)),
    }
}

/// Handle the translate command
///
/// Credentials are checked before the input file is touched.
pub async fn handle_translate(args: TranslateArgs) -> anyhow::Result<TranslationSummary> {
    let start_time = Instant::now();

    let mut config = TranslatorConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    info!("Starting TSV translation (v{})", crate::VERSION);
    info!("Input: {}", args.input.display());
    info!("Output: {}", args.output.display());
    info!("Languages: {} -> {} ({} case)", args.from_lang, args.to_lang, config.lang_case);
    info!(
        "Batch size: {}, pause: {}ms, max attempts: {}",
        config.batch_size, config.sleep_between_batches_ms, config.max_retries
    );

    let translator = AzureTranslator::new(config)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let processor = TsvProcessor::new(translator).with_progress(pb);
    let summary = processor
        .translate_file(&args.input, &args.output, &args.options())
        .await
        .with_context(|| format!("Failed to translate {}", args.input.display()))?;

    info!(
        "Completed: {} translated, {} QA failed in {:?}",
        summary.translated,
        summary.qa_failed,
        start_time.elapsed()
    );

    Ok(summary)
}
