//! TSV row pipeline: read, mask, batch, translate, check, restore, write

use indicatif::ProgressBar;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::core::client::AzureTranslator;
use crate::core::errors::{Result, TranslationError};
use crate::processors::batcher::batch_indices;
use crate::processors::placeholders::{mask_placeholders, MaskedText};

/// Column holding the text to translate
pub const SOURCE_COLUMN: &str = "source";

/// Accepted target column names, in order of preference
pub const TARGET_COLUMNS: [&str; 2] = ["translation", "translated"];

/// A tab-separated table held fully in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    source_col: usize,
    target_col: usize,
}

impl TsvTable {
    /// Read a table from disk
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_reader(file, path)
    }

    /// Parse a table; `path` is only used in error messages
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(TranslationError::MissingHeader {
                path: path.display().to_string(),
            });
        }

        let source_col = headers
            .iter()
            .position(|h| h == SOURCE_COLUMN)
            .ok_or_else(|| TranslationError::MissingColumn {
                message: format!("'{}' column not found in {}", SOURCE_COLUMN, path.display()),
            })?;

        let target_col = TARGET_COLUMNS
            .iter()
            .find_map(|name| headers.iter().position(|h| h == name))
            .ok_or_else(|| TranslationError::MissingColumn {
                message: format!(
                    "Missing 'translation' or 'translated' column in {}",
                    path.display()
                ),
            })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }

        debug!(
            "Read {} rows from {} (target column '{}')",
            rows.len(),
            path.display(),
            headers[target_col]
        );

        Ok(Self {
            headers,
            rows,
            source_col,
            target_col,
        })
    }

    /// Write the table, creating parent directories as needed
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| TranslationError::FileError {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }

        let file = File::create(path).map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.to_writer(file)
    }

    /// Serialize the table as TSV
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_writer(writer);

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Name of the column translations are written to
    pub fn target_column(&self) -> &str {
        &self.headers[self.target_col]
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Field `column` of row `row`, if present
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Trimmed source text of a row
    pub fn source(&self, row: usize) -> &str {
        self.rows[row][self.source_col].trim()
    }

    /// Trimmed current target text of a row
    pub fn target(&self, row: usize) -> &str {
        self.rows[row][self.target_col].trim()
    }

    fn set_target(&mut self, row: usize, text: String) {
        self.rows[row][self.target_col] = text;
    }
}

/// Where a row ended up in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// No source text
    SkippedEmptySource,
    /// Target already filled and overwrite not requested
    SkippedAlreadyTranslated,
    /// Waiting for its batch
    Eligible,
    /// Translation written into the target column
    Translated,
    /// Placeholder tokens came back damaged; target untouched
    QaFailed,
}

impl RowState {
    /// Whether the row was selected for translation
    pub fn is_eligible(&self) -> bool {
        matches!(self, RowState::Eligible | RowState::Translated | RowState::QaFailed)
    }

    /// Whether the row was skipped before translation
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            RowState::SkippedEmptySource | RowState::SkippedAlreadyTranslated
        )
    }
}

/// An eligible row with its masked source
#[derive(Debug, Clone)]
pub struct PendingRow {
    /// Index into the table's rows
    pub row: usize,
    pub masked: MaskedText,
}

/// Decide each row's initial state and mask the eligible sources
pub fn classify_rows(table: &TsvTable, overwrite: bool) -> (Vec<RowState>, Vec<PendingRow>) {
    let mut states = Vec::with_capacity(table.len());
    let mut pending = Vec::new();

    for row in 0..table.len() {
        let source = table.source(row);
        if source.is_empty() {
            states.push(RowState::SkippedEmptySource);
            continue;
        }
        if !table.target(row).is_empty() && !overwrite {
            states.push(RowState::SkippedAlreadyTranslated);
            continue;
        }

        states.push(RowState::Eligible);
        pending.push(PendingRow {
            row,
            masked: mask_placeholders(source),
        });
    }

    (states, pending)
}

/// Check one translated item and write it back if its tokens survived
pub fn apply_translation(table: &mut TsvTable, item: &PendingRow, translated: &str) -> RowState {
    if !item.masked.matches(translated) {
        warn!(
            "QA failed for row {}: placeholders changed ({:?} -> {:?})",
            item.row + 1,
            item.masked.text,
            translated
        );
        return RowState::QaFailed;
    }

    table.set_target(item.row, item.masked.restore(translated));
    RowState::Translated
}

/// Options for a single run
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub from_lang: String,
    pub to_lang: String,
    /// Re-translate rows that already have target text
    pub overwrite: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            from_lang: "en".to_string(),
            to_lang: "uk".to_string(),
            overwrite: false,
        }
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSummary {
    pub total: usize,
    pub eligible: usize,
    pub translated: usize,
    pub skipped: usize,
    pub qa_failed: usize,
    pub output: PathBuf,
}

impl TranslationSummary {
    /// Tally final row states
    pub fn from_states(states: &[RowState], output: impl Into<PathBuf>) -> Self {
        let count = |f: fn(&RowState) -> bool| states.iter().filter(|s| f(s)).count();

        Self {
            total: states.len(),
            eligible: count(RowState::is_eligible),
            translated: count(|s| *s == RowState::Translated),
            skipped: count(RowState::is_skipped),
            qa_failed: count(|s| *s == RowState::QaFailed),
            output: output.into(),
        }
    }
}

impl fmt::Display for TranslationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Translation summary")?;
        writeln!(f, "Total rows: {}", self.total)?;
        writeln!(f, "Eligible rows: {}", self.eligible)?;
        writeln!(f, "Translated: {}", self.translated)?;
        writeln!(f, "Skipped: {}", self.skipped)?;
        writeln!(f, "QA failed: {}", self.qa_failed)?;
        write!(f, "Output: {}", self.output.display())
    }
}

/// Drives a TSV file through the translator
#[derive(Clone)]
pub struct TsvProcessor {
    translator: AzureTranslator,
    progress: ProgressBar,
}

impl TsvProcessor {
    /// Create a new TSV processor
    pub fn new(translator: AzureTranslator) -> Self {
        Self {
            translator,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report batch progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Translate `input` into `output`
    ///
    /// Nothing is written unless every batch succeeds.
    pub async fn translate_file(
        &self,
        input: &Path,
        output: &Path,
        options: &TranslateOptions,
    ) -> Result<TranslationSummary> {
        let mut table = TsvTable::read(input)?;
        info!(
            "Loaded {} rows from {} (target column '{}')",
            table.len(),
            input.display(),
            table.target_column()
        );

        let states = self.translate_table(&mut table, options).await?;

        table.write(output)?;
        info!("Wrote {}", output.display());

        Ok(TranslationSummary::from_states(&states, output))
    }

    /// Translate eligible rows of `table` in place, returning every row's final state
    pub async fn translate_table(
        &self,
        table: &mut TsvTable,
        options: &TranslateOptions,
    ) -> Result<Vec<RowState>> {
        let config = self.translator.config();
        let (mut states, pending) = classify_rows(table, options.overwrite);

        let masked: Vec<&str> = pending.iter().map(|p| p.masked.text.as_str()).collect();
        let batches = batch_indices(&masked, config.batch_size, config.max_chars_per_request);

        info!(
            "{} of {} rows eligible, {} batches ({} -> {})",
            pending.len(),
            table.len(),
            batches.len(),
            options.from_lang,
            options.to_lang
        );

        self.progress.set_length(batches.len() as u64);
        let pause = config.sleep_between_batches();

        for (batch_no, batch) in batches.iter().enumerate() {
            if batch_no > 0 && !pause.is_zero() {
                sleep(pause).await;
            }

            self.progress
                .set_message(format!("batch {} ({} rows)", batch_no + 1, batch.len()));

            let texts: Vec<String> = batch
                .iter()
                .map(|&i| pending[i].masked.text.clone())
                .collect();

            let translations = self
                .translator
                .translate_batch(&texts, &options.from_lang, &options.to_lang)
                .await
                .map_err(|e| {
                    error!("Translation batch {} failed: {}", batch_no + 1, e);
                    e
                })?;

            for (&i, translated) in batch.iter().zip(&translations) {
                let item = &pending[i];
                states[item.row] = apply_translation(table, item, translated);
            }

            debug!("Batch {}/{} done", batch_no + 1, batches.len());
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        Ok(states)
    }
}
