//! TSV Translator - batch machine translation for localization tables
//!
//! Reads the `source` column of a tab-separated file, masks placeholders,
//! sends the text to a cloud translation service in size-bounded batches and
//! writes the checked translations back into the target column.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;

// Re-export key types for convenience
pub use crate::core::{
    client::AzureTranslator,
    config::TranslatorConfig,
    errors::TranslationError,
    models::LangCase,
};

pub use crate::processors::{
    placeholders::{mask_placeholders, restore_placeholders, placeholders_match, MaskedText},
    tsv::{RowState, TranslateOptions, TranslationSummary, TsvProcessor, TsvTable},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name as it appears in log targets
pub const NAME: &str = "tsv_translator";
