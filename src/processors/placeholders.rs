//! Placeholder masking so format tokens survive machine translation
//!
//! Escapes, printf and macro tokens, brace variables and tags are swapped for
//! numbered `__PH{n}__` tokens before a text is sent out, and swapped back in
//! once the translation returns.

use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};

/// Matchers in priority order; ties at the same offset go to the earlier entry
static MATCHERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"__PH\d+__",           // text that already looks like a mask token
        r"\\[nt]",             // escapes
        r"%[A-Z][A-Z0-9_]+",    // %PLAYER_NAME
        r"%[-+0-9.#]*[a-zA-Z]", // printf
        r"\{[^}]+\}",          // {count}
        r"<[^>]+>",             // tags
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid placeholder regex"))
    .collect()
});

/// Regex for mask tokens inside masked or translated text
static MASK_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__PH(\d+)__").expect("Invalid mask token regex"));

/// Source text with placeholders replaced by mask tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    /// Text with every placeholder swapped for `__PH{n}__`
    pub text: String,
    /// Original placeholder literals; index `n` belongs to `__PH{n}__`
    pub placeholders: Vec<String>,
}

impl MaskedText {
    /// Put the recorded placeholders back into `translated`
    pub fn restore(&self, translated: &str) -> String {
        restore_placeholders(translated, &self.placeholders)
    }

    /// Whether `translated` carries the same token sequence as this text
    pub fn matches(&self, translated: &str) -> bool {
        placeholders_match(&self.text, translated)
    }
}

/// Mask every placeholder in `text`, scanning left to right
pub fn mask_placeholders(text: &str) -> MaskedText {
    let mut candidates: Vec<Option<Match>> =
        MATCHERS.iter().map(|re| re.find(text)).collect();

    let mut masked = String::with_capacity(text.len());
    let mut placeholders = Vec::new();
    let mut pos = 0;

    loop {
        for (slot, re) in candidates.iter_mut().zip(MATCHERS.iter()) {
            if matches!(slot, Some(m) if m.start() < pos) {
                *slot = re.find_at(text, pos);
            }
        }

        let next = candidates
            .iter()
            .enumerate()
            .filter_map(|(rank, m)| m.map(|m| (m.start(), rank, m)))
            .min_by_key(|(start, rank, _)| (*start, *rank));

        let Some((_, _, found)) = next else {
            break;
        };

        masked.push_str(&text[pos..found.start()]);
        masked.push_str(&mask_token(placeholders.len()));
        placeholders.push(found.as_str().to_string());
        pos = found.end();
    }

    masked.push_str(&text[pos..]);

    MaskedText {
        text: masked,
        placeholders,
    }
}

/// Replace each `__PH{n}__` with `placeholders[n]` in a single pass
///
/// Tokens whose index was never recorded are left as they are.
pub fn restore_placeholders(text: &str, placeholders: &[String]) -> String {
    if placeholders.is_empty() {
        return text.to_string();
    }

    MASK_TOKEN_REGEX
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|idx| placeholders.get(idx))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Mask tokens in order of appearance
pub fn mask_tokens(text: &str) -> Vec<&str> {
    MASK_TOKEN_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// True when both texts contain the same mask tokens in the same order
pub fn placeholders_match(masked_source: &str, masked_translation: &str) -> bool {
    mask_tokens(masked_source) == mask_tokens(masked_translation)
}

fn mask_token(index: usize) -> String {
    format!("__PH{}__", index)
}
