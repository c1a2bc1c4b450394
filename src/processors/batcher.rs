//! Greedy grouping of texts into request-sized batches

/// Group `texts` into batches of indices, in order.
///
/// A batch is closed when adding the next text would exceed `max_items`
/// entries or `max_chars` characters. A single text longer than `max_chars`
/// still travels alone rather than being split.
pub fn batch_indices<S: AsRef<str>>(texts: &[S], max_items: usize, max_chars: usize) -> Vec<Vec<usize>> {
    let mut batches = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_chars = 0;

    for (idx, text) in texts.iter().enumerate() {
        let length = text.as_ref().chars().count();

        if !current.is_empty()
            && (current.len() >= max_items || current_chars + length > max_chars)
        {
            batches.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        current.push(idx);
        current_chars += length;
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
