// Input validation - client-side gate before any generation

/// Placeholder answers clinicians type instead of a question
const PLACEHOLDERS: [&str; 3] = ["", "na", "n/a"];

/// Minimum whitespace-delimited words in a question
pub const MIN_WORDS: usize = 3;

/// True if `text` is worth sending to the model
pub fn is_valid(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    text.split_whitespace().count() >= MIN_WORDS && !PLACEHOLDERS.contains(&normalized.as_str())
}
