//! Word tokenizer shared by the text models.

/// Common English words that carry no signal about the verdict.
const STOP_WORDS: &[&str] = &[
  "a", "about", "after", "all", "am", "an", "and", "are", "as", "at", "be",
  "been", "but", "by", "can", "did", "do", "for", "from", "had", "has",
  "have", "he", "her", "him", "his", "i", "if", "in", "into", "is", "it",
  "its", "me", "my", "of", "on", "or", "our", "she", "so", "that", "the",
  "their", "them", "then", "there", "they", "this", "to", "up", "was", "we",
  "were", "what", "when", "which", "who", "with", "would", "you", "your",
];

/// Lowercased alphanumeric words of `text`, minus stop words.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|word| !word.is_empty())
    .map(str::to_lowercase)
    .filter(|word| !STOP_WORDS.contains(&word.as_str()))
}
