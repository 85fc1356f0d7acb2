/// Words the embedder ignores. Matches the stop list of the keyword index.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it", "its", "of",
    "on", "that", "the", "to", "was", "will", "with", "or", "but", "this", "these", "they", "them", "their",
    "there", "then", "so", "if", "when", "where", "why", "how", "what", "which", "who", "whom", "whose", "can",
    "could", "should", "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

/// Lower-cased alphanumeric words with stop words removed.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Character trigrams of a word padded with `^`/`$`, so that "granola" and
/// "granolas" share most features.
pub fn trigrams(word: &str) -> Vec<String> {
    let padded: Vec<char> = format!("^{word}$").chars().collect();
    padded.windows(3).map(|w| w.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_drop_punctuation_and_stop_words() {
        assert_eq!(words("Nut-Free Granola | for the KIDS"), vec!["nut", "free", "granola", "kids"]);
        assert!(words(" , | ").is_empty());
    }

    #[test]
    fn trigrams_are_padded() {
        assert_eq!(trigrams("oat"), vec!["^oa", "oat", "at$"]);
        assert_eq!(trigrams("a"), vec!["^a$"]);
    }
}
