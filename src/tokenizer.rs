//! Word segmentation of the extracted text stream
//!
//! Lines are split on whitespace; a token is kept when it contains at least
//! one ASCII letter, digit, comma, period or hyphen.

use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Whether `token` carries any word character
fn is_word(token: &str) -> bool {
    token
        .chars()
        .any(|c| c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '-'))
}

/// Splits one text line into words
///
/// # Example
///
/// ```
/// use wiki_ripple::tokenizer::words;
///
/// let tokens: Vec<_> = words("Hello, wiki world !").collect();
/// assert_eq!(tokens, vec!["Hello,", "wiki", "world"]);
/// ```
pub fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace().filter(|token| is_word(token))
}

/// Maps the text stream into a word stream
///
/// The word stream closes once the line stream closes and every buffered line
/// has been segmented.
pub fn spawn_tokenizer(mut lines: UnboundedReceiver<String>) -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            for word in words(&line) {
                if tx.send(word.to_string()).is_err() {
                    return;
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_splits_on_whitespace() {
        let tokens: Vec<_> = words("Hello  World\tand\nmore").collect();
        assert_eq!(tokens, vec!["Hello", "World", "and", "more"]);
    }

    #[test]
    fn test_words_drops_symbol_only_tokens() {
        let tokens: Vec<_> = words("a & b ( c ) – 1.5 -").collect();
        assert_eq!(tokens, vec!["a", "b", "c", "1.5", "-"]);
    }

    #[test]
    fn test_words_keeps_last_token() {
        let tokens: Vec<_> = words("trailing word").collect();
        assert_eq!(tokens, vec!["trailing", "word"]);
    }

    #[test]
    fn test_words_empty_line() {
        assert_eq!(words("").count(), 0);
    }

    #[tokio::test]
    async fn test_spawn_tokenizer() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut words = spawn_tokenizer(rx);

        tx.send("Hello World".to_string()).unwrap();
        tx.send(String::new()).unwrap();
        tx.send("again".to_string()).unwrap();
        drop(tx);

        let mut collected = Vec::new();
        while let Some(word) = words.recv().await {
            collected.push(word);
        }
        assert_eq!(collected, vec!["Hello", "World", "again"]);
    }
}
