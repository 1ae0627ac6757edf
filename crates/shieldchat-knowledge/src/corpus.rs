//! Corpus loader.
//!
//! Accepts a JSON array of records, a single JSON object, JSON Lines, or
//! plain text. Anything that cannot be read degrades to an empty corpus
//! with a warning instead of failing the process.

use serde_json::Value;
use shieldchat_core::error::ShieldChatError;
use shieldchat_core::types::{Corpus, Document};
use std::path::Path;

/// Fields tried, in order, for a record's text.
const TEXT_FIELDS: &[&str] = &["text", "content"];
/// Fields tried, in order, for a record's title.
const TITLE_FIELDS: &[&str] = &["title", "headline"];
const URL_FIELDS: &[&str] = &["url"];

/// Result of loading a corpus source.
#[derive(Debug)]
pub struct LoadOutcome {
    pub corpus: Corpus,
    /// Set when the source could not be used and the corpus is empty.
    pub warning: Option<ShieldChatError>,
}

impl LoadOutcome {
    fn degraded(err: ShieldChatError) -> Self {
        tracing::warn!("⚠️ {err}; continuing with an empty corpus");
        Self {
            corpus: Corpus::empty(),
            warning: Some(err),
        }
    }
}

/// Read and parse the corpus file at `path`. Never fails.
pub fn load_corpus(path: &Path) -> LoadOutcome {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return LoadOutcome::degraded(ShieldChatError::Corpus(format!(
                "corpus source not found: {}",
                path.display()
            )));
        }
        Err(e) => {
            return LoadOutcome::degraded(ShieldChatError::Corpus(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let raw = match String::from_utf8(bytes) {
        Ok(raw) => raw,
        Err(e) => {
            return LoadOutcome::degraded(ShieldChatError::Corpus(format!(
                "{} is not valid UTF-8: {e}",
                path.display()
            )));
        }
    };

    let corpus = parse_corpus(&raw);
    tracing::info!("📚 Loaded {} documents from {}", corpus.len(), path.display());
    LoadOutcome {
        corpus,
        warning: None,
    }
}

/// Parse raw stored content into a corpus.
pub fn parse_corpus(raw: &str) -> Corpus {
    let text = raw.trim();
    if text.is_empty() {
        return Corpus::empty();
    }

    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(single) => vec![single],
        Err(_) => match parse_json_lines(text) {
            Some(items) => items,
            None => {
                tracing::debug!("Corpus is not JSON; using the raw text as one document");
                return Corpus::new(vec![Document::new(text)]);
            }
        },
    };

    let documents = items
        .iter()
        .map(item_to_document)
        .filter(|d| !d.text.trim().is_empty())
        .collect();
    Corpus::new(documents)
}

/// Every non-empty line must be valid JSON, otherwise this is not JSONL.
fn parse_json_lines(text: &str) -> Option<Vec<Value>> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return None;
    }
    lines
        .iter()
        .map(|line| serde_json::from_str::<Value>(line).ok())
        .collect()
}

/// Objects use the field fallbacks; anything else becomes its JSON text.
fn item_to_document(item: &Value) -> Document {
    match item {
        Value::Object(_) => Document {
            text: first_string(item, TEXT_FIELDS),
            title: first_string(item, TITLE_FIELDS),
            url: first_string(item, URL_FIELDS),
        },
        Value::String(s) => Document::new(s.as_str()),
        other => Document::new(other.to_string()),
    }
}

/// First non-empty string value among `fields`.
fn first_string(item: &Value, fields: &[&str]) -> String {
    fields
        .iter()
        .filter_map(|f| item.get(*f).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array_round_trip() {
        let corpus =
            parse_corpus(r#"[{"text":"Drone detection uses RF sensors.","url":"https://x/1"}]"#);
        assert_eq!(corpus.len(), 1);
        let doc = &corpus.documents()[0];
        assert_eq!(doc.text, "Drone detection uses RF sensors.");
        assert_eq!(doc.url, "https://x/1");
        assert_eq!(doc.title, "");
    }

    #[test]
    fn test_plain_text_fallback() {
        let corpus = parse_corpus("hello world\n");
        assert_eq!(corpus.len(), 1);
        let doc = &corpus.documents()[0];
        assert_eq!(doc.text, "hello world");
        assert_eq!(doc.url, "");
        assert_eq!(doc.title, "");
    }

    #[test]
    fn test_single_object_wrapped() {
        let corpus = parse_corpus(r#"  {"content":"DroneGun Tactical","headline":"Products"}  "#);
        assert_eq!(corpus.len(), 1);
        let doc = &corpus.documents()[0];
        assert_eq!(doc.text, "DroneGun Tactical");
        assert_eq!(doc.title, "Products");
    }

    #[test]
    fn test_field_fallbacks_and_empty_drop() {
        let corpus = parse_corpus(
            r#"[
                {"text":"", "content":"from content", "title":"", "headline":"from headline"},
                {"text":"   ", "url":"https://x/blank"},
                {"url":"https://x/none"},
                {"text":"kept", "title":"T", "headline":"ignored"}
            ]"#,
        );
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.documents()[0].text, "from content");
        assert_eq!(corpus.documents()[0].title, "from headline");
        assert_eq!(corpus.documents()[1].title, "T");
    }

    #[test]
    fn test_non_object_items_stringified() {
        let corpus = parse_corpus(r#"["a plain string", 42, null, {"text":"obj"}]"#);
        let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["a plain string", "42", "null", "obj"]);
    }

    #[test]
    fn test_null_item_kept_as_json_text() {
        let corpus = parse_corpus(r#"[null, {"text":"obj"}]"#);
        assert_eq!(corpus.len(), 2);
        let doc = &corpus.documents()[0];
        assert_eq!(doc.text, "null");
        assert_eq!(doc.url, "");
    }

    #[test]
    fn test_json_lines() {
        let corpus = parse_corpus(
            "{\"text\":\"first\",\"url\":\"u1\"}\n\n{\"text\":\"second\",\"url\":\"u2\"}\n",
        );
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.documents()[1].url, "u2");
    }

    #[test]
    fn test_broken_json_is_one_document() {
        let raw = "{\"text\": \"unterminated\n{\"text\": \"also broken\"";
        let corpus = parse_corpus(raw);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents()[0].text, raw);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_corpus("   \n ").is_empty());
        assert!(parse_corpus("[]").is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let corpus = parse_corpus(r#"[{"text":"b"},{"text":"a"},{"text":"c"}]"#);
        let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_missing_file_degrades() {
        let path = std::env::temp_dir().join("shieldchat-definitely-missing-corpus.json");
        let outcome = load_corpus(&path);
        assert!(outcome.corpus.is_empty());
        assert!(matches!(outcome.warning, Some(ShieldChatError::Corpus(_))));
    }

    #[test]
    fn test_invalid_utf8_degrades() {
        let path = std::env::temp_dir().join(format!(
            "shieldchat-corpus-bad-utf8-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe, 0x6f]).unwrap();
        let outcome = load_corpus(&path);
        std::fs::remove_file(&path).ok();
        assert!(outcome.corpus.is_empty());
        assert!(outcome.warning.is_some());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "shieldchat-corpus-ok-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"[{"text":"RfPatrol","url":"https://x/rf"}]"#).unwrap();
        let outcome = load_corpus(&path);
        std::fs::remove_file(&path).ok();
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.corpus.len(), 1);
    }
}
