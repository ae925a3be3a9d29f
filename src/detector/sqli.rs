// ============================================================
//  detector/sqli.rs - SQL injection în parametrii din query
// ============================================================
//
//  Nu căutăm subșiruri brute ("OR" ar apărea în "ORANGE"), ci
//  împărțim valoarea în token-uri:
//    - cuvinte  : secvențe de [A-Z0-9_@]
//    - simboluri: secvențe de alte caractere non-spațiu
//  și comparăm cuvintele cu o listă de cuvinte-cheie SQL.
// ============================================================

use super::{scan_query, Detector, Findings, Summary};
use crate::parser::Record;
use once_cell::sync::Lazy;
use std::collections::HashSet;

static SQL_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "SELECT", "UNION", "SLEEP", "OR", "AND", "WHERE", "ORDER", "AS", "RLIKE",
        "INSERT", "UPDATE", "DELETE", "DROP", "FROM", "BENCHMARK", "WAITFOR",
        "EXEC", "HAVING", "NULL", "CONCAT",
    ]
    .into_iter()
    .collect()
});

/// Operatori de comentariu / terminare interogare
const SQL_OPERATORS: &[&str] = &["--", "/*", "*/", "#"];

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Symbol(&'a str),
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '@'
}

fn tokenize(value: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<(usize, bool)> = None;

    for (i, c) in value.char_indices() {
        let kind = if c.is_whitespace() { None } else { Some(is_word_char(c)) };

        match (start, kind) {
            (Some((_, word)), Some(k)) if word == k => {}
            _ => {
                if let Some((s, word)) = start.take() {
                    tokens.push(make_token(&value[s..i], word));
                }
                start = kind.map(|k| (i, k));
            }
        }
    }
    if let Some((s, word)) = start {
        tokens.push(make_token(&value[s..], word));
    }
    tokens
}

fn make_token(text: &str, word: bool) -> Token<'_> {
    if word {
        Token::Word(text)
    } else {
        Token::Symbol(text)
    }
}

pub fn is_sqli(value: &str) -> bool {
    let upper = value.to_uppercase();
    let trimmed = upper.trim_start();
    if trimmed.starts_with('\'') || trimmed.starts_with('"') {
        return true;
    }

    tokenize(&upper).into_iter().any(|token| match token {
        // `@@VERSION`, `@variable`
        Token::Word(w) => SQL_KEYWORDS.contains(w) || (w.starts_with('@') && w.len() > 1),
        Token::Symbol(s) => SQL_OPERATORS.iter().any(|op| s.contains(op)),
    })
}

pub struct SqliDetector {
    findings: Findings,
}

impl SqliDetector {
    pub fn new() -> Self {
        SqliDetector {
            findings: Findings::default(),
        }
    }
}

impl Detector for SqliDetector {
    fn name(&self) -> &'static str {
        "SQL injection"
    }

    fn analyze(&mut self, batch: &[Record]) {
        scan_query(batch, &mut self.findings, is_sqli);
    }

    fn summary(&self) -> Summary {
        self.findings.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::test_support::record;

    #[test]
    fn tokenizer_separates_words_and_symbols() {
        assert_eq!(
            tokenize("1' OR 1=1--"),
            vec![
                Token::Word("1"),
                Token::Symbol("'"),
                Token::Word("OR"),
                Token::Word("1"),
                Token::Symbol("="),
                Token::Word("1"),
                Token::Symbol("--"),
            ]
        );
    }

    #[test]
    fn keywords_match_whole_tokens_only() {
        assert!(is_sqli("UNION SELECT 1"));
        assert!(is_sqli("1 or sleep(5)"));
        assert!(is_sqli("admin'--"));
        assert!(is_sqli("1/**/and/**/1=1"));
        assert!(is_sqli("@@version"));
        assert!(is_sqli("'abc"));
        assert!(!is_sqli("orange"));
        assert!(!is_sqli("selection-42"));
        assert!(!is_sqli("user@example.com"));
    }

    #[test]
    fn union_select_classified_by_status() {
        let mut accepted = SqliDetector::new();
        accepted.analyze(&[record("1.1.1.1", "/x?q=UNION+SELECT+1", 200)]);
        assert_eq!(accepted.summary().vulnerable.len(), 1);
        assert!(accepted.summary().potential.is_empty());

        let mut rejected = SqliDetector::new();
        rejected.analyze(&[record("1.1.1.1", "/x?q=UNION+SELECT+1", 403)]);
        assert_eq!(rejected.summary().potential.len(), 1);
        assert!(rejected.summary().vulnerable.is_empty());
    }
}
