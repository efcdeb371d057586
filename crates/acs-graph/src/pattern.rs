//! URI pattern grammar: compiles a `Resource.uri_pattern` into a matcher.
//!
//! Grammar:
//! - Literal segments match themselves, case-insensitively.
//! - `*` matches any sequence of characters, including `/`.
//! - `?` matches any single character.
//! - `{name}` matches one or more characters excluding `/`; the name is
//!   captured for informational purposes only.
//! - The whole pattern is anchored: it must match the entire URI.

use std::collections::HashMap;

use acs_types::error::{AcsError, Result};
use regex::Regex;

/// A compiled URI pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    capture_names: Vec<String>,
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let (translated, capture_names) = translate(pattern)?;
        let regex = regex::RegexBuilder::new(&translated)
            .case_insensitive(true)
            .build()
            .map_err(|e| AcsError::validation(format!("invalid uri pattern {pattern:?}: {e}")))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            capture_names,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, uri: &str) -> bool {
        self.regex.is_match(uri)
    }

    /// Returns the named captures for `uri`, if it matches; `None` if it
    /// does not match this pattern at all.
    pub fn captures(&self, uri: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(uri)?;
        let mut out = HashMap::new();
        for (i, name) in self.capture_names.iter().enumerate() {
            if let Some(m) = caps.get(i + 1) {
                out.insert(name.clone(), m.as_str().to_string());
            }
        }
        Some(out)
    }

    /// A rough specificity score used only to order the reason chain the
    /// evaluator attaches to a decision; never used to override deny-wins.
    pub fn specificity(&self) -> usize {
        let wildcards = self.source.chars().filter(|c| matches!(c, '*' | '?' | '{')).count();
        self.source.len().saturating_sub(wildcards * 2)
    }
}

fn translate(pattern: &str) -> Result<(String, Vec<String>)> {
    let mut out = String::from("^");
    let mut capture_names = Vec::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for nc in chars.by_ref() {
                    if nc == '}' {
                        closed = true;
                        break;
                    }
                    name.push(nc);
                }
                if !closed {
                    return Err(AcsError::validation(format!(
                        "unterminated capture in uri pattern {pattern:?}"
                    )));
                }
                if name.is_empty() {
                    return Err(AcsError::validation(format!(
                        "empty capture name in uri pattern {pattern:?}"
                    )));
                }
                out.push_str("([^/]+)");
                capture_names.push(name);
            }
            '}' => {
                return Err(AcsError::validation(format!(
                    "unmatched '}}' in uri pattern {pattern:?}"
                )));
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    Ok((out, capture_names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_segments_match_case_insensitively() {
        let p = CompiledPattern::compile("/api/users").unwrap();
        assert!(p.matches("/api/users"));
        assert!(p.matches("/API/Users"));
        assert!(!p.matches("/api/users/42"));
    }

    #[test]
    fn star_matches_any_sequence_including_slash() {
        let p = CompiledPattern::compile("/api/*").unwrap();
        assert!(p.matches("/api/users/42"));
        assert!(!p.matches("/apiv2/x"));
    }

    #[test]
    fn question_mark_matches_single_char() {
        let p = CompiledPattern::compile("/v?/x").unwrap();
        assert!(p.matches("/v1/x"));
        assert!(!p.matches("/v12/x"));
    }

    #[test]
    fn capture_extracts_named_segment() {
        let p = CompiledPattern::compile("/users/{userId}/profile").unwrap();
        assert!(p.matches("/users/42/profile"));
        let caps = p.captures("/users/42/profile").unwrap();
        assert_eq!(caps.get("userId"), Some(&"42".to_string()));

        assert!(!p.matches("/users//profile"));
    }

    #[test]
    fn rejects_malformed_capture() {
        assert!(CompiledPattern::compile("/users/{").is_err());
        assert!(CompiledPattern::compile("/users/{}").is_err());
        assert!(CompiledPattern::compile("/users/}").is_err());
    }
}
