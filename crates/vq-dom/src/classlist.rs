//! DOMTokenList (classList)
//!
//! Token-set semantics for the `class` attribute. Mutating calls validate
//! their tokens first and leave the list untouched on error.

use crate::{DomError, DomResult};

/// Ordered set of space-separated tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomTokenList {
    tokens: Vec<String>,
}

impl DomTokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_ascii_whitespace() {
            if !list.contains(token) {
                list.tokens.push(token.to_string());
            }
        }
        list
    }

    /// Get number of tokens
    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    /// Get token at index
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|s| s.as_str())
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token(s)
    pub fn add(&mut self, tokens: &[&str]) -> DomResult<()> {
        validate_tokens(tokens)?;
        for token in tokens {
            if !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
        Ok(())
    }

    /// Remove token(s)
    pub fn remove(&mut self, tokens: &[&str]) -> DomResult<()> {
        validate_tokens(tokens)?;
        self.tokens.retain(|t| !tokens.contains(&t.as_str()));
        Ok(())
    }

    /// Toggle token, returns new membership
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> DomResult<bool> {
        validate_token(token)?;
        let present = self.contains(token);
        let want = force.unwrap_or(!present);

        if want && !present {
            self.tokens.push(token.to_string());
        } else if !want && present {
            self.tokens.retain(|t| t != token);
        }
        Ok(want)
    }

    /// Replace token, returns whether `old_token` was present
    pub fn replace(&mut self, old_token: &str, new_token: &str) -> DomResult<bool> {
        validate_tokens(&[old_token, new_token])?;
        let Some(pos) = self.tokens.iter().position(|t| t == old_token) else {
            return Ok(false);
        };

        if self.contains(new_token) {
            self.tokens.remove(pos);
        } else {
            self.tokens[pos] = new_token.to_string();
        }
        Ok(true)
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }

    pub(crate) fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    pub(crate) fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl std::fmt::Display for DomTokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Empty tokens are a syntax error, whitespace inside a token is an invalid character
pub(crate) fn validate_token(token: &str) -> DomResult<()> {
    if token.is_empty() {
        return Err(DomError::Syntax(token.to_string()));
    }
    if token.chars().any(|c| c.is_ascii_whitespace()) {
        return Err(DomError::InvalidCharacter(token.to_string()));
    }
    Ok(())
}

fn validate_tokens(tokens: &[&str]) -> DomResult<()> {
    tokens.iter().try_for_each(|t| validate_token(t))
}
