//! Dispatch options: the `KEY:VALUE` pairs handed to the dispatch entry point.
//!
//! Each `--dispatch-opt` token is split on its first `:`. Everything after
//! that stays in the value, so `url:http://host:8080` yields the key `url`
//! with the value `http://host:8080`. Values are always text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Separator between key and value in a dispatch option token.
pub const SEPARATOR: char = ':';

/// Splits a single `KEY:VALUE` token on its first separator.
pub fn parse_option(token: &str) -> Result<(String, String), DispatchError> {
    token
        .split_once(SEPARATOR)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| DispatchError::InvalidOption(token.to_string()))
}

/// String-keyed options passed to the dispatch entry point as keyword arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchOptions {
    entries: BTreeMap<String, String>,
}

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw `KEY:VALUE` tokens in order.
    ///
    /// A later token with the same key replaces the earlier value. The first
    /// token without a separator aborts parsing.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::new();
        for token in tokens {
            let (key, value) = parse_option(token.as_ref())?;
            options.insert(key, value);
        }
        Ok(options)
    }

    /// Sets an option, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encodes the options as a single-line JSON object.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }
}

impl<K, V> FromIterator<(K, V)> for DispatchOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut options = Self::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}
