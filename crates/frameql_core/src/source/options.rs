use std::collections::BTreeMap;

use frameql_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use crate::arrays::scalar::ScalarValue;

/// Reader specific options, keyed by lowercased option name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReaderOptions {
    options: BTreeMap<String, ScalarValue>,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an option, returning the previous value if there was one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ScalarValue>,
    ) -> Option<ScalarValue> {
        self.options
            .insert(key.into().to_ascii_lowercase(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.options.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Take an option, returning an error if it doesn't exist.
    pub fn take_option(&mut self, key: &str) -> Result<ScalarValue> {
        self.options
            .remove(key)
            .ok_or_else(|| DbError::missing_option(key))
    }

    pub fn take_bool(&mut self, key: &str) -> Result<Option<bool>> {
        self.options
            .remove(key)
            .map(|v| option_as_bool(key, &v))
            .transpose()
    }

    pub fn take_string(&mut self, key: &str) -> Result<Option<String>> {
        self.options
            .remove(key)
            .map(|v| option_into_string(key, v))
            .transpose()
    }

    /// Take an option that must be a single character, e.g. a delimiter.
    pub fn take_char(&mut self, key: &str) -> Result<Option<u8>> {
        match self.take_string(key)? {
            Some(s) if s.len() == 1 && s.is_ascii() => Ok(Some(s.as_bytes()[0])),
            Some(s) => Err(DbError::invalid_option(
                key,
                format!("expected a single ascii character, got '{s}'"),
            )),
            None => Ok(None),
        }
    }

    /// Check that all options have been taken.
    pub fn check_empty(&self) -> Result<()> {
        if self.options.is_empty() {
            return Ok(());
        }
        let extras = self
            .options
            .keys()
            .map(|k| format!("'{k}'"))
            .collect::<Vec<_>>()
            .join(", ");

        Err(DbError::invalid_option(
            extras,
            "unexpected option for this format",
        ))
    }
}

/// Interpret an option value as a boolean.
pub fn option_as_bool(key: &str, value: &ScalarValue) -> Result<bool> {
    value
        .try_as_bool()
        .map_err(|_| DbError::invalid_option(key, format!("expected a boolean, got '{value}'")))
}

/// Interpret an option value as a string.
pub fn option_into_string(key: &str, value: ScalarValue) -> Result<String> {
    match value {
        ScalarValue::Utf8(s) => Ok(s),
        other => Err(DbError::invalid_option(
            key,
            format!("expected a string, got '{other}'"),
        )),
    }
}
