//! Named numeric metrics and value resolution

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::CompileError;

/// Named values that constraint text may use in place of literals
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: HashMap<String, f64>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a metric
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve a value token: a metric name if it starts like an identifier,
    /// otherwise a decimal literal. Missing metrics never default to zero.
    pub fn resolve(&self, token: &str) -> Result<f64, CompileError> {
        if starts_like_identifier(token) {
            let value = self.get(token).ok_or_else(|| CompileError::UnknownMetric {
                name: token.to_string(),
            })?;
            tracing::trace!(metric = token, value, "resolved metric");
            Ok(value)
        } else {
            token
                .parse::<f64>()
                .map_err(|_| CompileError::MalformedNumber {
                    token: token.to_string(),
                })
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricSet {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// True when the first character is an ASCII letter or underscore
pub fn starts_like_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}
