// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! String key/value configuration contexts.
//!
//! Engines receive a read-only [`Context`] holding the system configuration
//! subtree they were configured with. Connector callbacks receive a
//! [`MutableContext`] scoped to a single submission attempt, which they may
//! use to hand information to the remote side of the transfer.

use std::collections::BTreeMap;

/// Read-only string key/value configuration.
///
/// Keys are dotted paths, e.g. `submission.engine.queue`.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value while building the context.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a string value.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up an integer value, falling back to `default` when the key is
    /// absent or not parseable.
    pub fn integer(&self, key: &str, default: i64) -> i64 {
        self.string(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Look up a boolean value. `"true"` and `"1"` are truthy.
    pub fn boolean(&self, key: &str, default: bool) -> bool {
        self.string(key)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(default)
    }

    /// All entries whose key starts with `prefix`, with the prefix stripped.
    pub fn scoped(&self, prefix: &str) -> Context {
        let values = self
            .values
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(prefix)
                    .map(|rest| (rest.to_string(), v.clone()))
            })
            .collect();
        Context { values }
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Context {
            values: iter.into_iter().collect(),
        }
    }
}

/// Mutable string key/value context scoped to one submission attempt.
///
/// Written by connector initializers; read by the execution engine when it
/// lays out the remote job, and by the destroyer on cleanup.
#[derive(Debug, Clone, Default)]
pub struct MutableContext {
    values: BTreeMap<String, String>,
}

impl MutableContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a string value.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_lookups() {
        let ctx = Context::new()
            .with("submission.engine.queue", "transfers")
            .with("submission.engine.max_attempts", "3")
            .with("submission.engine.verbose", "1");

        assert_eq!(ctx.string("submission.engine.queue"), Some("transfers"));
        assert_eq!(ctx.integer("submission.engine.max_attempts", 1), 3);
        assert_eq!(ctx.integer("submission.engine.missing", 7), 7);
        assert!(ctx.boolean("submission.engine.verbose", false));
        assert!(!ctx.boolean("submission.engine.quiet", false));
    }

    #[test]
    fn test_context_scoped_strips_prefix() {
        let ctx = Context::new()
            .with("submission.engine.queue", "transfers")
            .with("execution.engine.slots", "4");

        let scoped = ctx.scoped("submission.engine.");
        assert_eq!(scoped.string("queue"), Some("transfers"));
        assert_eq!(scoped.string("slots"), None);
    }

    #[test]
    fn test_mutable_context_roundtrip() {
        let mut ctx = MutableContext::new();
        assert!(ctx.is_empty());

        ctx.set("staging.path", "/tmp/stage");
        ctx.set("staging.path", "/var/stage");

        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.string("staging.path"), Some("/var/stage"));
    }
}
