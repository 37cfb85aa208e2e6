//! # Pattern Matching
//!
//! Subscription patterns are either literal event names or contain the
//! wildcard token [`WILDCARD`], which stands for zero or more arbitrary
//! characters. Every other character matches only itself, so `a.b` never
//! matches `aXb`.
//!
//! Wildcard patterns are compiled once into their literal segments and cached
//! by the raw pattern string.

use parking_lot::RwLock;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

/// The wildcard token.
pub const WILDCARD: char = '*';

/// Returns `true` if the pattern contains the wildcard token anywhere.
pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(WILDCARD)
}

/// A pattern split into the literal segments between wildcard tokens.
///
/// `user:*:done` compiles to `["user:", ":done"]`; a literal pattern compiles
/// to a single segment and only matches itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    segments: Vec<String>,
}

impl CompiledPattern {
    /// Compile a pattern.
    pub fn compile(pattern: &str) -> Self {
        Self {
            segments: pattern.split(WILDCARD).map(str::to_owned).collect(),
        }
    }

    /// Test an event name against the compiled pattern.
    pub fn is_match(&self, name: &str) -> bool {
        let Some((first, rest)) = self.segments.split_first() else {
            return false;
        };
        let Some((last, middle)) = rest.split_last() else {
            return first == name;
        };

        if name.len() < first.len() + last.len()
            || !name.starts_with(first.as_str())
            || !name.ends_with(last.as_str())
        {
            return false;
        }

        // Both bounds fall on char boundaries: they end a matched prefix and
        // start a matched suffix.
        let mut window = &name[first.len()..name.len() - last.len()];
        for segment in middle.iter().filter(|s| !s.is_empty()) {
            match window.find(segment.as_str()) {
                Some(at) => window = &window[at + segment.len()..],
                None => return false,
            }
        }
        true
    }
}

/// Matches patterns against event names, caching compiled patterns.
#[derive(Debug, Default)]
pub struct PatternMatcher {
    cache: RwLock<HashMap<String, Arc<CompiledPattern>>>,
    compiled: AtomicUsize,
}

impl PatternMatcher {
    /// Create a matcher with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `pattern` matches `name`.
    ///
    /// `*` matches everything and a pattern identical to `name` always
    /// matches; any other pattern goes through its cached compiled form.
    pub fn matches(&self, pattern: &str, name: &str) -> bool {
        if pattern.len() == 1 && pattern.starts_with(WILDCARD) {
            return true;
        }
        if pattern == name {
            return true;
        }
        self.compiled(pattern).is_match(name)
    }

    /// Returns `true` if the pattern contains the wildcard token anywhere.
    pub fn has_wildcard(&self, pattern: &str) -> bool {
        has_wildcard(pattern)
    }

    /// Number of compilations performed so far.
    pub fn compiled_count(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }

    /// Number of cached patterns.
    pub fn cache_len(&self) -> usize {
        self.cache.read().len()
    }

    fn compiled(&self, pattern: &str) -> Arc<CompiledPattern> {
        if let Some(hit) = self.cache.read().get(pattern) {
            return Arc::clone(hit);
        }
        let mut cache = self.cache.write();
        // Another caller may have compiled it between the two locks.
        Arc::clone(cache.entry(pattern.to_owned()).or_insert_with(|| {
            self.compiled.fetch_add(1, Ordering::Relaxed);
            Arc::new(CompiledPattern::compile(pattern))
        }))
    }
}
