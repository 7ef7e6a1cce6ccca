// Copyright 2022 Oxide Computer Company

//! Naming services: bidirectional maps between values and sets of names.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::LexiconError;

/// Fallback used when a lookup has no registered association: nothing, a
/// fixed value, or a function of the lookup input.
enum Fallback<I, O> {
    Nil,
    Value(O),
    With(Box<dyn Fn(&I) -> O + Send + Sync>),
}

impl<I, O: Clone> Fallback<I, O> {
    fn apply(&self, input: &I) -> Option<O> {
        match self {
            Fallback::Nil => None,
            Fallback::Value(v) => Some(v.clone()),
            Fallback::With(f) => Some(f(input)),
        }
    }
}

/// A collection of values with associated names.
///
/// Each value has a set of names, one of which is the *primary* name.
/// Parsing accepts any registered name, ignoring case; formatting uses
/// the primary. All names must be unique (ignoring case) over the whole
/// lexicon; registering a name already bound to a different value is a
/// hard failure, while re-adding an existing association is silently
/// ignored.
///
/// A lexicon can carry a default name and a default key. The default name
/// is used when a name is requested for a value that has none; the
/// default key when a value is requested for an unregistered name. Either
/// can be a constant or a function of the lookup input.
pub struct Lexicon<K> {
    by_name: HashMap<String, K>,
    by_key: HashMap<K, Vec<String>>,
    default_name: Fallback<K, String>,
    default_key: Fallback<String, K>,
}

impl<K: Copy + Eq + Hash> Lexicon<K> {
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            by_key: HashMap::new(),
            default_name: Fallback::Nil,
            default_key: Fallback::Nil,
        }
    }

    /// Begin building a lexicon. Conflicting definitions panic, which
    /// makes the builder suitable only for tables that are correct by
    /// construction; use [`Lexicon::define`] for runtime changes.
    pub fn build() -> Builder<K> {
        Builder {
            lexicon: Self::new(),
            last: None,
        }
    }

    /// Associate `name` with `key`. The first name defined for a value
    /// becomes its primary name.
    pub fn define(&mut self, key: K, name: &str) -> Result<(), LexiconError> {
        let folded = name.to_ascii_lowercase();
        match self.by_name.get(&folded) {
            Some(bound) if *bound != key => {
                return Err(LexiconError::NameTaken(name.to_string()))
            }
            Some(_) => return Ok(()), // already present, ignore
            None => {}
        }
        self.by_name.insert(folded, key);
        self.by_key.entry(key).or_default().push(name.to_string());
        Ok(())
    }

    /// Associate `name` with `key` and make it the primary name.
    pub fn promote(&mut self, key: K, name: &str) -> Result<(), LexiconError> {
        self.define(key, name)?;
        let names = self.by_key.entry(key).or_default();
        if let Some(at) = names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
        {
            names.swap(0, at);
        }
        Ok(())
    }

    /// The value registered for `name` (case-insensitive), falling back
    /// to the default key.
    pub fn key(&self, name: &str) -> Option<K> {
        let folded = name.to_ascii_lowercase();
        match self.by_name.get(&folded) {
            Some(k) => Some(*k),
            None => self.default_key.apply(&folded),
        }
    }

    /// The primary name for `key`, falling back to the default name.
    pub fn name(&self, key: K) -> Option<String> {
        match self.primary(key) {
            Some(name) => Some(name.to_string()),
            None => self.default_name.apply(&key),
        }
    }

    /// The primary name for `key`, with no fallback.
    pub fn primary(&self, key: K) -> Option<&str> {
        self.by_key
            .get(&key)
            .and_then(|names| names.first())
            .map(String::as_str)
    }

    /// All names for `key`, primary first.
    pub fn names(&self, key: K) -> &[String] {
        self.by_key.get(&key).map_or(&[], Vec::as_slice)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_ascii_lowercase())
    }

    pub fn set_default_name(&mut self, name: String) {
        self.default_name = Fallback::Value(name);
    }

    pub fn set_default_name_with(
        &mut self,
        f: impl Fn(&K) -> String + Send + Sync + 'static,
    ) {
        self.default_name = Fallback::With(Box::new(f));
    }

    pub fn set_default_key(&mut self, key: K) {
        self.default_key = Fallback::Value(key);
    }

    pub fn set_default_key_with(
        &mut self,
        f: impl Fn(&String) -> K + Send + Sync + 'static,
    ) {
        self.default_key = Fallback::With(Box::new(f));
    }

    /// Number of distinct named values.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Iterate over `(value, names)` associations in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[String])> {
        self.by_key.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

impl<K: Copy + Eq + Hash> Default for Lexicon<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Chained construction of a lexicon, mirroring declaration-site tables:
///
/// ```
/// # use ip4::lexicon::Lexicon;
/// let lex = Lexicon::build()
///     .word(6, "TCP")
///     .word(17, "UDP")
///     .alias("UDP-LITE")
///     .finish();
/// assert_eq!(lex.key("udp-lite"), Some(17));
/// ```
pub struct Builder<K> {
    lexicon: Lexicon<K>,
    last: Option<K>,
}

impl<K: Copy + Eq + Hash> Builder<K> {
    /// Define `name` for `key` and make `key` current for `alias` calls.
    pub fn word(mut self, key: K, name: &str) -> Self {
        if let Err(e) = self.lexicon.define(key, name) {
            panic!("lexicon construction: {}", e);
        }
        self.last = Some(key);
        self
    }

    /// Add another name to the most recently defined value.
    pub fn alias(mut self, name: &str) -> Self {
        let Some(key) = self.last else {
            panic!("lexicon construction: alias {:?} before any word", name);
        };
        if let Err(e) = self.lexicon.define(key, name) {
            panic!("lexicon construction: {}", e);
        }
        self
    }

    pub fn default_name(mut self, name: &str) -> Self {
        self.lexicon.set_default_name(name.to_string());
        self
    }

    pub fn default_name_with(
        mut self,
        f: impl Fn(&K) -> String + Send + Sync + 'static,
    ) -> Self {
        self.lexicon.set_default_name_with(f);
        self
    }

    pub fn default_key(mut self, key: K) -> Self {
        self.lexicon.set_default_key(key);
        self
    }

    pub fn default_key_with(
        mut self,
        f: impl Fn(&String) -> K + Send + Sync + 'static,
    ) -> Self {
        self.lexicon.set_default_key_with(f);
        self
    }

    pub fn finish(self) -> Lexicon<K> {
        self.lexicon
    }
}
