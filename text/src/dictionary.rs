use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prime::next_prime;
use crate::tokenize::normalise;

/// A Dictionary is required for natural-language search over text columns.
///
/// Lookups return a concept index for each word. Indices must be constant for a given word within
/// a given dictionary and unique to the concept the word represents; `DictionaryMap` hands out
/// primes so that the product of several indices can be factored back into its words.
/// Words without a dictionary entry map to 0.
pub trait Dictionary: Send + Sync {
    fn lookup(&self, word: &str) -> i64;

    fn lookup_words(&self, words: &[String]) -> Vec<i64> { words.iter().map(|word| self.lookup(word)).collect() }
}

#[derive(Debug)]
struct Inner {
    words: HashMap<String, i64>,
    next_prime: i64,
}

/// Map-backed `Dictionary` assigning successive primes to new words.
#[derive(Debug)]
pub struct DictionaryMap(RwLock<Inner>);

/// Serializable copy of a `DictionaryMap`, so a vocabulary can be saved and restored with the
/// exact same word-to-prime assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionarySnapshot {
    pub words: BTreeMap<String, i64>,
    pub next_prime: i64,
}

impl Default for DictionaryMap {
    fn default() -> Self { Self::new() }
}

impl DictionaryMap {
    pub fn new() -> Self { Self(RwLock::new(Inner { words: HashMap::new(), next_prime: 2 })) }

    /// Add words to the dictionary, each receiving the next unused prime.
    ///
    /// A word of the form `"primary/synonym/..."` maps the primary word to a new prime and aliases
    /// every synonym to that same prime, replacing any prime a synonym held before. A primary word
    /// already present keeps its prime.
    pub fn add<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = self.0.write().unwrap_or_else(PoisonError::into_inner);

        for word in words {
            let mut segments = word.as_ref().split('/');
            let primary = normalise(segments.next().unwrap_or_default());

            let prime = match inner.words.get(&primary) {
                Some(prime) => *prime,
                None => {
                    let prime = inner.next_prime;
                    inner.next_prime = next_prime(prime);
                    inner.words.insert(primary.clone(), prime);
                    debug!("dictionary: {} => {}", primary, prime);
                    prime
                }
            };

            for synonym in segments {
                inner.words.insert(normalise(synonym), prime);
            }
        }
    }

    /// Alias `synonym` to the entry for `of`. Does nothing when `of` is not in the dictionary.
    pub fn add_synonym(&self, synonym: &str, of: &str) {
        let mut inner = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(prime) = inner.words.get(&normalise(of)).copied() {
            inner.words.insert(normalise(synonym), prime);
        }
    }

    pub fn len(&self) -> usize { self.0.read().unwrap_or_else(PoisonError::into_inner).words.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// The prime the next new word will receive.
    pub fn next_prime(&self) -> i64 { self.0.read().unwrap_or_else(PoisonError::into_inner).next_prime }

    pub fn snapshot(&self) -> DictionarySnapshot {
        let inner = self.0.read().unwrap_or_else(PoisonError::into_inner);
        DictionarySnapshot { words: inner.words.iter().map(|(k, v)| (k.clone(), *v)).collect(), next_prime: inner.next_prime }
    }

    pub fn from_snapshot(snapshot: DictionarySnapshot) -> Self {
        Self(RwLock::new(Inner { words: snapshot.words.into_iter().collect(), next_prime: snapshot.next_prime.max(2) }))
    }
}

impl Dictionary for DictionaryMap {
    fn lookup(&self, word: &str) -> i64 {
        let inner = self.0.read().unwrap_or_else(PoisonError::into_inner);
        inner.words.get(&normalise(word)).copied().unwrap_or(0)
    }

    fn lookup_words(&self, words: &[String]) -> Vec<i64> {
        let inner = self.0.read().unwrap_or_else(PoisonError::into_inner);
        words.iter().map(|word| inner.words.get(&normalise(word)).copied().unwrap_or(0)).collect()
    }
}
