use tracing::warn;

use crate::dictionary::Dictionary;
use crate::tokenize::{normalise, tokenise};

/// Compute the word index for a piece of text: the product of the dictionary indices of every
/// recognized token. Repeated tokens multiply in again.
///
/// Returns 0 when no token is recognized. If the product would overflow an `i64`, multiplication
/// stops and the partial product is returned, so later words of a very long text become
/// unsearchable instead of the index becoming meaningless.
pub fn index_text(dictionary: &dyn Dictionary, text: &str) -> i64 {
    let words = tokenise(text);
    let mut index: i64 = 1;

    for (position, prime) in dictionary.lookup_words(&words).into_iter().enumerate() {
        if prime <= 0 {
            continue;
        }
        match index.checked_mul(prime) {
            Some(product) => index = product,
            None => {
                warn!("word index overflow at token {} of {}, remaining words are not indexed", position, words.len());
                break;
            }
        }
    }

    if index == 1 {
        0
    } else {
        index
    }
}

/// The divisor a word index must be divisible by to contain `word`, or `None` when the word is
/// not in the dictionary.
pub fn word_divisor(dictionary: &dyn Dictionary, word: &str) -> Option<i64> {
    match dictionary.lookup(&normalise(word)) {
        prime if prime > 0 => Some(prime),
        _ => None,
    }
}

/// The combined divisor for every recognized word of `query`, or `None` if no word is recognized
/// or the product cannot be represented (in which case no stored index can contain them all).
pub fn search_divisor(dictionary: &dyn Dictionary, query: &str) -> Option<i64> {
    let words = tokenise(query);
    let mut divisor: i64 = 1;

    for prime in dictionary.lookup_words(&words) {
        if prime > 0 {
            divisor = divisor.checked_mul(prime)?;
        }
    }

    if divisor == 1 {
        None
    } else {
        Some(divisor)
    }
}
