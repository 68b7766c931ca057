//! Word dictionary and prime-product word index used by tabula's text columns.
//!
//! Every dictionary word maps to a unique prime. A piece of text is indexed as the product of the
//! primes of its recognized tokens, so "does this text contain word w" becomes a divisibility test
//! on a single integer column that the table engine can scan without any auxiliary structure.

pub mod dictionary;
pub mod index;
pub mod prime;
pub mod tokenize;

pub use dictionary::{Dictionary, DictionaryMap, DictionarySnapshot};
pub use index::{index_text, search_divisor, word_divisor};
pub use tokenize::{normalise, tokenise};
