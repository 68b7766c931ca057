//! Searchable text columns: a string column paired with a derived word-index column. Setting the
//! text through [`TextColumn::assign`] keeps both in step; `has` and `search` turn words into
//! divisibility conditions on the index.

use std::fmt;
use std::sync::Arc;

use tabula_text::{index_text, search_divisor, word_divisor, Dictionary};

use crate::error::{Error, Result};
use crate::schema::{index_column_name, Assignment, TableSchema};
use crate::selection::{both, Condition};
use crate::value::ValueKind;

#[derive(Clone)]
pub struct TextColumn {
    column: String,
    index: String,
    dictionary: Option<Arc<dyn Dictionary>>,
}

impl TextColumn {
    /// A text column with no dictionary: nothing it stores is indexed and no word matches.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        let index = index_column_name(&column);
        Self { column, index, dictionary: None }
    }

    /// The text column `name` of `schema`, which must have been declared with `SchemaBuilder::text`.
    pub fn of(schema: &TableSchema, name: &str) -> Result<Self> {
        let text = Self::new(name);
        for (column, kind) in [(&text.column, ValueKind::String), (&text.index, ValueKind::I64)] {
            let found = schema.column(column).ok_or_else(|| Error::column_not_found(&schema.table, column))?;
            if found.kind != kind {
                return Err(Error::TypeMismatch { column: column.clone(), expected: kind, given: found.kind });
            }
        }
        Ok(text)
    }

    pub fn with_dictionary(mut self, dictionary: Arc<dyn Dictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn column(&self) -> &str { &self.column }

    pub fn index_column(&self) -> &str { &self.index }

    /// Word index of `text` under this column's dictionary.
    pub fn index(&self, text: &str) -> i64 { self.dictionary.as_deref().map(|d| index_text(d, text)).unwrap_or(0) }

    /// Assignments that store `text` and its word index. Use them with `Row::apply` when inserting
    /// or with `Selection::update`.
    pub fn assign(&self, text: &str) -> [Assignment; 2] {
        [Assignment::new(self.column.clone(), text), Assignment::new(self.index.clone(), self.index(text))]
    }

    fn divisible_by(&self, divisor: Option<i64>) -> Condition {
        match divisor {
            Some(divisor) => both(Condition::not_equals(self.index.clone(), 0i64), Condition::divisible_by(self.index.clone(), divisor)),
            None => Condition::never(),
        }
    }

    /// Rows whose text contains `word`. Never matches a word the dictionary does not know.
    pub fn has(&self, word: &str) -> Condition { self.divisible_by(self.dictionary.as_deref().and_then(|d| word_divisor(d, word))) }

    /// Rows whose text contains every recognized word of `query`.
    pub fn search(&self, query: &str) -> Condition { self.divisible_by(self.dictionary.as_deref().and_then(|d| search_divisor(d, query))) }
}

impl fmt::Debug for TextColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextColumn").field("column", &self.column).field("indexed", &self.dictionary.is_some()).finish()
    }
}
