//! An embedded, in-process table engine. Schemas are data: tables are laid out at runtime from
//! column descriptors, and queries are linear scans filtered by condition trees, ordered by a sort
//! cascade and finished by a terminal action (count, sum, average, get, update, delete or JSON).

pub mod engine;
pub mod error;
pub mod schema;
pub mod selection;
mod storage;
pub mod text;
pub mod value;

pub use engine::{Database, Engine};
pub use error::{Error, Result};
pub use schema::{Assignment, Column, Row, SchemaBuilder, TableSchema};
pub use selection::{both, either, switch, Condition, Filter, LinkEnd, Linker, Operator, Selection, Sorter, Target};
pub use text::TextColumn;
pub use value::{Value, ValueKind};

pub use tabula_text as dictionary;
