//! Filter rows based on a condition tree. Every query is a linear scan, so this runs once per
//! stored row for each top-level condition of a selection.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    HasPrefix,
    LessThan,
    DivisibleBy,
    True,
    False,
}

/// A predicate over one row.
///
/// A condition with `cases` evaluates its own operator first and then each case against the same
/// row, combined with OR, or with AND when `invert` is set. Evaluation short-circuits.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
    pub cases: Vec<Condition>,
    pub invert: bool,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self { column: column.into(), operator, value: value.into(), cases: Vec::new(), invert: false }
    }

    fn constant(operator: Operator) -> Self { Self::new(String::new(), operator, false) }

    /// Matches every row.
    pub fn always() -> Self { Self::constant(Operator::True) }

    /// Matches no row.
    pub fn never() -> Self { Self::constant(Operator::False) }

    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self { Self::new(column, Operator::Equals, value) }

    pub fn not_equals(column: impl Into<String>, value: impl Into<Value>) -> Self { Self::new(column, Operator::NotEquals, value) }

    pub fn contains(column: impl Into<String>, value: impl Into<Value>) -> Self { Self::new(column, Operator::Contains, value) }

    pub fn has_prefix(column: impl Into<String>, value: impl Into<Value>) -> Self { Self::new(column, Operator::HasPrefix, value) }

    pub fn less_than(column: impl Into<String>, value: impl Into<Value>) -> Self { Self::new(column, Operator::LessThan, value) }

    pub fn divisible_by(column: impl Into<String>, divisor: i64) -> Self { Self::new(column, Operator::DivisibleBy, divisor) }

    /// Non-empty string test.
    pub fn exists(column: impl Into<String>) -> Self { Self::not_equals(column, "") }
}

/// True if any of the given conditions is true.
pub fn switch(first: Condition, cases: impl IntoIterator<Item = Condition>) -> Condition {
    let mut any = Condition::never();
    any.cases.push(first);
    any.cases.extend(cases);
    any
}

pub fn either(a: Condition, b: Condition) -> Condition { switch(a, [b]) }

pub fn both(a: Condition, b: Condition) -> Condition {
    let mut all = Condition::always();
    all.cases = vec![a, b];
    all.invert = true;
    all
}

/// Items that can be filtered by condition evaluation.
pub trait Filterable {
    fn table(&self) -> &str;
    fn value(&self, name: &str) -> Option<&Value>;
}

fn mismatch(column: &str, value: &Value, given: &Value) -> Error {
    Error::TypeMismatch { column: column.to_string(), expected: value.kind(), given: given.kind() }
}

fn evaluate_operator<R: Filterable>(record: &R, condition: &Condition) -> Result<bool> {
    let column = condition.column.as_str();
    let value = match condition.operator {
        Operator::True => return Ok(true),
        Operator::False => return Ok(false),
        _ => record.value(column).ok_or_else(|| Error::column_not_found(record.table(), column))?,
    };
    let operand = &condition.value;

    match condition.operator {
        Operator::Equals => Ok(value == operand),
        Operator::NotEquals => Ok(value != operand),
        Operator::Contains => match (value, operand) {
            (Value::String(s), Value::String(needle)) => Ok(s.contains(needle.as_str())),
            (Value::Bytes(b), Value::Bytes(needle)) => Ok(needle.is_empty() || b.windows(needle.len()).any(|w| w == needle.as_slice())),
            (Value::String(_) | Value::Bytes(_), _) => Err(mismatch(column, value, operand)),
            _ => Err(Error::unsupported(column, value.kind(), "search")),
        },
        Operator::HasPrefix => match (value, operand) {
            (Value::String(s), Value::String(prefix)) => Ok(s.starts_with(prefix.as_str())),
            (Value::Bytes(b), Value::Bytes(prefix)) => Ok(b.starts_with(prefix)),
            (Value::String(_) | Value::Bytes(_), _) => Err(mismatch(column, value, operand)),
            _ => Err(Error::unsupported(column, value.kind(), "search")),
        },
        Operator::LessThan => match value.less(operand) {
            Some(less) => Ok(less),
            None if value.kind().is_sortable() => Err(mismatch(column, value, operand)),
            None => Err(Error::unsupported(column, value.kind(), "compare")),
        },
        Operator::DivisibleBy => match (value.as_i128(), operand.as_i128()) {
            (Some(v), Some(divisor)) => Ok(v != 0 && divisor != 0 && v % divisor == 0),
            (Some(_), None) => Err(mismatch(column, value, operand)),
            (None, _) => Err(Error::unsupported(column, value.kind(), "divide")),
        },
        Operator::True => Ok(true),
        Operator::False => Ok(false),
    }
}

pub fn evaluate_condition<R: Filterable>(record: &R, condition: &Condition) -> Result<bool> {
    let own = evaluate_operator(record, condition)?;
    if condition.cases.is_empty() {
        return Ok(own);
    }

    // AND stops at the first false term, OR at the first true one
    let stop = !condition.invert;
    if own == stop {
        return Ok(stop);
    }
    for case in &condition.cases {
        if evaluate_condition(record, case)? == stop {
            return Ok(stop);
        }
    }
    Ok(!stop)
}

/// Conjunction of every top-level condition.
pub fn evaluate_all<R: Filterable>(record: &R, conditions: &[Condition]) -> Result<bool> {
    for condition in conditions {
        if !evaluate_condition(record, condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}
