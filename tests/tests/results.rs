use anyhow::Result;
use common::*;

use tabula_core::{Assignment, Condition, Error, Filter, Sorter, Target, Value};

fn value_is(value: &str) -> Filter { Filter::on("testable").when(Condition::equals("Value", value)) }

#[test]
fn test_results_get() -> Result<()> {
    let db = setup()?;
    insert(&db, &testable(), 1, "Hello")?;
    insert(&db, &testable(), 2, "World")?;

    let mut row = [Target::new("ID"), Target::new("Value")];
    assert_eq!(db.search(value_is("Hello")).get(&mut row)?, 1);
    assert_eq!(row[0].value(), Some(&Value::I64(1)));
    assert_eq!(row[1].value(), Some(&Value::from("Hello")));
    Ok(())
}

#[test]
fn test_results_read() -> Result<()> {
    let db = setup()?;
    insert(&db, &testable(), 1, "Hello")?;
    insert(&db, &testable(), 2, "World")?;

    let targets = db.search(value_is("Hello").columns(["Value"])).read()?;
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].column(), "Value");
    assert_eq!(targets[0].value(), Some(&Value::from("Hello")));
    Ok(())
}

#[test]
fn test_results_read_all_columns() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    let targets = db.search(value_is("World").slice(0, 0)).read()?;
    let columns: Vec<&str> = targets.iter().map(|t| t.column()).collect();
    assert_eq!(columns, vec!["ID", "Value"]);
    assert_eq!(targets[0].values(), &[Value::from(2i64), Value::from(3i64)]);
    assert_eq!(targets[1].values(), &[Value::from("World"), Value::from("World")]);

    assert!(matches!(db.search(value_is("nobody")).read(), Err(Error::NotFound)));
    Ok(())
}

#[test]
fn test_results_json() -> Result<()> {
    let db = setup()?;
    insert(&db, &testable(), 1, "Hello")?;
    insert(&db, &testable(), 2, "World")?;

    assert_eq!(json(db.search(value_is("Hello")).to_json()?), r#"[{"ID":1,"Value":"Hello"}]"#);

    let everything = Filter::on("testable").when(Condition::not_equals("Value", "")).sort_by(Sorter::increasing("Value"));
    assert_eq!(json(db.search(everything.clone()).to_json()?), r#"[{"ID":1,"Value":"Hello"},{"ID":2,"Value":"World"}]"#);
    assert_eq!(serde_json::to_string(&db.search(everything))?, r#"[{"ID":1,"Value":"Hello"},{"ID":2,"Value":"World"}]"#);

    assert_eq!(json(db.search(value_is("nobody")).to_json()?), "[]");
    Ok(())
}

#[test]
fn test_results_count() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    assert_eq!(db.search(value_is("Hello")).count()?, 1);
    assert_eq!(db.search(value_is("World")).count()?, 2);
    assert_eq!(db.search(value_is("")).count()?, 0);
    Ok(())
}

#[test]
fn test_results_sum() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    assert_eq!(db.search(value_is("Hello")).sum("ID")?, Value::I64(1));
    assert_eq!(db.search(value_is("World")).sum("ID")?, Value::I64(5));
    assert_eq!(db.search(value_is("")).sum("ID")?, Value::I64(0));

    assert!(matches!(db.search(value_is("World")).sum("Value"), Err(Error::UnsupportedType { .. })));
    Ok(())
}

#[test]
fn test_results_average() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    assert_eq!(db.search(value_is("Hello")).average("ID")?, 1.0);
    assert_eq!(db.search(value_is("World")).average("ID")?, 2.5);
    assert!(db.search(value_is("")).average("ID")?.is_nan());

    assert!(matches!(db.search(value_is("World")).average("Value"), Err(Error::UnsupportedType { .. })));
    Ok(())
}

#[test]
fn test_results_average_of_nothing_is_nan() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    assert!(db.search(value_is("nobody")).average("Value")?.is_nan());
    assert!(matches!(db.search(value_is("nobody")).average("Missing"), Err(Error::ColumnNotFound { .. })));
    Ok(())
}

#[test]
fn test_results_slice() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    let mut ids = [Target::new("ID")];
    let worlds = value_is("World").sort_by(Sorter::increasing("ID")).slice(0, 2);
    assert_eq!(db.search(worlds).get(&mut ids)?, 2);
    assert_eq!(ids[0].values(), &[Value::I64(2), Value::I64(3)]);

    let all = Filter::on("testable").when(Condition::not_equals("Value", "")).sort_by(Sorter::increasing("ID")).slice(0, 3).columns(["ID"]);
    let targets = db.search(all).read()?;
    assert_eq!(targets[0].values(), &[Value::I64(1), Value::I64(2), Value::I64(3)]);
    Ok(())
}

#[test]
fn test_results_slice_window() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    let ids = |offset, length| -> Result<Vec<Value>> {
        let mut ids = [Target::new("ID")];
        db.search(Filter::on("testable").sort_by(Sorter::decreasing("ID")).slice(offset, length)).get(&mut ids)?;
        let [ids] = ids;
        Ok(ids.into_values())
    };

    assert_eq!(ids(1, 2)?, vec![Value::I64(2), Value::I64(1)]);
    assert_eq!(ids(0, 0)?, vec![Value::I64(3), Value::I64(2), Value::I64(1)]);
    assert_eq!(ids(2, 10)?, vec![Value::I64(1)]);
    assert!(ids(5, 2)?.is_empty());
    Ok(())
}

#[test]
fn test_results_not_found() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    let mut row = [Target::new("ID"), Target::new("Value")];
    let missing = value_is("DOES NOT EXIST").sort_by(Sorter::increasing("ID"));
    assert!(matches!(db.search(missing).get(&mut row), Err(Error::NotFound)));
    assert!(row[0].values().is_empty());
    Ok(())
}

#[test]
fn test_results_update() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    assert_eq!(db.search(value_is("Hello")).update(&[Assignment::new("Value", "olleH")])?, 1);

    let mut value = [Target::new("Value")];
    db.search(value_is("olleH")).get(&mut value)?;
    assert_eq!(value[0].value(), Some(&Value::from("olleH")));

    assert!(matches!(db.search(value_is("Hello")).get(&mut value), Err(Error::NotFound)));
    assert_eq!(db.search(value_is("World")).count()?, 2);
    Ok(())
}

#[test]
fn test_results_update_validates_first() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    let bad_kind = [Assignment::new("Value", "changed"), Assignment::new("ID", 9i32)];
    assert!(matches!(db.search(value_is("Hello")).update(&bad_kind), Err(Error::TypeMismatch { .. })));

    let bad_column = [Assignment::new("Value", "changed"), Assignment::new("Nope", 1i64)];
    assert!(matches!(db.search(value_is("Hello")).update(&bad_column), Err(Error::ColumnNotFound { .. })));

    // two rows cannot share a key, nor take one another row already holds
    assert!(matches!(db.search(value_is("World")).update(&[Assignment::new("ID", 7i64)]), Err(Error::DuplicateKey { .. })));
    assert!(matches!(db.search(value_is("Hello")).update(&[Assignment::new("ID", 2i64)]), Err(Error::DuplicateKey { .. })));

    assert_eq!(db.search(value_is("changed")).count()?, 0);
    assert_eq!(db.search(value_is("Hello")).update(&[Assignment::new("ID", 10i64)])?, 1);
    assert_eq!(db.search(Filter::on("testable")).sum("ID")?, Value::I64(15));
    Ok(())
}

#[test]
fn test_results_delete() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    assert_eq!(db.search(value_is("World")).delete()?, 2);

    let mut row = [Target::new("ID"), Target::new("Value")];
    assert!(matches!(db.search(value_is("World")).get(&mut row), Err(Error::NotFound)));

    db.search(value_is("Hello")).get(&mut row)?;
    assert_eq!(row[0].value(), Some(&Value::I64(1)));
    assert_eq!(row[1].value(), Some(&Value::from("Hello")));

    assert_eq!(db.search(value_is("Hello")).delete()?, 1);
    assert_eq!(db.search(value_is("Hello")).delete()?, 0);
    assert_eq!(db.search(Filter::on("testable")).count()?, 0);
    Ok(())
}

#[test]
fn test_results_delete_moves_last_row_into_gap() -> Result<()> {
    let db = setup()?;
    for (id, value) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
        insert(&db, &testable(), id, value)?;
    }

    db.search(value_is("b")).delete()?;

    let ids: Vec<Value> = db.search(Filter::on("testable")).rows()?.iter().filter_map(|row| row.get("ID").cloned()).collect();
    assert_eq!(ids, vec![Value::I64(1), Value::I64(4), Value::I64(3)]);
    Ok(())
}

#[test]
fn test_conditions_are_conjunctive() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    let filter = value_is("World").and(Condition::less_than("ID", 3i64));
    assert_eq!(db.search(filter).count()?, 1);

    let filter = Filter::on("testable").when(tabula_core::either(Condition::equals("ID", 1i64), Condition::equals("ID", 3i64)));
    assert_eq!(db.search(filter).count()?, 2);
    Ok(())
}
