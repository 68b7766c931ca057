use anyhow::Result;
use common::*;

use tabula_core::{Assignment, Condition, Engine, Error, Filter, Linker, Sorter, TableSchema, Target, Value, ValueKind};

#[test]
fn test_link() -> Result<()> {
    let db = setup()?;
    insert(&db, &testable(), 1, "TestValue")?;
    insert(&db, &linkable(), 1, "LinkedValue")?;
    insert(&db, &linkable(), 2, "Unrelated")?;

    let link = Linker::new(("testable", "ID"), ("linkable", "ID"));
    let mut value = [Target::new("Value")];
    db.search(Filter::linked(link).when(Condition::equals("ID", 1i64))).get(&mut value)?;

    assert_eq!(value[0].value(), Some(&Value::from("LinkedValue")));
    Ok(())
}

#[test]
fn test_link_actions_apply_to_linked_table() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;
    for (id, value) in [(1, "one"), (2, "two"), (3, "three"), (4, "four")] {
        insert(&db, &linkable(), id, value)?;
    }

    let worlds = || Filter::linked(Linker::new(("testable", "ID"), ("linkable", "ID"))).when(Condition::equals("Value", "World"));

    assert_eq!(db.search(worlds()).count()?, 2);
    assert_eq!(db.search(worlds()).sum("ID")?, Value::I64(5));
    assert_eq!(json(db.search(worlds().sort_by(Sorter::decreasing("ID"))).to_json()?), r#"[{"ID":3,"Value":"three"},{"ID":2,"Value":"two"}]"#);

    assert_eq!(db.search(worlds()).update(&[Assignment::new("Value", "linked")])?, 2);
    assert_eq!(db.search(Filter::on("linkable").when(Condition::equals("Value", "linked"))).count()?, 2);
    assert_eq!(db.search(Filter::on("testable").when(Condition::equals("Value", "World"))).count()?, 2);

    assert_eq!(db.search(worlds()).delete()?, 2);
    assert_eq!(db.search(Filter::on("linkable")).count()?, 2);
    assert_eq!(db.search(Filter::on("testable")).count()?, 3);
    Ok(())
}

#[test]
fn test_link_chain() -> Result<()> {
    let db = Engine::new().database("test");
    let authors = TableSchema::build("authors").key("ID", ValueKind::I64).column("Name", ValueKind::String).finish();
    let books = TableSchema::build("books").key("ID", ValueKind::I64).column("Author", ValueKind::I64).column("Title", ValueKind::String).finish();
    let reviews = TableSchema::build("reviews").key("ID", ValueKind::I64).column("Book", ValueKind::I64).column("Stars", ValueKind::U8).finish();
    db.sync_all([&authors, &books, &reviews])?;

    db.insert(&authors.row().set("ID", 1i64)?.set("Name", "Le Guin")?)?;
    db.insert(&authors.row().set("ID", 2i64)?.set("Name", "Lem")?)?;
    for (id, author, title) in [(10i64, 1i64, "Earthsea"), (11, 2, "Solaris"), (12, 1, "The Dispossessed")] {
        db.insert(&books.row().set("ID", id)?.set("Author", author)?.set("Title", title)?)?;
    }
    for (id, book, stars) in [(100i64, 10i64, 5u8), (101, 11, 4), (102, 12, 4), (103, 12, 5)] {
        db.insert(&reviews.row().set("ID", id)?.set("Book", book)?.set("Stars", stars)?)?;
    }

    let filter = Filter::linked(Linker::new(("authors", "ID"), ("books", "Author")))
        .link(Linker::new(("books", "ID"), ("reviews", "Book")))
        .when(Condition::equals("Name", "Le Guin"));
    assert_eq!(db.search(filter.clone()).count()?, 3);
    assert_eq!(db.search(filter).average("Stars")?, 14.0 / 3.0);
    Ok(())
}

#[test]
fn test_link_to_missing_table() -> Result<()> {
    let db = setup()?;
    dummy_rows(&db)?;

    let filter = Filter::linked(Linker::new(("testable", "ID"), ("ghost", "ID")));
    assert!(matches!(db.search(filter).count(), Err(Error::TableNotFound(ref t)) if t == "ghost"));
    Ok(())
}
