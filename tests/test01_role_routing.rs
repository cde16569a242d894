mod common;

use appflow_db::prelude::*;
use appflow_db::{classify, record};
use common::{Event, RecordingConnector, mock_options};

#[test]
fn construction_connects_read_only_with_autocommit_off() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let db = connector.db()?;
    assert_eq!(db.current_role(), Some(Role::ReadOnly));
    assert_eq!(
        connector.events(),
        vec![Event::Connect(Role::ReadOnly), Event::Autocommit(false)]
    );
    Ok(())
}

#[test]
fn writes_always_run_on_read_write_connection() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;

    db.execute("SELECT * FROM contacts")?;
    db.execute("INSERT INTO contacts (name) VALUES ('a')")?;
    db.execute("  UPDATE contacts SET name = 'b'")?;
    db.execute("DELETE FROM contacts WHERE name = 'b'")?;
    db.execute("CREATE TABLE audit (id INT)")?;

    for (role, sql) in connector.queries() {
        if classify(&sql) == Some(StatementKind::Write) {
            assert_eq!(role, Role::ReadWrite, "{sql}");
        }
    }
    assert_eq!(connector.queries()[0].0, Role::ReadOnly);
    assert_eq!(db.current_role(), Some(Role::ReadWrite));
    Ok(())
}

#[test]
fn every_connect_is_followed_by_autocommit_off() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    db.execute("INSERT INTO t (a) VALUES ('1')")?;
    db.execute("INSERT INTO t (a) VALUES ('2')")?;

    let events = connector.events();
    for (idx, event) in events.iter().enumerate() {
        if matches!(event, Event::Connect(_)) {
            assert_eq!(events.get(idx + 1), Some(&Event::Autocommit(false)));
        }
    }
    Ok(())
}

#[test]
fn default_options_reconnect_before_every_write() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    db.execute("INSERT INTO t (a) VALUES ('1')")?;
    db.execute("INSERT INTO t (a) VALUES ('2')")?;
    assert_eq!(connector.count(&Event::Connect(Role::ReadWrite)), 2);
    Ok(())
}

#[test]
fn role_change_policy_keeps_one_write_connection() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut options = mock_options();
    options.reconnect_on_every_write = false;
    let mut db = connector.db_with(options)?;

    db.execute("INSERT INTO t (a) VALUES ('1')")?;
    db.execute("SELECT * FROM t")?;
    db.execute("INSERT INTO t (a) VALUES ('2')")?;
    assert_eq!(connector.count(&Event::Connect(Role::ReadWrite)), 1);
    assert!(db.commit()?);
    Ok(())
}

#[test]
fn unrecognized_statements_never_reach_the_driver() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    connector.clear();

    for sql in ["DROP TABLE t", "select * from t", "REPLACE INTO t VALUES (1)", ""] {
        let err = db.execute(sql).expect_err("statement must be rejected");
        assert!(matches!(err, DbError::InvalidStatementError(_)), "{sql}: {err:?}");
    }
    assert!(connector.events().is_empty());
    assert!(db.last_error().is_some());
    assert!(!db.has_cursor());
    Ok(())
}

#[test]
fn driver_errors_surface_as_query_errors() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    let err = db.execute("SELECT * FROM ghost_table").expect_err("query fails");
    assert!(matches!(err, DbError::QueryError(_)));
    assert_eq!(db.last_error(), Some("no such table: ghost_table"));
    Ok(())
}

#[test]
fn update_with_empty_where_sends_nothing() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    connector.clear();

    let updated = db.update("contacts", &record! { "name" => "x" }, &WhereClause::new())?;
    assert!(!updated);
    let deleted = db.delete("contacts", &WhereClause::new())?;
    assert!(!deleted);
    assert!(connector.events().is_empty());
    Ok(())
}

#[test]
fn upsert_with_empty_inputs_is_skipped() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    connector.clear();

    let filter = record! { "id" => 5 };
    assert_eq!(
        db.upsert("contacts", &Record::new(), &filter)?,
        UpsertOutcome::Skipped
    );
    assert_eq!(
        db.upsert("contacts", &record! { "a" => 1 }, &WhereClause::new())?,
        UpsertOutcome::Skipped
    );
    assert!(connector.events().is_empty());
    Ok(())
}

#[test]
fn update_without_known_columns_runs_only_the_catalog_query() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().catalog = vec!["id".into(), "name".into()];
    let mut db = connector.db()?;
    connector.clear();

    let updated = db.update("contacts", &record! { "ghost" => 1 }, &record! { "id" => 1 })?;
    assert!(!updated);
    let queries = connector.queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].1.contains("pragma_table_info('contacts')"));
    Ok(())
}

#[test]
fn update_filters_record_keys_through_the_catalog() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().catalog = vec!["id".into(), "name".into()];
    let mut db = connector.db()?;

    let updated = db.update(
        "contacts",
        &record! { "ghost" => 1, "name" => "x" },
        &record! { "id" => 7 },
    )?;
    assert!(updated);
    let (role, sql) = connector.queries().pop().expect("update statement");
    assert_eq!(role, Role::ReadWrite);
    assert_eq!(sql, "UPDATE `contacts` SET `name` = 'x' WHERE `id` = '7'");
    Ok(())
}

#[test]
fn commit_without_a_statement_returns_false_and_skips_the_driver() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    assert!(!db.commit()?);
    assert_eq!(connector.count(&Event::Commit(Role::ReadOnly)), 0);
    Ok(())
}

#[test]
fn failed_commit_rolls_back_and_reports() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    db.execute("INSERT INTO t (a) VALUES ('1')")?;
    connector.script.borrow_mut().fail_commit = true;

    let err = db.commit().expect_err("commit fails");
    assert!(matches!(err, DbError::CommitError(_)));
    assert_eq!(connector.count(&Event::Rollback(Role::ReadWrite)), 1);
    Ok(())
}

#[test]
fn failed_rollback_after_failed_commit_is_swallowed() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    db.execute("INSERT INTO t (a) VALUES ('1')")?;
    {
        let mut script = connector.script.borrow_mut();
        script.fail_commit = true;
        script.fail_rollback = true;
    }

    let err = db.commit().expect_err("commit fails");
    assert!(matches!(err, DbError::CommitError(_)));
    assert_eq!(db.last_error(), Some("Lock wait timeout exceeded"));
    Ok(())
}

#[test]
fn initial_connection_failure_is_terminal() {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().fail_connect = Some(Role::ReadOnly);
    let err = connector.db().expect_err("connect fails");
    assert!(matches!(err, DbError::ConnectionError { code: 2002, .. }));
}

#[test]
fn failed_write_reconnect_keeps_previous_connection_and_sends_nothing() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let mut db = connector.db()?;
    connector.script.borrow_mut().fail_connect = Some(Role::ReadWrite);
    connector.clear();

    let err = db
        .execute("INSERT INTO t (a) VALUES ('1')")
        .expect_err("reconnect fails");
    assert!(matches!(err, DbError::ConnectionError { .. }));
    assert!(connector.queries().is_empty());
    assert_eq!(db.current_role(), Some(Role::ReadOnly));
    Ok(())
}

#[test]
fn insert_returns_generated_id_after_commit() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().insert_id = 42;
    let mut db = connector.db()?;

    let id = db.insert("contacts", &record! { "name" => "O'Brien", "age" => 30 })?;
    assert_eq!(id, 42);
    let (_, sql) = connector.queries().pop().expect("insert statement");
    assert_eq!(
        sql,
        "INSERT INTO `contacts` (`name`, `age`) VALUES ('O''Brien', '30')"
    );
    assert_eq!(connector.count(&Event::Commit(Role::ReadWrite)), 1);
    Ok(())
}

#[test]
fn upsert_inserts_record_plus_filter_when_nothing_matches() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().insert_id = 5;
    let mut db = connector.db()?;
    // the SELECT finds nothing
    connector.push_read(ResultSet::with_columns(vec!["id".into(), "a".into()]));

    let outcome = db.upsert("t", &record! { "a" => 1 }, &record! { "id" => 5 })?;
    assert_eq!(outcome, UpsertOutcome::Inserted(5));
    let (_, sql) = connector.queries().pop().expect("insert statement");
    assert_eq!(sql, "INSERT INTO `t` (`a`, `id`) VALUES ('1', '5')");
    Ok(())
}

#[test]
fn upsert_updates_when_a_row_matches() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().catalog = vec!["id".into(), "a".into()];
    let mut db = connector.db()?;
    let mut found = ResultSet::with_columns(vec!["id".into(), "a".into()]);
    found.add_row_values(vec![Value::Int(5), Value::Int(0)]);
    connector.push_read(found);

    let outcome = db.upsert("t", &record! { "a" => 1 }, &record! { "id" => 5 })?;
    assert_eq!(outcome, UpsertOutcome::Updated(true));
    let (_, sql) = connector.queries().pop().expect("update statement");
    assert_eq!(sql, "UPDATE `t` SET `a` = '1' WHERE `id` = '5'");
    Ok(())
}

#[test]
fn dropping_the_db_closes_its_connection() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    {
        let mut db = connector.db()?;
        db.execute("INSERT INTO t (a) VALUES ('1')")?;
    }
    assert_eq!(connector.count(&Event::Close(Role::ReadWrite)), 1);
    Ok(())
}

#[test]
fn explicit_close_releases_once() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    let db = connector.db()?;
    db.close()?;
    assert_eq!(connector.count(&Event::Close(Role::ReadOnly)), 1);
    Ok(())
}

#[test]
fn insert_of_an_empty_record_sends_nothing() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().insert_id = 42;
    let mut db = connector.db()?;
    connector.clear();

    assert_eq!(db.insert("contacts", &Record::new())?, 0);
    assert!(connector.events().is_empty());
    Ok(())
}

#[test]
fn insert_returns_zero_when_no_row_was_written() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    {
        let mut script = connector.script.borrow_mut();
        script.insert_id = 42;
        script.writes_affect_nothing = true;
    }
    let mut db = connector.db()?;

    assert_eq!(db.insert("contacts", &record! { "name" => "x" })?, 0);
    assert_eq!(connector.queries().len(), 1);
    assert_eq!(connector.count(&Event::Commit(Role::ReadWrite)), 1);
    Ok(())
}

#[test]
fn dotted_column_names_are_not_split() -> Result<(), DbError> {
    let connector = RecordingConnector::new();
    connector.script.borrow_mut().catalog = vec!["id".into(), "a.b".into()];
    let mut db = connector.db()?;

    db.insert("crm.t", &record! { "a.b" => "x" })?;
    let (_, sql) = connector.queries().pop().expect("insert statement");
    assert_eq!(sql, "INSERT INTO `crm`.`t` (`a.b`) VALUES ('x')");

    db.update("t", &record! { "a.b" => "y" }, &record! { "a.b" => "x" })?;
    let (_, sql) = connector.queries().pop().expect("update statement");
    assert_eq!(sql, "UPDATE `t` SET `a.b` = 'y' WHERE `a.b` = 'x'");
    Ok(())
}
