use frameql_core::arrays::scalar::ScalarValue;
use frameql_core::backend::Backend;
use frameql_core::catalog::create::CreateOutcome;
use frameql_core::catalog::entry::RelationKind;
use frameql_core::engine::session::RelationOptions;
use frameql_core::source::{ReaderOptions, SourceDescriptor};
use frameql_core::statement::StatementResult;
use frameql_error::ErrorKind;
use rstests::{count, csv_file, engine, write_csv_rows};

fn location(file: &tempfile::NamedTempFile) -> String {
    file.path().display().to_string()
}

#[test]
fn view_and_persisted_table_diverge() {
    let engine = engine().unwrap();
    let session = engine.new_session();
    let file = csv_file(700).unwrap();
    let loc = location(&file);

    session
        .sql(&format!(
            "CREATE TABLE persisted WITH (format = 'csv', location = '{loc}', persist = True);
             CREATE TABLE lazy WITH (format = 'csv', location = '{loc}');
             CREATE VIEW live WITH (location = '{loc}');
             CREATE VIEW view_count AS (SELECT COUNT(*) AS c FROM live);
             CREATE TABLE table_count AS (SELECT COUNT(*) AS c FROM live);"
        ))
        .unwrap();

    for name in ["persisted", "lazy", "live"] {
        assert_eq!(700, count(&session, name).unwrap(), "relation: {name}");
    }
    assert_eq!(1, count(&session, "view_count").unwrap());
    assert_eq!(1, count(&session, "table_count").unwrap());

    write_csv_rows(file.path(), 10).unwrap();

    assert_eq!(700, count(&session, "persisted").unwrap());
    assert_eq!(10, count(&session, "lazy").unwrap());
    assert_eq!(10, count(&session, "live").unwrap());

    let view_count = session.query("SELECT c FROM view_count").unwrap();
    assert_eq!(
        Some(vec![ScalarValue::Int64(10)]),
        view_count.batches().next().unwrap().row(0)
    );
    let table_count = session.query("SELECT c FROM table_count").unwrap();
    assert_eq!(
        Some(vec![ScalarValue::Int64(700)]),
        table_count.batches().next().unwrap().row(0)
    );
}

#[test]
fn materialize_lazy_table_freezes_it() {
    let engine = engine().unwrap();
    let session = engine.new_session();
    let file = csv_file(20).unwrap();

    session
        .create_table_from_source(
            "t1",
            SourceDescriptor::file("csv", location(&file)),
            RelationOptions::default(),
        )
        .unwrap();
    assert!(session.materialize_table("t1").unwrap());

    write_csv_rows(file.path(), 3).unwrap();
    assert_eq!(20, count(&session, "t1").unwrap());
}

#[test]
fn format_inferred_from_location() {
    let engine = engine().unwrap();
    let session = engine.new_session();
    let file = csv_file(5).unwrap();

    let results = session
        .sql(&format!(
            "CREATE TABLE t1 WITH (location = '{}')",
            location(&file)
        ))
        .unwrap();
    assert!(matches!(
        &results[0],
        StatementResult::Create {
            kind: RelationKind::Table,
            outcome: CreateOutcome::Created,
            ..
        }
    ));
    assert_eq!(5, count(&session, "t1").unwrap());
}

#[test]
fn reader_options_pass_through() {
    let engine = engine().unwrap();
    let session = engine.new_session();
    let file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
    std::fs::write(file.path(), "1|x\n2|y\n3|z\n").unwrap();

    session
        .sql(&format!(
            "CREATE VIEW v1 WITH \
             (format = 'csv', location = '{}', delimiter = '|', has_header = false)",
            location(&file)
        ))
        .unwrap();
    assert_eq!(3, count(&session, "v1").unwrap());

    let result = session.query("SELECT column1 FROM v1 LIMIT 1").unwrap();
    assert_eq!(
        Some(vec![ScalarValue::from("x")]),
        result.batches().next().unwrap().row(0)
    );

    let err = session
        .sql(&format!(
            "CREATE VIEW v2 WITH (format = 'csv', location = '{}', strange = 1)",
            location(&file)
        ))
        .unwrap_err();
    assert_eq!(ErrorKind::InvalidOption, err.kind());
}

#[test]
fn configuration_errors() {
    let engine = engine().unwrap();
    let session = engine.new_session();

    // (sql, expected kind)
    let cases = [
        (
            "CREATE TABLE t1 WITH (format = 'csv')",
            ErrorKind::MissingRequiredOption,
        ),
        (
            "CREATE TABLE t1 WITH (format = 'strange', location = '/tmp/x')",
            ErrorKind::UnsupportedFormat,
        ),
        (
            "CREATE TABLE t1 WITH (location = '/tmp/data.unknown')",
            ErrorKind::MissingRequiredOption,
        ),
        (
            "CREATE TABLE t1 WITH (location = '/tmp/x.csv', persist = 'maybe')",
            ErrorKind::InvalidOption,
        ),
    ];

    for (sql, kind) in cases {
        let err = session.sql(sql).unwrap_err();
        assert_eq!(kind, err.kind(), "sql: {sql}");
        assert!(err.is_config_error(), "sql: {sql}");
    }
    assert!(session.list_relations().is_empty());
}

#[test]
fn missing_file_is_io_error() {
    let engine = engine().unwrap();
    let session = engine.new_session();

    let err = session
        .sql("CREATE VIEW v1 WITH (location = '/definitely/not/here.csv')")
        .unwrap_err();
    assert_eq!(ErrorKind::Io, err.kind());
    assert!(session.list_relations().is_empty());
}

#[test]
fn file_removed_after_creation() {
    let engine = engine().unwrap();
    let session = engine.new_session();
    let file = csv_file(4).unwrap();
    let loc = location(&file);

    session
        .sql(&format!(
            "CREATE VIEW v1 WITH (location = '{loc}'); \
             CREATE TABLE t1 WITH (location = '{loc}', persist = true);"
        ))
        .unwrap();
    drop(file);

    let err = count(&session, "v1").unwrap_err();
    assert_eq!(ErrorKind::Io, err.kind());
    assert_eq!(4, count(&session, "t1").unwrap());
}

#[test]
fn accelerated_unavailable_for_files() {
    let engine = engine().unwrap();
    let session = engine.new_session();
    let file = csv_file(4).unwrap();
    let loc = location(&file);

    for sql in [
        format!("CREATE TABLE t1 WITH (location = '{loc}', gpu = True)"),
        format!("CREATE VIEW v1 WITH (location = '{loc}', backend = 'accelerated')"),
    ] {
        let err = session.sql(&sql).unwrap_err();
        assert_eq!(ErrorKind::AcceleratedBackendUnavailable, err.kind());
    }

    let err = session
        .create_view_from_source(
            "v1",
            SourceDescriptor::File {
                format: "csv".to_string(),
                location: loc,
                options: ReaderOptions::new(),
            },
            RelationOptions::default().with_backend(Backend::Accelerated),
        )
        .unwrap_err();
    assert_eq!(ErrorKind::AcceleratedBackendUnavailable, err.kind());
    assert!(session.list_relations().is_empty());
}

#[test]
fn drop_and_recreate() {
    let engine = engine().unwrap();
    let session = engine.new_session();
    let old = csv_file(7).unwrap();
    let new = csv_file(2).unwrap();

    session
        .sql(&format!("CREATE TABLE t1 WITH (location = '{}')", location(&old)))
        .unwrap();
    session.sql("DROP TABLE t1").unwrap();

    let err = count(&session, "t1").unwrap_err();
    assert_eq!(ErrorKind::RelationNotFound, err.kind());

    session
        .sql(&format!(
            "CREATE TABLE IF NOT EXISTS t1 WITH (location = '{}')",
            location(&new)
        ))
        .unwrap();
    assert_eq!(2, count(&session, "t1").unwrap());

    let err = session.sql("DROP TABLE t2").unwrap_err();
    assert_eq!(ErrorKind::RelationNotFound, err.kind());
    session.sql("DROP TABLE IF EXISTS t2").unwrap();
}
